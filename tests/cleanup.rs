mod common;

use common::{at, cancelled, date, reservation, test_config};
use practice_rooms::cleanup::{
    due_cleanups, reservations_to_cleanup, should_run_after_school_cleanup,
    should_run_weekly_cleanup, CleanupKind,
};
use practice_rooms::config::SystemConfig;
use practice_rooms::model::Reservation;

/// Week of Monday 2025-06-09 to Friday 2025-06-13, plus neighbours.
fn week_snapshot() -> Vec<Reservation> {
    vec![
        reservation("prev-fri", "u1", "1", "after-7", "2025-06-06"),
        reservation("mon", "u1", "1", "morning-1", "2025-06-09"),
        reservation("tue", "u2", "2", "after-8", "2025-06-10"),
        reservation("wed", "u3", "3", "lunch-1", "2025-06-11"),
        reservation("thu", "u1", "4", "after-9", "2025-06-12"),
        reservation("fri-lunch", "u2", "1", "lunch-1", "2025-06-13"),
        reservation("fri-after", "u3", "2", "after-10", "2025-06-13"),
        reservation("next-mon", "u1", "1", "morning-1", "2025-06-16"),
        cancelled(reservation("cancelled-tue", "u1", "5", "after-7", "2025-06-10")),
    ]
}

fn ids(reservations: &[Reservation]) -> Vec<&str> {
    reservations.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn weekly_trigger_is_friday_from_noon() {
    let system = SystemConfig::default();
    assert!(!should_run_weekly_cleanup(at("2025-06-13", "11:59"), &system.weekly_cleanup));
    assert!(should_run_weekly_cleanup(at("2025-06-13", "12:00"), &system.weekly_cleanup));
    assert!(should_run_weekly_cleanup(at("2025-06-13", "12:01"), &system.weekly_cleanup));
    assert!(!should_run_weekly_cleanup(at("2025-06-12", "13:00"), &system.weekly_cleanup));
}

#[test]
fn after_school_trigger_is_all_of_saturday() {
    let system = SystemConfig::default();
    assert!(should_run_after_school_cleanup(at("2025-06-14", "00:00"), &system.after_school_cleanup));
    assert!(should_run_after_school_cleanup(at("2025-06-14", "23:59"), &system.after_school_cleanup));
    assert!(!should_run_after_school_cleanup(at("2025-06-13", "23:59"), &system.after_school_cleanup));
    assert!(!should_run_after_school_cleanup(at("2025-06-15", "00:00"), &system.after_school_cleanup));
}

#[test]
fn due_cleanups_lists_triggered_sweeps() {
    let system = SystemConfig::default();
    assert_eq!(due_cleanups(at("2025-06-13", "12:01"), &system), vec![CleanupKind::Weekly]);
    assert_eq!(due_cleanups(at("2025-06-14", "08:00"), &system), vec![CleanupKind::FridayAfterSchool]);
    assert!(due_cleanups(at("2025-06-11", "12:01"), &system).is_empty());
}

#[test]
fn weekly_purge_spares_friday_after_school() {
    let config = test_config();
    let snapshot = week_snapshot();

    let weekly = reservations_to_cleanup(&snapshot, &config.slots, CleanupKind::Weekly, date("2025-06-13"), true);
    assert_eq!(ids(&weekly), vec!["mon", "tue", "wed", "thu", "fri-lunch"]);

    let saturday = reservations_to_cleanup(
        &snapshot,
        &config.slots,
        CleanupKind::FridayAfterSchool,
        date("2025-06-14"),
        true,
    );
    assert_eq!(ids(&saturday), vec!["fri-after"]);
}

#[test]
fn weekly_purge_can_include_friday_after_school() {
    let config = test_config();
    let weekly = reservations_to_cleanup(&week_snapshot(), &config.slots, CleanupKind::Weekly, date("2025-06-13"), false);
    assert!(ids(&weekly).contains(&"fri-after"));
    assert_eq!(weekly.len(), 6);
}

#[test]
fn mid_week_reference_targets_the_previous_week() {
    let config = test_config();
    let weekly = reservations_to_cleanup(&week_snapshot(), &config.slots, CleanupKind::Weekly, date("2025-06-11"), true);
    assert!(weekly.is_empty(), "only prev-fri is in that week and it is after-school: {:?}", ids(&weekly));

    let after = reservations_to_cleanup(
        &week_snapshot(),
        &config.slots,
        CleanupKind::FridayAfterSchool,
        date("2025-06-11"),
        true,
    );
    assert_eq!(ids(&after), vec!["prev-fri"]);
}

#[test]
fn cleanup_selection_is_idempotent() {
    let config = test_config();
    let snapshot = week_snapshot();
    let first = reservations_to_cleanup(&snapshot, &config.slots, CleanupKind::Weekly, date("2025-06-13"), true);
    let second = reservations_to_cleanup(&snapshot, &config.slots, CleanupKind::Weekly, date("2025-06-13"), true);
    assert_eq!(first, second);
}
