mod common;

use common::{at, date, reservation, cancelled, student, sub_admin, super_admin, test_config};
use practice_rooms::booking::{attempt_booking, attempt_cancellation, BookingDecision, BookingRequest};
use practice_rooms::error::BookingError;
use practice_rooms::model::{grade_from_student_id, is_valid_student_id, ReservationStatus};
use practice_rooms::query::{
    after_school_count_today, can_book_after_school, is_slot_taken, QuotaScope,
};

fn request(room: &str, slot: &str, d: &str) -> BookingRequest {
    BookingRequest {
        room_id: room.to_string(),
        slot_id: slot.to_string(),
        date: date(d),
        student_id: "20001".to_string(),
        student_name: "Kim".to_string(),
    }
}

// ── Query engine ─────────────────────────────────────────────────

#[test]
fn slot_taken_only_by_active_exact_match() {
    let snapshot = vec![
        reservation("r1", "u1", "1", "after-7", "2025-06-10"),
        cancelled(reservation("r2", "u1", "2", "after-7", "2025-06-10")),
    ];
    assert!(is_slot_taken(&snapshot, "1", "after-7", date("2025-06-10")));
    assert!(!is_slot_taken(&snapshot, "2", "after-7", date("2025-06-10")));
    assert!(!is_slot_taken(&snapshot, "1", "after-8", date("2025-06-10")));
    assert!(!is_slot_taken(&snapshot, "1", "after-7", date("2025-06-11")));
}

#[test]
fn after_school_count_depends_on_scope() {
    let config = test_config();
    let snapshot = vec![
        reservation("r1", "u1", "1", "after-7", "2025-06-10"),
        reservation("r2", "u1", "2", "morning-1", "2025-06-10"),
        reservation("r3", "u1", "3", "lunch-1", "2025-06-10"),
        reservation("r4", "u1", "1", "after-8", "2025-06-11"),
        reservation("r5", "u2", "2", "after-8", "2025-06-10"),
        cancelled(reservation("r6", "u1", "4", "after-9", "2025-06-10")),
    ];
    let d = date("2025-06-10");

    assert_eq!(after_school_count_today(&snapshot, &config.slots, "u1", d, QuotaScope::AfterSchoolOnly), 1);
    assert_eq!(after_school_count_today(&snapshot, &config.slots, "u1", d, QuotaScope::AllCategories), 3);
    assert!(!can_book_after_school(&snapshot, &config.slots, "u1", d, QuotaScope::AfterSchoolOnly, 1));
    assert!(can_book_after_school(&snapshot, &config.slots, "u1", d, QuotaScope::AfterSchoolOnly, 2));
    assert!(can_book_after_school(&snapshot, &config.slots, "u3", d, QuotaScope::AllCategories, 1));
}

#[test]
fn student_id_helpers() {
    assert!(is_valid_student_id("12345"));
    assert!(!is_valid_student_id("1234"));
    assert!(!is_valid_student_id("123456"));
    assert!(!is_valid_student_id("12a45"));
    assert_eq!(grade_from_student_id("21234"), 2);
    assert_eq!(grade_from_student_id("91234"), 1);
}

#[test]
fn role_helpers() {
    let plain = student("u1", 1);
    assert!(!plain.is_admin());
    assert!(!plain.is_super_admin());

    let instructor = sub_admin("a1");
    assert!(instructor.is_admin());
    assert!(!instructor.is_super_admin());

    let head = super_admin("a2");
    assert!(head.is_admin());
    assert!(head.is_super_admin());
}

// ── Booking attempts ─────────────────────────────────────────────

#[test]
fn accepted_booking_emits_create_with_snapshot_fields() {
    let config = test_config();
    let user = student("u2", 2);
    let decision =
        attempt_booking(&config, &user, &request("3", "lunch-1", "2025-06-10"), &[], at("2025-06-10", "08:15"))
            .unwrap();

    match decision {
        BookingDecision::Create(new) => {
            assert_eq!(new.user_id, "u2");
            assert_eq!(new.room_id, "3");
            assert_eq!(new.slot_id, "lunch-1");
            assert_eq!(new.date, date("2025-06-10"));
            assert_eq!(new.student_id, "20001");
            assert_eq!(new.student_name, "Kim");
            assert_eq!(new.requested_at, at("2025-06-10", "08:15"));
        }
        other => panic!("Expected create, got {:?}", other),
    }
}

#[test]
fn malformed_input_fails_before_any_state_check() {
    let config = test_config();
    let user = student("u2", 2);
    // Slot is taken and the window is closed, but validation wins.
    let snapshot = vec![reservation("r1", "u1", "1", "after-7", "2025-06-10")];
    let now = at("2025-06-09", "07:00");

    let mut bad_id = request("1", "after-7", "2025-06-10");
    bad_id.student_id = "2001".to_string();
    assert!(matches!(
        attempt_booking(&config, &user, &bad_id, &snapshot, now),
        Err(BookingError::Validation(_))
    ));

    let mut blank_name = request("1", "after-7", "2025-06-10");
    blank_name.student_name = "   ".to_string();
    assert!(matches!(
        attempt_booking(&config, &user, &blank_name, &snapshot, now),
        Err(BookingError::Validation(_))
    ));
}

#[test]
fn taken_slot_is_rejected_for_other_students() {
    let config = test_config();
    let snapshot = vec![reservation("r1", "u1", "1", "after-7", "2025-06-10")];
    let result = attempt_booking(
        &config,
        &student("u2", 2),
        &request("1", "after-7", "2025-06-10"),
        &snapshot,
        at("2025-06-10", "09:00"),
    );

    match result {
        Err(BookingError::AlreadyBooked { reservation_id, .. }) => assert_eq!(reservation_id, "r1"),
        other => panic!("Expected AlreadyBooked, got {:?}", other),
    }
}

#[test]
fn owner_and_admins_are_offered_cancellation() {
    let config = test_config();
    let snapshot = vec![reservation("r1", "u1", "1", "after-7", "2025-06-10")];
    let req = request("1", "after-7", "2025-06-10");
    let now = at("2025-06-10", "09:00");

    for user in [student("u1", 1), sub_admin("a1"), super_admin("a2")] {
        match attempt_booking(&config, &user, &req, &snapshot, now).unwrap() {
            BookingDecision::OfferCancel(r) => assert_eq!(r.id, "r1"),
            other => panic!("Expected cancel offer for {}, got {:?}", user.id, other),
        }
    }
}

#[test]
fn room_and_slot_flags_deny_booking() {
    let mut config = test_config();
    config.rooms[1].available = false;
    config.slots.iter_mut().find(|s| s.id == "after-8").unwrap().active = false;
    let admin = sub_admin("a1");
    let now = at("2025-06-10", "09:00");

    assert!(matches!(
        attempt_booking(&config, &admin, &request("2", "after-7", "2025-06-10"), &[], now),
        Err(BookingError::RoomUnavailable(_))
    ));
    assert!(matches!(
        attempt_booking(&config, &admin, &request("1", "after-8", "2025-06-10"), &[], now),
        Err(BookingError::SlotInactive(_))
    ));
    assert!(matches!(
        attempt_booking(&config, &admin, &request("9", "after-8", "2025-06-10"), &[], now),
        Err(BookingError::UnknownRoom(_))
    ));
}

#[test]
fn after_school_quota_blocks_second_after_school_but_not_morning() {
    let config = test_config();
    let user = student("u1", 1);
    let snapshot = vec![reservation("r1", "u1", "1", "after-7", "2025-06-10")];
    let now = at("2025-06-10", "17:00");

    assert!(matches!(
        attempt_booking(&config, &user, &request("2", "after-9", "2025-06-10"), &snapshot, now),
        Err(BookingError::AfterSchoolQuotaExceeded { count: 1, limit: 1, .. })
    ));

    let morning = attempt_booking(&config, &user, &request("2", "morning-1", "2025-06-10"), &snapshot, now);
    assert!(matches!(morning, Ok(BookingDecision::Create(_))));

    let lunch = attempt_booking(&config, &user, &request("2", "lunch-1", "2025-06-10"), &snapshot, now);
    assert!(matches!(lunch, Ok(BookingDecision::Create(_))));
}

#[test]
fn all_categories_scope_counts_morning_bookings() {
    let mut config = test_config();
    config.system.quota_scope = QuotaScope::AllCategories;
    let user = student("u1", 1);
    let snapshot = vec![reservation("r1", "u1", "1", "morning-1", "2025-06-10")];

    assert!(matches!(
        attempt_booking(&config, &user, &request("2", "after-9", "2025-06-10"), &snapshot, at("2025-06-10", "09:00")),
        Err(BookingError::AfterSchoolQuotaExceeded { .. })
    ));
}

#[test]
fn admins_bypass_closed_windows_students_do_not() {
    let config = test_config();
    let req = request("1", "lunch-1", "2025-06-10");
    let now = at("2025-06-10", "07:00");

    let admin = attempt_booking(&config, &sub_admin("a1"), &req, &[], now);
    assert!(matches!(admin, Ok(BookingDecision::Create(_))));

    let student_result = attempt_booking(&config, &student("u2", 2), &req, &[], now);
    assert!(matches!(student_result, Err(BookingError::WindowClosed(_))));
}

#[test]
fn morning_booking_uses_the_callers_grade() {
    let config = test_config();
    // Monday morning, grade order [2, 1, 3].
    let req = request("1", "morning-1", "2025-06-09");
    let now = at("2025-06-08", "16:35");

    assert!(attempt_booking(&config, &student("u2", 2), &req, &[], now).is_ok());
    assert!(matches!(
        attempt_booking(&config, &student("u3", 3), &req, &[], now),
        Err(BookingError::WindowClosed(_))
    ));
}

// ── Cancellation attempts ────────────────────────────────────────

#[test]
fn owner_and_admin_may_cancel_others_may_not() {
    let r = reservation("r1", "u1", "1", "after-7", "2025-06-10");

    let update = attempt_cancellation(&student("u1", 1), &r).unwrap();
    assert_eq!(update.reservation_id, "r1");
    assert_eq!(update.status, ReservationStatus::Cancelled);

    assert!(attempt_cancellation(&sub_admin("a1"), &r).is_ok());
    assert!(matches!(
        attempt_cancellation(&student("u2", 2), &r),
        Err(BookingError::NotAuthorized(_))
    ));
}

#[test]
fn cancelled_reservation_cannot_be_cancelled_again() {
    let r = cancelled(reservation("r1", "u1", "1", "after-7", "2025-06-10"));
    assert!(matches!(
        attempt_cancellation(&student("u1", 1), &r),
        Err(BookingError::AlreadyCancelled(_))
    ));
}
