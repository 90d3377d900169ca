//! Weekly purge decisions.
//!
//! The weekly sweep cancels the school week's reservations once Friday noon
//! has passed, except Friday's after-school bookings, which are still to be
//! used that afternoon. Those are swept separately on Saturday.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use clap::ValueEnum;
use std::fmt;

use crate::calendar::{last_weekday_on_or_before, truncate_to_minute};
use crate::config::{AfterSchoolCleanup, SystemConfig, WeeklyCleanup};
use crate::model::{Reservation, SlotCategory, TimeSlot};
use crate::query::slot_category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CleanupKind {
    Weekly,
    FridayAfterSchool,
}

impl fmt::Display for CleanupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupKind::Weekly => f.write_str("weekly"),
            CleanupKind::FridayAfterSchool => f.write_str("friday-after-school"),
        }
    }
}

pub fn should_run_weekly_cleanup(now: NaiveDateTime, trigger: &WeeklyCleanup) -> bool {
    now.weekday() == trigger.day && truncate_to_minute(now.time()) >= trigger.time
}

pub fn should_run_after_school_cleanup(now: NaiveDateTime, trigger: &AfterSchoolCleanup) -> bool {
    now.weekday() == trigger.day && truncate_to_minute(now.time()) >= trigger.time
}

/// Sweeps whose trigger has been reached at `now`.
pub fn due_cleanups(now: NaiveDateTime, system: &SystemConfig) -> Vec<CleanupKind> {
    let mut due = Vec::new();
    if should_run_weekly_cleanup(now, &system.weekly_cleanup) {
        due.push(CleanupKind::Weekly);
    }
    if should_run_after_school_cleanup(now, &system.after_school_cleanup) {
        due.push(CleanupKind::FridayAfterSchool);
    }
    due
}

/// Active reservations that a sweep of `kind` cancels.
///
/// The week is Monday to the most recent Friday on or before
/// `reference_date`. The result depends only on the arguments, so repeating
/// a sweep over the same snapshot yields the same list.
pub fn reservations_to_cleanup(
    all: &[Reservation],
    slots: &[TimeSlot],
    kind: CleanupKind,
    reference_date: NaiveDate,
    exclude_after_school: bool,
) -> Vec<Reservation> {
    let friday = last_weekday_on_or_before(reference_date, Weekday::Fri);
    let monday = friday - Duration::days(4);
    let friday_after_school = |r: &Reservation| {
        r.date == friday && slot_category(slots, &r.slot_id) == Some(SlotCategory::AfterSchool)
    };

    all.iter()
        .filter(|r| r.is_active())
        .filter(|r| match kind {
            CleanupKind::Weekly => {
                r.date >= monday
                    && r.date <= friday
                    && !(exclude_after_school && friday_after_school(r))
            }
            CleanupKind::FridayAfterSchool => friday_after_school(r),
        })
        .cloned()
        .collect()
}
