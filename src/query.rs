//! Read-only questions asked of a reservation snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Reservation, SlotCategory, TimeSlot};

/// Which of a user's reservations count against the after-school limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaScope {
    /// Only reservations in after-school slots.
    #[default]
    AfterSchoolOnly,
    /// Every active reservation of the day, whatever its slot.
    AllCategories,
}

/// The active reservation holding (room, slot, date), if any.
pub fn active_reservation_for<'a>(
    reservations: &'a [Reservation],
    room_id: &str,
    slot_id: &str,
    date: NaiveDate,
) -> Option<&'a Reservation> {
    reservations
        .iter()
        .find(|r| r.is_active() && r.matches(room_id, slot_id, date))
}

pub fn is_slot_taken(
    reservations: &[Reservation],
    room_id: &str,
    slot_id: &str,
    date: NaiveDate,
) -> bool {
    active_reservation_for(reservations, room_id, slot_id, date).is_some()
}

pub fn slot_category(slots: &[TimeSlot], slot_id: &str) -> Option<SlotCategory> {
    slots.iter().find(|s| s.id == slot_id).map(|s| s.category)
}

/// Number of the user's active reservations on `date` that count towards the
/// after-school limit under `scope`. Reservations pointing at a slot missing
/// from `slots` only count under [`QuotaScope::AllCategories`].
pub fn after_school_count_today(
    reservations: &[Reservation],
    slots: &[TimeSlot],
    user_id: &str,
    date: NaiveDate,
    scope: QuotaScope,
) -> usize {
    reservations
        .iter()
        .filter(|r| r.is_active() && r.user_id == user_id && r.date == date)
        .filter(|r| match scope {
            QuotaScope::AllCategories => true,
            QuotaScope::AfterSchoolOnly => {
                slot_category(slots, &r.slot_id) == Some(SlotCategory::AfterSchool)
            }
        })
        .count()
}

pub fn can_book_after_school(
    reservations: &[Reservation],
    slots: &[TimeSlot],
    user_id: &str,
    date: NaiveDate,
    scope: QuotaScope,
    quota: usize,
) -> bool {
    after_school_count_today(reservations, slots, user_id, date, scope) < quota
}
