use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::hhmm;
use crate::schedule::WindowKind;

pub type Grade = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Student,
    SubAdmin,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Five-digit school number.
    pub student_id: String,
    pub name: String,
    grade: Grade,
    pub role: Role,
}

impl User {
    pub fn new(id: &str, student_id: &str, name: &str, grade: Grade, role: Role) -> Self {
        Self {
            id: id.to_string(),
            student_id: student_id.to_string(),
            name: name.to_string(),
            grade,
            role,
        }
    }

    /// The grade used for every priority decision. The leading digit of the
    /// student id is never consulted here.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::SubAdmin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// A student id is exactly five ASCII digits.
pub fn is_valid_student_id(student_id: &str) -> bool {
    student_id.len() == 5 && student_id.bytes().all(|b| b.is_ascii_digit())
}

/// Grade implied by the first digit of a student id, for display only.
/// Falls back to 1 when the digit is outside 1..=3.
pub fn grade_from_student_id(student_id: &str) -> Grade {
    match student_id.chars().next().and_then(|c| c.to_digit(10)) {
        Some(d @ 1..=3) => d as Grade,
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicRoom {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotCategory {
    Morning,
    Lunch,
    AfterSchool,
}

impl SlotCategory {
    /// The booking window that governs this category.
    pub fn window_kind(self) -> WindowKind {
        match self {
            SlotCategory::Morning => WindowKind::Morning,
            SlotCategory::Lunch | SlotCategory::AfterSchool => WindowKind::LunchAndAfter,
        }
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotCategory::Morning => "morning",
            SlotCategory::Lunch => "lunch",
            SlotCategory::AfterSchool => "after-school",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub category: SlotCategory,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

/// A booked (room, slot, date). `student_id` and `student_name` are copied
/// from the booker at creation time and are not updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    pub slot_id: String,
    pub date: NaiveDate,
    pub student_id: String,
    pub student_name: String,
    /// Local wall-clock time of the accepted booking attempt.
    pub created_at: NaiveDateTime,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    pub fn matches(&self, room_id: &str, slot_id: &str, date: NaiveDate) -> bool {
        self.room_id == room_id && self.slot_id == slot_id && self.date == date
    }
}

/// Create command emitted by an accepted booking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub user_id: String,
    pub room_id: String,
    pub slot_id: String,
    pub date: NaiveDate,
    pub student_id: String,
    pub student_name: String,
    pub requested_at: NaiveDateTime,
}

impl NewReservation {
    pub fn into_reservation(self, id: String) -> Reservation {
        Reservation {
            id,
            user_id: self.user_id,
            room_id: self.room_id,
            slot_id: self.slot_id,
            date: self.date,
            student_id: self.student_id,
            student_name: self.student_name,
            created_at: self.requested_at,
            status: ReservationStatus::Active,
        }
    }
}

fn default_true() -> bool {
    true
}
