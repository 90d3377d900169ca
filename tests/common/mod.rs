#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use practice_rooms::config::Config;
use practice_rooms::model::{Reservation, ReservationStatus, Role, User};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

pub fn at(d: &str, t: &str) -> NaiveDateTime {
    date(d).and_time(time(t))
}

pub fn student(id: &str, grade: u8) -> User {
    User::new(id, &format!("{}0001", grade), &format!("Student {}", id), grade, Role::Student)
}

pub fn sub_admin(id: &str) -> User {
    User::new(id, "99998", "Instructor", 3, Role::SubAdmin)
}

pub fn super_admin(id: &str) -> User {
    User::new(id, "99999", "Head", 3, Role::SuperAdmin)
}

/// Default rooms, slots and schedule with a handful of users.
pub fn test_config() -> Config {
    Config {
        users: vec![
            student("u1", 1),
            student("u2", 2),
            student("u3", 3),
            sub_admin("a1"),
            super_admin("a2"),
        ],
        ..Config::default()
    }
}

pub fn reservation(id: &str, user_id: &str, room: &str, slot: &str, d: &str) -> Reservation {
    Reservation {
        id: id.to_string(),
        user_id: user_id.to_string(),
        room_id: room.to_string(),
        slot_id: slot.to_string(),
        date: date(d),
        student_id: "10001".to_string(),
        student_name: format!("Student {}", user_id),
        created_at: at("2025-06-01", "09:00"),
        status: ReservationStatus::Active,
    }
}

pub fn cancelled(mut r: Reservation) -> Reservation {
    r.status = ReservationStatus::Cancelled;
    r
}
