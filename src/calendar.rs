//! Date and time-of-day helpers shared by the booking rules.
//!
//! All rules work on local wall-clock values (`NaiveDate`, `NaiveTime`).
//! The current instant is read through [`Clock`] so that evaluators can be
//! driven by a fixed time in tests.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BookingError, Result};

/// Source of "now" in the application's local timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current time truncated to whole minutes.
    fn time_of_day(&self) -> NaiveTime {
        truncate_to_minute(self.now().time())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self(date.and_time(time))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A weekday on which the school timetable runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchoolDay::Monday => "monday",
            SchoolDay::Tuesday => "tuesday",
            SchoolDay::Wednesday => "wednesday",
            SchoolDay::Thursday => "thursday",
            SchoolDay::Friday => "friday",
        };
        f.write_str(name)
    }
}

/// Maps a date to its school day. Saturday and Sunday have no schedule and
/// return `None`; they are never folded into another weekday.
pub fn weekday_of(date: NaiveDate) -> Option<SchoolDay> {
    match date.weekday() {
        Weekday::Mon => Some(SchoolDay::Monday),
        Weekday::Tue => Some(SchoolDay::Tuesday),
        Weekday::Wed => Some(SchoolDay::Wednesday),
        Weekday::Thu => Some(SchoolDay::Thursday),
        Weekday::Fri => Some(SchoolDay::Friday),
        Weekday::Sat | Weekday::Sun => None,
    }
}

pub fn next_date(date: NaiveDate) -> NaiveDate {
    date + Duration::days(1)
}

pub fn previous_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

/// The most recent `weekday` on or before `date`.
pub fn last_weekday_on_or_before(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(back))
}

/// Strictly-later comparison of two times of day.
pub fn is_after(t1: NaiveTime, t2: NaiveTime) -> bool {
    t1 > t2
}

pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// Parse a zero-padded 24-hour `HH:MM` value.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(BookingError::Config(format!(
            "Invalid time '{}': expected zero-padded HH:MM",
            s
        )));
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| BookingError::Config(format!("Invalid time '{}': {}", s, e)))
}

pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter storing a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}
