//! Weekly table of booking windows.
//!
//! Each school day carries two windows: the morning window, which opens the
//! evening before the day it governs, and the lunch-and-after-school window,
//! which opens on the day itself. A morning window may stagger its opening by
//! grade.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{self, format_hhmm, hhmm, SchoolDay};
use crate::error::{BookingError, Result};
use crate::model::Grade;

const GRADES: std::ops::RangeInclusive<Grade> = 1..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    Morning,
    LunchAndAfter,
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKind::Morning => f.write_str("morning"),
            WindowKind::LunchAndAfter => f.write_str("lunch-and-after"),
        }
    }
}

/// Which date a window governs, relative to the day it is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetDateRule {
    SameDay,
    NextDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationWindow {
    pub kind: WindowKind,
    #[serde(with = "hhmm")]
    pub open_time: NaiveTime,
    pub target_date: TargetDateRule,
    /// Grades in priority order, first opens earliest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_order: Option<Vec<Grade>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_delay_minutes: Option<u32>,
}

impl ReservationWindow {
    fn at(kind: WindowKind, open_time: NaiveTime, target_date: TargetDateRule) -> Self {
        Self {
            kind,
            open_time,
            target_date,
            grade_order: None,
            grade_delay_minutes: None,
        }
    }

    fn staggered(mut self, order: &[Grade], delay_minutes: u32) -> Self {
        self.grade_order = Some(order.to_vec());
        self.grade_delay_minutes = Some(delay_minutes);
        self
    }

    /// The date this window books when evaluated on `today`.
    pub fn target_date_for(&self, today: NaiveDate) -> NaiveDate {
        match self.target_date {
            TargetDateRule::SameDay => today,
            TargetDateRule::NextDay => calendar::next_date(today),
        }
    }

    /// Zero-based priority rank of `grade`, or `None` when the window has no
    /// ordering. A grade missing from the ordering ranks with the last listed
    /// grade and therefore gets the largest configured delay.
    pub fn priority_rank(&self, grade: Grade) -> Option<usize> {
        let order = self.grade_order.as_ref().filter(|o| !o.is_empty())?;
        self.grade_delay_minutes?;
        Some(
            order
                .iter()
                .position(|g| *g == grade)
                .unwrap_or(order.len() - 1),
        )
    }

    /// Opening time for a caller of `grade`. Without a grade, or without an
    /// ordering, the base open time applies. Fails if the stagger would carry
    /// the time past midnight.
    pub fn effective_open_time(&self, grade: Option<Grade>) -> Result<NaiveTime> {
        let rank = match grade.and_then(|g| self.priority_rank(g)) {
            Some(rank) => rank,
            None => return Ok(self.open_time),
        };
        let delay = self.grade_delay_minutes.unwrap_or(0);
        let offset = i64::from(delay) * rank as i64;
        let (time, wrapped) = self
            .open_time
            .overflowing_add_signed(Duration::minutes(offset));
        if wrapped != 0 {
            return Err(BookingError::Config(format!(
                "{} window opening at {} delayed by {} minutes crosses midnight",
                self.kind,
                format_hhmm(self.open_time),
                offset
            )));
        }
        Ok(time)
    }

    fn validate(&self, day: SchoolDay, expected: WindowKind) -> Result<()> {
        if self.kind != expected {
            return Err(BookingError::Config(format!(
                "{}: expected a {} window, found {}",
                day, expected, self.kind
            )));
        }
        if let Some(order) = &self.grade_order {
            if order.is_empty() {
                return Err(BookingError::Config(format!(
                    "{}: grade_order must not be empty",
                    day
                )));
            }
            for (i, grade) in order.iter().enumerate() {
                if !GRADES.contains(grade) {
                    return Err(BookingError::Config(format!(
                        "{}: grade {} in grade_order is outside 1..=3",
                        day, grade
                    )));
                }
                if order[..i].contains(grade) {
                    return Err(BookingError::Config(format!(
                        "{}: grade {} listed twice in grade_order",
                        day, grade
                    )));
                }
            }
            // The last rank carries the largest delay.
            self.effective_open_time(order.last().copied())
                .map_err(|e| BookingError::Config(format!("{}: {}", day, e)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub morning: ReservationWindow,
    pub afternoon: ReservationWindow,
}

impl DaySchedule {
    pub fn window(&self, kind: WindowKind) -> &ReservationWindow {
        match kind {
            WindowKind::Morning => &self.morning,
            WindowKind::LunchAndAfter => &self.afternoon,
        }
    }
}

/// Windows per school day. A day left out of a configured table keeps its
/// entry from [`WeeklySchedule::default`]; a `None` day never opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<DaySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DaySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DaySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DaySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<DaySchedule>,
}

impl WeeklySchedule {
    pub fn day(&self, day: SchoolDay) -> Option<&DaySchedule> {
        match day {
            SchoolDay::Monday => self.monday.as_ref(),
            SchoolDay::Tuesday => self.tuesday.as_ref(),
            SchoolDay::Wednesday => self.wednesday.as_ref(),
            SchoolDay::Thursday => self.thursday.as_ref(),
            SchoolDay::Friday => self.friday.as_ref(),
        }
    }

    /// Schedule entry for the school day `date` falls on.
    pub fn for_date(&self, date: NaiveDate) -> Option<&DaySchedule> {
        calendar::weekday_of(date).and_then(|day| self.day(day))
    }

    pub fn validate(&self) -> Result<()> {
        for day in SchoolDay::ALL {
            if let Some(entry) = self.day(day) {
                entry.morning.validate(day, WindowKind::Morning)?;
                entry.afternoon.validate(day, WindowKind::LunchAndAfter)?;
            }
        }
        Ok(())
    }
}

impl Default for WeeklySchedule {
    /// Morning windows open at 16:30 on the previous day, afternoon windows at
    /// 08:10 on the day. Monday, Wednesday and Friday stagger the morning
    /// window by 10 minutes per grade.
    fn default() -> Self {
        let evening = NaiveTime::from_hms_opt(16, 30, 0).unwrap_or(NaiveTime::MIN);
        let morning = NaiveTime::from_hms_opt(8, 10, 0).unwrap_or(NaiveTime::MIN);
        let day = |order: Option<&[Grade]>| {
            let window = ReservationWindow::at(WindowKind::Morning, evening, TargetDateRule::NextDay);
            DaySchedule {
                morning: match order {
                    Some(order) => window.staggered(order, 10),
                    None => window,
                },
                afternoon: ReservationWindow::at(
                    WindowKind::LunchAndAfter,
                    morning,
                    TargetDateRule::SameDay,
                ),
            }
        };
        Self {
            monday: Some(day(Some(&[2, 1, 3][..]))),
            tuesday: Some(day(None)),
            wednesday: Some(day(Some(&[3, 1, 2][..]))),
            thursday: Some(day(None)),
            friday: Some(day(Some(&[1, 2, 3][..]))),
        }
    }
}
