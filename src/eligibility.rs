//! Decides whether a booking window is open for a target date.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::calendar::truncate_to_minute;
use crate::model::Grade;
use crate::schedule::{WeeklySchedule, WindowKind};

/// When, and whether, a window opens for one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No schedule entry covers the target date.
    NoSchedule,
    /// The window is open.
    Open { opened_at: NaiveTime },
    /// The window opens later today at `opens_at`.
    OpensAt { opens_at: NaiveTime },
    /// The window is bound to another day (lunch-and-after only).
    WrongDay,
    /// The schedule could not produce an opening time.
    Misconfigured,
}

impl WindowState {
    pub fn is_open(&self) -> bool {
        matches!(self, WindowState::Open { .. })
    }
}

/// Evaluates window state at `now`.
///
/// The morning window is gated by time of day only: it opens every evening
/// for the day it governs, so the target date is not compared with today.
/// The lunch-and-after window additionally requires `now` to fall on the
/// target date.
pub fn window_state(
    schedule: &WeeklySchedule,
    now: NaiveDateTime,
    target_date: NaiveDate,
    kind: WindowKind,
    grade: Option<Grade>,
) -> WindowState {
    let Some(day) = schedule.for_date(target_date) else {
        return WindowState::NoSchedule;
    };
    let window = day.window(kind);
    let current = truncate_to_minute(now.time());

    if kind == WindowKind::LunchAndAfter && now.date() != target_date {
        return WindowState::WrongDay;
    }

    let opens_at = match window.effective_open_time(grade) {
        Ok(t) => t,
        Err(e) => {
            warn!("Treating {} window for {} as closed: {}", kind, target_date, e);
            return WindowState::Misconfigured;
        }
    };

    if current >= opens_at {
        WindowState::Open { opened_at: opens_at }
    } else {
        WindowState::OpensAt { opens_at }
    }
}

pub fn is_window_open(
    schedule: &WeeklySchedule,
    now: NaiveDateTime,
    target_date: NaiveDate,
    kind: WindowKind,
    grade: Option<Grade>,
) -> bool {
    window_state(schedule, now, target_date, kind, grade).is_open()
}
