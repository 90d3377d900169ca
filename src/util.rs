use chrono::NaiveDate;

use crate::error::{BookingError, Result};

/// Format a duration as human-readable string (e.g., "2h 30m")
pub fn format_duration(d: chrono::Duration) -> String {
    let total_mins = d.num_minutes().max(0);
    let hours = total_mins / 60;
    let mins = total_mins % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| BookingError::Validation(format!("Invalid date '{}': {}", s, e)))
}
