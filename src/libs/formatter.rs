//! Duration and date formatting utilities for user-friendly display.
//!
//! This module converts raw session values (whole seconds, UTC timestamps)
//! into the short strings shown by the live timer, the trend chart and the
//! record list. Every function is pure; time-zone dependent labels take the
//! offset explicitly so the same history always renders the same way.
//!
//! ## Format Specifications
//!
//! ### Live Timer
//! The ticking display uses `MM:SS`, zero-padded. Minutes are not wrapped
//! into hours, so a 75 minute session reads `75:00`.
//!
//! ### Record Durations
//! Completed sessions are shown as `{m}m {s}s` without padding, e.g. `3m 5s`.
//!
//! ### Chart Minutes
//! Trend points use whole minutes rounded half up: 89 seconds is 1 minute,
//! 90 seconds is 2 minutes.
//!
//! ### Date Labels
//! - Day label: `M/D` (no padding), e.g. `6/9`
//! - Timestamp label: `M/D HH:MM`, e.g. `6/9 07:05`
//!
//! ## Examples
//!
//! ```rust
//! use throne::libs::formatter::{format_clock, format_minutes_seconds, rounded_minutes};
//!
//! assert_eq!(format_clock(65), "01:05");
//! assert_eq!(format_minutes_seconds(185), "3m 5s");
//! assert_eq!(rounded_minutes(90), 2);
//! ```

use chrono::{DateTime, FixedOffset, Utc};

/// Formats elapsed seconds as the `MM:SS` string of the live timer.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a completed session duration as `{m}m {s}s`.
pub fn format_minutes_seconds(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Converts seconds to whole minutes, rounding half up.
///
/// ```rust
/// use throne::libs::formatter::rounded_minutes;
///
/// assert_eq!(rounded_minutes(0), 0);
/// assert_eq!(rounded_minutes(29), 0);
/// assert_eq!(rounded_minutes(30), 1);
/// assert_eq!(rounded_minutes(150), 3);
/// ```
pub fn rounded_minutes(seconds: u64) -> u64 {
    (seconds + 30) / 60
}

/// Formats a timestamp as a `M/D` day label in the given offset.
pub fn format_day_label(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format("%-m/%-d").to_string()
}

/// Formats a timestamp as a `M/D HH:MM` label in the given offset.
pub fn format_timestamp_label(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format("%-m/%-d %H:%M").to_string()
}
