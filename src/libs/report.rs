//! Derived statistics over the session history.
//!
//! Everything here is a pure function of a slice of records, in save order.
//! Nothing is cached, so a report always reflects the collection it was
//! built from and is recomputed after every append.
//!
//! ## Outputs
//!
//! - **count** and **average duration** (seconds, and rounded minutes)
//! - **recent series**: the last N records, oldest first, with a day label,
//!   the rounded duration in minutes and a long-session flag
//! - **display list**: every record, most recent first, with labels ready
//!   to be shown
//!
//! Calendar labels depend on the viewer's UTC offset. [`Report::new`] uses
//! the local offset; [`Report::with_offset`] pins it.
//!
//! ```rust
//! use throne::libs::report::Report;
//! use chrono::FixedOffset;
//!
//! let report = Report::new(&[]).with_offset(FixedOffset::east_opt(0).unwrap());
//! assert_eq!(report.count(), 0);
//! assert_eq!(report.average_duration_seconds(), 0.0);
//! assert!(report.recent_series(7).is_empty());
//! ```

use crate::libs::config::{DEFAULT_LONG_SESSION_MINUTES, DEFAULT_RECENT_WINDOW};
use crate::libs::formatter::{format_day_label, format_minutes_seconds, format_timestamp_label, rounded_minutes};
use crate::libs::record::{Category, SessionRecord};
use chrono::{FixedOffset, Local};
use serde::Serialize;

/// One point of the recent-sessions trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub record_id: String,
    /// Calendar day of the save, "M/D".
    pub date_label: String,
    pub duration_minutes: u64,
    pub category: Category,
    pub is_long: bool,
}

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    pub id: String,
    /// Save time, "M/D HH:MM".
    pub when_label: String,
    /// Duration, "Xm Ys".
    pub duration_label: String,
    pub duration_seconds: u64,
    pub category: Category,
    pub category_label: &'static str,
    pub category_description: &'static str,
    pub color_tag: String,
    pub notes: String,
    pub commentary: Option<String>,
}

/// Everything the report view shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub count: usize,
    pub average_duration_seconds: f64,
    pub average_duration_minutes: u64,
    pub recent: Vec<TrendPoint>,
    pub entries: Vec<DisplayEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    records: &'a [SessionRecord],
    offset: FixedOffset,
    long_session_minutes: u64,
}

impl<'a> Report<'a> {
    pub fn new(records: &'a [SessionRecord]) -> Self {
        Self {
            records,
            offset: *Local::now().offset(),
            long_session_minutes: DEFAULT_LONG_SESSION_MINUTES,
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_long_session_minutes(mut self, minutes: u64) -> Self {
        self.long_session_minutes = minutes;
        self
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Arithmetic mean of the durations; 0 when there are no records.
    pub fn average_duration_seconds(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: u64 = self.records.iter().map(|record| record.duration_seconds).sum();
        total as f64 / self.records.len() as f64
    }

    /// The average rounded to the nearest whole minute.
    pub fn average_duration_minutes(&self) -> u64 {
        (self.average_duration_seconds() / 60.0).round() as u64
    }

    /// The last `n` records in save order.
    pub fn recent_series(&self, n: usize) -> Vec<TrendPoint> {
        let start = self.records.len().saturating_sub(n);
        self.records[start..]
            .iter()
            .map(|record| TrendPoint {
                record_id: record.id.clone(),
                date_label: format_day_label(&record.created_at, &self.offset),
                duration_minutes: rounded_minutes(record.duration_seconds),
                category: record.category,
                is_long: record.duration_seconds > self.long_session_minutes.saturating_mul(60),
            })
            .collect()
    }

    /// All records, most recent first.
    pub fn display_list(&self) -> Vec<DisplayEntry> {
        self.records
            .iter()
            .rev()
            .map(|record| {
                let scale = record.category.scale_entry();
                DisplayEntry {
                    id: record.id.clone(),
                    when_label: format_timestamp_label(&record.created_at, &self.offset),
                    duration_label: format_minutes_seconds(record.duration_seconds),
                    duration_seconds: record.duration_seconds,
                    category: record.category,
                    category_label: scale.label,
                    category_description: scale.description,
                    color_tag: record.color_tag.clone(),
                    notes: record.notes.clone(),
                    commentary: record.commentary_text().map(str::to_string),
                }
            })
            .collect()
    }

    pub fn snapshot(&self, recent_window: usize) -> ReportSnapshot {
        ReportSnapshot {
            count: self.count(),
            average_duration_seconds: self.average_duration_seconds(),
            average_duration_minutes: self.average_duration_minutes(),
            recent: self.recent_series(recent_window),
            entries: self.display_list(),
        }
    }

    /// Snapshot with the default trend window.
    pub fn default_snapshot(&self) -> ReportSnapshot {
        self.snapshot(DEFAULT_RECENT_WINDOW)
    }
}
