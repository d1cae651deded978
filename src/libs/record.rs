//! Session record data model and validation.
//!
//! A [`SessionRecord`] is the persisted, immutable summary of one completed
//! and annotated session. Records are built exactly once, when the user
//! confirms the annotation step, from the [`FinishedSession`] captured at the
//! end of the timed session and the user's [`Annotation`].
//!
//! ## Classification Scale
//!
//! The [`Category`] newtype only admits values of the fixed 7-point stool-form
//! scale, so an out-of-range category cannot reach the record store. The
//! human-readable table lives in [`CLASSIFICATION_SCALE`].
//!
//! ## Wire Format
//!
//! Records serialize as camelCase JSON objects. Payloads written by earlier
//! versions of the app used `bristolType`, `color`, `aiAnalysis` and `date`;
//! those names are still accepted when reading.
//!
//! ```rust
//! use throne::libs::record::{Annotation, Category, FinishedSession, SessionRecord};
//! use chrono::Utc;
//!
//! let finished = FinishedSession::new(185, 1_700_000_185_000);
//! let annotation = Annotation {
//!     category: Category::new(4)?,
//!     ..Annotation::default()
//! };
//! let record = SessionRecord::from_session(&finished, &annotation, None, Utc::now());
//! assert_eq!(record.end_time - record.start_time, 185_000);
//! record.validate()?;
//! # Ok::<(), throne::libs::record::ValidationError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Allowed gap, in milliseconds, between `end_time - start_time` and the
/// recorded duration.
pub const TIMESTAMP_TOLERANCE_MS: i64 = 1000;

/// Color tag the annotation form starts with.
pub const DEFAULT_COLOR_TAG: &str = "#8B4513";

/// Palette offered by the annotation form. Stored tags are not checked
/// against it.
pub const COLOR_PALETTE: [&str; 7] = ["#8B4513", "#654321", "#D2691E", "#556B2F", "#800000", "#000000", "#F0E68C"];

/// One row of the classification scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleEntry {
    pub kind: u8,
    pub label: &'static str,
    pub description: &'static str,
}

pub const CLASSIFICATION_SCALE: [ScaleEntry; 7] = [
    ScaleEntry {
        kind: 1,
        label: "Type 1",
        description: "Separate hard lumps, like nuts (hard to pass)",
    },
    ScaleEntry {
        kind: 2,
        label: "Type 2",
        description: "Sausage-shaped but lumpy",
    },
    ScaleEntry {
        kind: 3,
        label: "Type 3",
        description: "Like a sausage but with cracks on the surface",
    },
    ScaleEntry {
        kind: 4,
        label: "Type 4",
        description: "Like a sausage or snake, smooth and soft (ideal)",
    },
    ScaleEntry {
        kind: 5,
        label: "Type 5",
        description: "Soft blobs with clear-cut edges (passed easily)",
    },
    ScaleEntry {
        kind: 6,
        label: "Type 6",
        description: "Fluffy pieces with ragged edges, a mushy stool",
    },
    ScaleEntry {
        kind: 7,
        label: "Type 7",
        description: "Watery, no solid pieces (entirely liquid)",
    },
];

/// Reasons a record is rejected before it can touch the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("category {0} is outside the classification scale (1-7)")]
    CategoryOutOfRange(i64),
    #[error("record id must not be empty")]
    EmptyId,
    #[error("a record with id '{0}' already exists")]
    DuplicateId(String),
    #[error("timestamps {start_time}..{end_time} do not span {duration_seconds}s")]
    InconsistentTimestamps {
        start_time: i64,
        end_time: i64,
        duration_seconds: u64,
    },
}

/// A value on the 7-point classification scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Category(u8);

impl Category {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::CategoryOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn scale_entry(self) -> &'static ScaleEntry {
        &CLASSIFICATION_SCALE[(self.0 - Self::MIN) as usize]
    }

    pub fn label(self) -> &'static str {
        self.scale_entry().label
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<i64> for Category {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.0
    }
}

/// What the timed part of a session produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedSession {
    pub duration_seconds: u64,
    /// Milliseconds since epoch at the moment the finish signal was processed.
    pub ended_at_ms: i64,
}

impl FinishedSession {
    pub fn new(duration_seconds: u64, ended_at_ms: i64) -> Self {
        Self {
            duration_seconds,
            ended_at_ms,
        }
    }

    pub fn started_at_ms(&self) -> i64 {
        self.ended_at_ms - (self.duration_seconds as i64) * 1000
    }
}

/// User input collected by the annotation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub category: Category,
    pub color_tag: String,
    pub notes: String,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            category: Category::default(),
            color_tag: DEFAULT_COLOR_TAG.to_string(),
            notes: String::new(),
        }
    }
}

/// The persisted summary of one completed and annotated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_seconds: u64,
    #[serde(alias = "bristolType")]
    pub category: Category,
    #[serde(alias = "color")]
    pub color_tag: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, alias = "aiAnalysis", skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Builds a new record with a fresh id.
    ///
    /// `end_time` is the finish instant and `start_time` is derived from the
    /// duration, so the pair always spans exactly `duration_seconds`.
    pub fn from_session(finished: &FinishedSession, annotation: &Annotation, commentary: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time: finished.started_at_ms(),
            end_time: finished.ended_at_ms,
            duration_seconds: finished.duration_seconds,
            category: annotation.category,
            color_tag: annotation.color_tag.clone(),
            notes: annotation.notes.clone(),
            commentary,
            created_at,
        }
    }

    /// Checks the invariants that do not depend on the rest of the history.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }

        let span = self.end_time - self.start_time;
        let expected = (self.duration_seconds as i64).saturating_mul(1000);
        if span < 0 || (span - expected).abs() > TIMESTAMP_TOLERANCE_MS {
            return Err(ValidationError::InconsistentTimestamps {
                start_time: self.start_time,
                end_time: self.end_time,
                duration_seconds: self.duration_seconds,
            });
        }

        Ok(())
    }

    /// Commentary text, treating an empty string as absent.
    pub fn commentary_text(&self) -> Option<&str> {
        self.commentary.as_deref().filter(|text| !text.trim().is_empty())
    }
}

