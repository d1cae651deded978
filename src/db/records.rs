//! Append-only store of completed session records.
//!
//! The whole history is one JSON array stored under a single key of a
//! [`KeyValueStore`]. It is read once when the store is opened and rewritten
//! in full on every append.
//!
//! ## Guarantees
//!
//! - **Append-only**: there is no update, delete or reorder operation
//! - **Ordered**: the collection order is the save order
//! - **Unique ids**: a record whose id is already present is rejected
//! - **All-or-nothing appends**: the in-memory collection only changes after
//!   the full payload has been written; a failed write leaves it untouched
//! - **Serialized writers**: an internal mutex is held from validation to the
//!   end of the write, so concurrent appends cannot interleave their
//!   read-modify-write cycles
//! - **Recoverable loads**: missing data is an empty history; unreadable data
//!   is backed up under `<key>.corrupt`, reported as a warning and replaced by
//!   an empty history
//! - **No blind overwrites**: while the persisted history has neither been
//!   read nor backed up, every append first re-reads it and is refused with
//!   [`StoreError::HistoryUnavailable`] if that still fails
//!
//! ## Usage
//!
//! ```rust
//! use throne::db::kv::MemoryKv;
//! use throne::db::records::RecordStore;
//! use throne::libs::record::{Annotation, FinishedSession, SessionRecord};
//! use chrono::Utc;
//!
//! let store = RecordStore::open(MemoryKv::new(), "session_records");
//! let finished = FinishedSession::new(120, Utc::now().timestamp_millis());
//! let record = SessionRecord::from_session(&finished, &Annotation::default(), None, Utc::now());
//!
//! let records = store.append(record)?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(store.load_all()?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::db::kv::{KeyValueStore, KvError};
use crate::libs::messages::Message;
use crate::libs::record::{SessionRecord, ValidationError};
use crate::{msg_debug, msg_error, msg_info, msg_warning};
use parking_lot::Mutex;
use std::iter;
use thiserror::Error;

/// Key the history is stored under unless configured otherwise.
pub const DEFAULT_RECORDS_KEY: &str = "session_records";

/// Suffix of the key an unreadable payload is copied to.
pub const CORRUPT_BACKUP_SUFFIX: &str = ".corrupt";

/// Why an append was refused.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to serialize session records: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to write session records: {0}")]
    Write(#[from] KvError),
    #[error("persisted session records are unavailable, refusing to overwrite them: {0}")]
    HistoryUnavailable(#[source] LoadError),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// Serialization and write failures; the caller may retry these.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            StoreError::Serialization(_) | StoreError::Write(_) | StoreError::HistoryUnavailable(_)
        )
    }
}

/// Why the persisted history could not be read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read session records: {0}")]
    Read(#[from] KvError),
    #[error("persisted session records are corrupt: {0}")]
    Deserialization(#[from] serde_json::Error),
}

struct Inner<K> {
    kv: K,
    records: Vec<SessionRecord>,
    /// False while the persisted payload is neither loaded nor backed up.
    settled: bool,
}

pub struct RecordStore<K: KeyValueStore> {
    key: String,
    inner: Mutex<Inner<K>>,
    load_warning: Option<LoadError>,
}

impl<K: KeyValueStore> RecordStore<K> {
    /// Opens the store and loads the persisted history.
    ///
    /// Never fails: unreadable history is replaced by an empty one and the
    /// reason is kept in [`load_warning`](Self::load_warning). Until the
    /// payload has been read or backed up, appends re-read it first.
    pub fn open(kv: K, key: impl Into<String>) -> Self {
        let key = key.into();
        let (records, settled, load_warning) = match read_records(&kv, &key) {
            Ok(records) => {
                msg_debug!(Message::RecordsLoaded(records.len()));
                (records, true, None)
            }
            Err(error) => {
                let settled = match &error {
                    LoadError::Deserialization(e) => {
                        msg_warning!(Message::RecordsCorrupt(e.to_string()));
                        backup_corrupt_payload(&kv, &key).is_ok()
                    }
                    LoadError::Read(e) => {
                        msg_warning!(Message::RecordsReadFailed(e.to_string()));
                        false
                    }
                };
                (Vec::new(), settled, Some(error))
            }
        };

        Self {
            key,
            inner: Mutex::new(Inner { kv, records, settled }),
            load_warning,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The problem encountered while loading, if the history was discarded.
    pub fn load_warning(&self) -> Option<&LoadError> {
        self.load_warning.as_ref()
    }

    /// Reads the persisted collection again, without touching memory.
    pub fn load_all(&self) -> Result<Vec<SessionRecord>, LoadError> {
        let inner = self.inner.lock();
        read_records(&inner.kv, &self.key)
    }

    /// Validates `record`, appends it and rewrites the persisted collection.
    ///
    /// Returns the new collection. On error nothing has been written and the
    /// record is not in memory. A history recovered by the re-read before a
    /// rejected append stays loaded.
    pub fn append(&self, record: SessionRecord) -> Result<Vec<SessionRecord>, StoreError> {
        let mut inner = self.inner.lock();

        if !inner.settled {
            self.settle(&mut inner)?;
        }

        if let Err(error) = self.check(&inner.records, &record) {
            msg_debug!(Message::RecordRejected(error.to_string()));
            return Err(error.into());
        }

        let pending: Vec<&SessionRecord> = inner.records.iter().chain(iter::once(&record)).collect();
        let payload = serde_json::to_string(&pending).map_err(StoreError::Serialization)?;

        if let Err(error) = inner.kv.set(&self.key, &payload) {
            msg_debug!(Message::RecordsWriteFailed(error.to_string()));
            return Err(error.into());
        }

        inner.records.push(record);
        Ok(inner.records.clone())
    }

    /// Snapshot of the in-memory collection, oldest first.
    pub fn records(&self) -> Vec<SessionRecord> {
        self.inner.lock().records.clone()
    }

    /// Runs `f` over the collection without cloning it.
    pub fn with_records<R>(&self, f: impl FnOnce(&[SessionRecord]) -> R) -> R {
        f(&self.inner.lock().records)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retries the load that failed in [`open`](Self::open).
    ///
    /// A readable payload replaces the in-memory collection. A corrupt one is
    /// only given up once its backup has been written.
    fn settle(&self, inner: &mut Inner<K>) -> Result<(), StoreError> {
        match read_records(&inner.kv, &self.key) {
            Ok(records) => {
                msg_info!(Message::RecordsRecovered(records.len()));
                inner.records = records;
            }
            Err(LoadError::Deserialization(e)) => {
                if let Err(error) = backup_corrupt_payload(&inner.kv, &self.key) {
                    msg_warning!(Message::RecordsAppendRefused(error.to_string()));
                    return Err(StoreError::HistoryUnavailable(LoadError::Read(error)));
                }
                msg_debug!(Message::RecordsCorrupt(e.to_string()));
                inner.records.clear();
            }
            Err(error) => {
                msg_warning!(Message::RecordsAppendRefused(error.to_string()));
                return Err(StoreError::HistoryUnavailable(error));
            }
        }
        inner.settled = true;
        Ok(())
    }

    fn check(&self, records: &[SessionRecord], record: &SessionRecord) -> Result<(), ValidationError> {
        record.validate()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(ValidationError::DuplicateId(record.id.clone()));
        }
        Ok(())
    }
}

/// Reads and deserializes the collection stored under `key`.
///
/// A missing key, a blank value and a JSON `null` all mean "no history".
pub fn read_records<K: KeyValueStore + ?Sized>(kv: &K, key: &str) -> Result<Vec<SessionRecord>, LoadError> {
    let raw = match kv.get(key)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            msg_debug!(Message::RecordsNotFound);
            return Ok(Vec::new());
        }
    };

    let records: Option<Vec<SessionRecord>> = serde_json::from_str(&raw)?;
    Ok(records.unwrap_or_default())
}

fn backup_corrupt_payload<K: KeyValueStore>(kv: &K, key: &str) -> Result<(), KvError> {
    let backup_key = format!("{}{}", key, CORRUPT_BACKUP_SUFFIX);
    let result = kv.get(key).and_then(|raw| match raw {
        Some(raw) => kv.set(&backup_key, &raw),
        None => Ok(()),
    });

    match &result {
        Ok(()) => msg_warning!(Message::RecordsBackupCreated(backup_key)),
        Err(error) => msg_error!(Message::RecordsBackupFailed(error.to_string())),
    }
    result
}
