//! Key-value persistence interface.
//!
//! The record store never talks to a concrete storage engine. It reads and
//! writes whole string values under named keys through [`KeyValueStore`],
//! which is implemented by the SQLite-backed [`SqliteKv`](super::sqlite_kv::SqliteKv)
//! and by [`MemoryKv`] for tests and embedders.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failure of the storage substrate itself.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-valued key-value store.
///
/// `set` must be durable when it returns `Ok`: callers rely on it to decide
/// whether their in-memory state may be committed.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }
}

/// In-memory store. Clones share the same map.
///
/// Writes can be switched to fail, which lets callers exercise their
/// persistence error paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryKv {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail (or succeed again) until toggled.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes a raw value, bypassing the failure switch.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable(format!("write to '{}' rejected", key)));
        }
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
