//! SQLite-backed key-value store.
//!
//! Keeps every value in a single `kv` table inside the application database.
//! A write is one `INSERT OR REPLACE` statement, so a value is either fully
//! replaced or left as it was.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use throne::db::kv::KeyValueStore;
//! use throne::db::sqlite_kv::SqliteKv;
//!
//! let kv = SqliteKv::new()?;
//! kv.set("greeting", "hello")?;
//! assert_eq!(kv.get("greeting")?, Some("hello".to_string()));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::db::db::Db;
use crate::db::kv::{KeyValueStore, KvError};
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

/// SQL schema for the key-value table.
const SCHEMA_KV: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT NOT NULL PRIMARY KEY,
    value TEXT NOT NULL
)";

const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";

const UPSERT_VALUE: &str = "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)";

#[derive(Clone)]
pub struct SqliteKv {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKv {
    /// Opens the store in the default application data directory.
    pub fn new() -> Result<Self> {
        Self::from_db(Db::new()?)
    }

    pub fn with_storage(storage: &DataStorage) -> Result<Self> {
        Self::from_db(Db::with_storage(storage)?)
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_db(Db::open(path)?)
    }

    fn from_db(db: Db) -> Result<Self> {
        db.conn.execute(SCHEMA_KV, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(db.conn)),
        })
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let conn = self.conn.lock();
        let value = conn.query_row(SELECT_VALUE, params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let conn = self.conn.lock();
        conn.execute(UPSERT_VALUE, params![key, value])?;
        Ok(())
    }
}
