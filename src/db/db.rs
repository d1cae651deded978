use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "throne.db";

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database file in the application data directory.
    pub fn new() -> Result<Db> {
        Self::with_storage(&DataStorage::new())
    }

    pub fn with_storage(storage: &DataStorage) -> Result<Db> {
        let db_file_path = storage.get_path(DB_FILE_NAME)?;
        Self::open(&db_file_path)
    }

    pub fn open(path: &Path) -> Result<Db> {
        let conn: Connection = Connection::open(path)?;

        Ok(Db { conn })
    }
}
