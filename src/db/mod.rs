//! Persistence layer for the throne library.
//!
//! The core only needs a key-value interface: the whole record history is
//! stored as one JSON document under one key and rewritten on every append.
//!
//! ## Features
//!
//! - **Storage Interface**: [`kv::KeyValueStore`] abstracts the substrate
//! - **SQLite Backend**: durable single-table store in the data directory
//! - **In-Memory Backend**: shared map with switchable write failures
//! - **Record Store**: validated, append-only session history
//!
//! ## Usage
//!
//! ```rust
//! use throne::db::kv::MemoryKv;
//! use throne::db::records::RecordStore;
//!
//! let store = RecordStore::open(MemoryKv::new(), "session_records");
//! assert!(store.records().is_empty());
//! ```

/// SQLite connection management.
pub mod db;

/// Key-value interface, storage errors and the in-memory backend.
pub mod kv;

/// Append-only session record history.
pub mod records;

/// SQLite implementation of the key-value interface.
pub mod sqlite_kv;
