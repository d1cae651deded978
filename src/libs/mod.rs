//! Core library modules for the session tracker.
//!
//! ## Features
//!
//! - **Core Infrastructure**: configuration, data storage, messaging, logging
//! - **Session Lifecycle**: state machine, timer, tracker
//! - **Data Model**: session records and the classification scale
//! - **Presentation Helpers**: report aggregation, formatting, chat transcript

pub mod chat;
pub mod config;
pub mod data_storage;
pub mod formatter;
pub mod logging;
pub mod messages;
pub mod record;
pub mod report;
pub mod session;
pub mod timer;
pub mod tracker;
