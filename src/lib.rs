//! # Throne - personal session tracker
//!
//! Times bathroom sessions, lets the user annotate each one on the 7-point
//! stool-form scale, keeps the history in local storage and summarizes it.
//! A text-generation service adds a little commentary along the way.
//!
//! ## Features
//!
//! - **Session Lifecycle**: idle, active, annotating, report and social views
//!   as one state machine with explicit transitions
//! - **Session Timer**: whole-second counter that is the authoritative duration
//! - **Record Store**: append-only history over a key-value store (SQLite or
//!   in-memory)
//! - **Report**: count, average duration, recent trend and display list
//! - **Commentary**: health analysis, entertainment and companion chat, with
//!   fixed fallbacks whenever the service is unavailable
//!
//! ## Usage
//!
//! ```rust,no_run
//! use throne::libs::record::{Annotation, Category};
//! use throne::libs::tracker::Tracker;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     throne::libs::logging::init();
//!
//!     let mut tracker = Tracker::open()?;
//!     tracker.start_session()?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     tracker.finish_session()?;
//!     tracker.save(Annotation {
//!         category: Category::new(4)?,
//!         ..Annotation::default()
//!     })?;
//!     println!("{:?}", tracker.report());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod db;
pub mod libs;
