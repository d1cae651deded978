//! Convenient macros for library messaging and logging.
//!
//! The macros take a [`Message`](super::Message) (or anything `Display`) and
//! route it either to `tracing` or to the console:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Macro Call    │    │   Debug Mode    │    │   Output        │
//! │ msg_warning!()  │───▶│   Detection     │───▶│   Routing       │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                 │
//!                                 ▼
//!                        THRONE_DEBUG or RUST_LOG set?
//!                        yes → tracing::{info,warn,error,debug}!
//!                        no  → println!/eprintln!
//! ```
//!
//! ## Macro Categories
//!
//! - **`msg_info!`**: informational notices with ℹ️ prefix
//! - **`msg_warning!`**: recoverable problems with ⚠️ prefix
//! - **`msg_error!`**: failures reported to the user with ❌ prefix
//! - **`msg_debug!`**: debug-only diagnostics with 🔍 prefix
//!
//! ## Usage Examples
//!
//! ```rust
//! use throne::{msg_info, msg_warning};
//! use throne::libs::messages::Message;
//!
//! msg_info!(Message::RecordsNotFound);
//! msg_warning!(Message::RecordsCorrupt("expected value at line 1".to_string()));
//! ```

use std::sync::OnceLock;

/// Cached result of the debug mode check.
static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Returns `true` when `THRONE_DEBUG` or `RUST_LOG` is set.
///
/// The environment is inspected once per process.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("THRONE_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", $msg);
        } else {
            eprintln!("⚠️ {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
}

/// Debug diagnostics. Silent unless debug mode is on.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}
