//! Tracing subscriber setup.
//!
//! `THRONE_DEBUG` turns on debug output for everything. Otherwise `RUST_LOG`
//! is honoured, falling back to `info`. Installing twice is harmless: the
//! second call leaves the first subscriber in place.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = if std::env::var("THRONE_DEBUG").is_ok() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
