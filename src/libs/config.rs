//! Configuration for the session tracker.
//!
//! Settings are stored as pretty-printed JSON in the per-user data
//! directory (see [`DataStorage`]). Every section is optional: a missing
//! file, or a file that omits a section, falls back to the defaults below.
//!
//! ## Sections
//!
//! - **storage**: the key the session history is persisted under
//! - **commentary**: endpoint, model and tuning of the commentary provider
//! - **report**: trend window and the long-session threshold
//!
//! The commentary provider's credential is never stored here. It is read
//! from the `GEMINI_API_KEY` environment variable, and a `.env` file in the
//! working directory is honoured.
//!
//! ```rust,no_run
//! use throne::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("recent window: {}", config.report().recent_window);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::records::DEFAULT_RECORDS_KEY;
use crate::libs::chat::DEFAULT_HISTORY_LINES;
use crate::libs::messages::Message;
use crate::msg_debug;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable holding the commentary provider credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ANALYSIS_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_RECENT_WINDOW: usize = 7;
pub const DEFAULT_LONG_SESSION_MINUTES: u64 = 20;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// Key of the session history in the key-value store.
    pub records_key: String,
}

/// Commentary provider settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CommentaryConfig {
    /// Base URL of the model endpoints; the model name is appended.
    pub api_url: String,
    pub model: String,
    /// Sampling temperature of the analysis request.
    pub analysis_temperature: f32,
    /// Previous chat turns sent along with a chat message.
    pub history_lines: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReportConfig {
    /// Number of most recent records in the trend series.
    pub recent_window: usize,
    /// Sessions longer than this many minutes are flagged in the trend.
    pub long_session_minutes: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<CommentaryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            records_key: DEFAULT_RECORDS_KEY.to_string(),
        }
    }
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        CommentaryConfig {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            analysis_temperature: DEFAULT_ANALYSIS_TEMPERATURE,
            history_lines: DEFAULT_HISTORY_LINES,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            recent_window: DEFAULT_RECENT_WINDOW,
            long_session_minutes: DEFAULT_LONG_SESSION_MINUTES,
        }
    }
}

impl Config {
    /// Reads the configuration from the default data directory.
    ///
    /// A missing file is not an error and yields the defaults. A file that
    /// exists but cannot be parsed is.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    /// Reads the configuration from a specific data directory.
    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            msg_debug!(Message::ConfigFileNotFound);
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        msg_debug!(Message::ConfigSaved);
        Ok(())
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn commentary(&self) -> CommentaryConfig {
        self.commentary.clone().unwrap_or_default()
    }

    pub fn report(&self) -> ReportConfig {
        self.report.clone().unwrap_or_default()
    }
}

/// The commentary credential from the environment (or `.env`), if set and
/// not blank.
pub fn api_key() -> Option<String> {
    dotenv::dotenv().ok();
    env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty())
}
