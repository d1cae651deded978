//! Commentary provider integration.
//!
//! Three touchpoints of the tracker ask an external text-generation service
//! for short pieces of text:
//!
//! - **analysis**: a playful health note about a finished session
//! - **entertainment**: something to read while a session is running
//! - **chat**: the reply of the companion in the social view
//!
//! [`CommentaryProvider`] is the seam to the service. [`GeminiProvider`]
//! talks to the Gemini REST API; tests substitute their own providers.
//!
//! The provider is allowed to fail. [`Commentary`] wraps it and turns every
//! failure (missing credential, transport error, bad status, empty text) into
//! a fixed fallback message, so a commentary request never surfaces an error
//! to the caller. [`Dispatcher`] runs those requests in the background and
//! hands the results back as [`CommentaryUpdate`]s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use throne::api::{Commentary, GeminiProvider};
//! use throne::libs::config::CommentaryConfig;
//! use throne::libs::session::Preference;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let provider = GeminiProvider::from_env(&CommentaryConfig::default());
//! let commentary = Commentary::new(Arc::new(provider));
//! let reply = commentary.entertain(Preference::Work).await;
//! println!("{}", reply.text);
//! # }
//! ```

use crate::libs::messages::Message;
use crate::libs::record::Category;
use crate::libs::session::Preference;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod commentary;
pub mod dispatch;
pub mod gemini;
pub mod prompts;

pub use commentary::{Commentary, CommentaryReply, ReplyOutcome};
pub use dispatch::{CommentaryUpdate, Dispatcher, Ticket};
pub use gemini::GeminiProvider;

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("no credential configured ({0} is not set)")]
    MissingCredential(String),
    #[error("commentary request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("commentary service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("commentary service returned an unreadable response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Other(String),
}

/// Where a piece of commentary is requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Touchpoint {
    Analysis,
    Entertainment,
    Chat,
}

impl Touchpoint {
    /// Shown when the provider could not be reached or refused the request.
    pub fn unavailable_message(self) -> Message {
        match self {
            Touchpoint::Analysis => Message::AnalysisUnavailable,
            Touchpoint::Entertainment => Message::EntertainmentUnavailable,
            Touchpoint::Chat => Message::ChatUnavailable,
        }
    }

    /// Shown when the provider answered with no text.
    pub fn empty_message(self) -> Message {
        match self {
            Touchpoint::Analysis => Message::AnalysisEmpty,
            Touchpoint::Entertainment => Message::EntertainmentEmpty,
            Touchpoint::Chat => Message::ChatEmpty,
        }
    }
}

impl fmt::Display for Touchpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Touchpoint::Analysis => "analysis",
            Touchpoint::Entertainment => "entertainment",
            Touchpoint::Chat => "chat",
        };
        write!(f, "{}", name)
    }
}

/// A text-generation backend.
///
/// Implementations return the raw generated text. An empty string is a
/// valid answer; [`Commentary`] replaces it with a fallback.
#[async_trait]
pub trait CommentaryProvider: Send + Sync {
    async fn analyze(&self, category: Category, color_tag: &str, duration_seconds: u64, notes: &str) -> Result<String, CommentaryError>;

    async fn entertain(&self, preference: Preference) -> Result<String, CommentaryError>;

    /// `history` holds previous turns, oldest first, already rendered as lines.
    async fn chat(&self, message: &str, history: &[String]) -> Result<String, CommentaryError>;
}
