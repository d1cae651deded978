//! Never-failing wrapper around a [`CommentaryProvider`].

use super::{CommentaryError, CommentaryProvider, Touchpoint};
use crate::libs::messages::Message;
use crate::libs::record::Category;
use crate::libs::session::Preference;
use crate::msg_debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The provider produced text.
    Generated,
    /// The provider failed or answered with nothing; the text is a fixed
    /// fallback message.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryReply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl CommentaryReply {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: ReplyOutcome::Generated,
        }
    }

    pub fn fallback(message: Message) -> Self {
        Self {
            text: message.to_string(),
            outcome: ReplyOutcome::Fallback,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.outcome == ReplyOutcome::Generated
    }
}

#[derive(Clone)]
pub struct Commentary {
    provider: Arc<dyn CommentaryProvider>,
}

impl Commentary {
    pub fn new(provider: Arc<dyn CommentaryProvider>) -> Self {
        Self { provider }
    }

    pub async fn analyze(&self, category: Category, color_tag: &str, duration_seconds: u64, notes: &str) -> CommentaryReply {
        let result = self.provider.analyze(category, color_tag, duration_seconds, notes).await;
        degrade(Touchpoint::Analysis, result)
    }

    pub async fn entertain(&self, preference: Preference) -> CommentaryReply {
        let result = self.provider.entertain(preference).await;
        degrade(Touchpoint::Entertainment, result)
    }

    pub async fn chat(&self, message: &str, history: &[String]) -> CommentaryReply {
        let result = self.provider.chat(message, history).await;
        degrade(Touchpoint::Chat, result)
    }
}

/// Turns a provider result into something that can always be shown.
pub fn degrade(touchpoint: Touchpoint, result: Result<String, CommentaryError>) -> CommentaryReply {
    match result {
        Ok(text) if !text.trim().is_empty() => CommentaryReply::generated(text.trim()),
        Ok(_) => CommentaryReply::fallback(touchpoint.empty_message()),
        Err(error) => {
            msg_debug!(Message::CommentaryFailed {
                touchpoint: touchpoint.to_string(),
                error: error.to_string(),
            });
            CommentaryReply::fallback(touchpoint.unavailable_message())
        }
    }
}
