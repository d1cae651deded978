//! Companion chat transcript.
//!
//! Chat messages only live while the social view is open. They carry no
//! persistence or aggregation contract; the transcript exists so the chat
//! request can be given the last few turns of conversation.

use crate::libs::messages::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of previous turns sent along with a chat message.
pub const DEFAULT_HISTORY_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    #[serde(rename = "anon")]
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// The message as one line of conversation history.
    pub fn history_line(&self) -> String {
        match self.sender {
            Sender::User => format!("Me: {}", self.text),
            Sender::Ai | Sender::Anonymous => format!("You: {}", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// A transcript opened with an anonymous neighbour's message and the
    /// companion's greeting.
    pub fn seeded() -> Self {
        Self {
            messages: vec![
                ChatMessage::new(Sender::Anonymous, Message::AnonymousNeighbourMessage.to_string()),
                ChatMessage::new(Sender::Ai, Message::CompanionGreeting.to_string()),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The last `n` messages rendered as history lines, oldest first.
    pub fn history_lines(&self, n: usize) -> Vec<String> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter().map(ChatMessage::history_line).collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded()
    }
}
