//! Display implementation for throne messages.
//!
//! Every user-facing string of the library, including the fallback texts shown
//! when the commentary service cannot answer, is defined here in one match so
//! that wording stays consistent and can be localized in one place.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === SESSION MESSAGES ===
            Message::SessionStarted(preference) => format!("Session started ({} mode)", preference),
            Message::SessionFinished(seconds) => format!("Session finished after {} seconds", seconds),
            Message::SessionCancelled => "Session discarded, nothing was recorded.".to_string(),
            Message::SessionSaved(id) => format!("Session record {} saved", id),
            Message::IllegalTransition { from, action } => format!("Cannot {} while in the {} view", action, from),
            Message::PreferenceChanged(preference) => format!("Preference switched to {}", preference),
            Message::PreferenceLocked => "The preference can only be changed during an active session.".to_string(),
            Message::TimerStopped(seconds) => format!("Timer stopped at {} seconds", seconds),

            // === RECORD STORE MESSAGES ===
            Message::RecordsLoaded(count) => format!("Loaded {} session record(s)", count),
            Message::RecordsNotFound => "No saved session records, starting with an empty history.".to_string(),
            Message::RecordsCorrupt(error) => format!("Saved session records could not be read ({}), starting with an empty history.", error),
            Message::RecordsReadFailed(error) => format!("Session storage is unavailable ({}), saving is held until it can be read.", error),
            Message::RecordsBackupCreated(key) => format!("Unreadable session records were backed up under '{}'", key),
            Message::RecordsBackupFailed(error) => format!("Failed to back up unreadable session records: {}", error),
            Message::RecordsRecovered(count) => format!("Session storage is readable again, {} saved record(s) kept", count),
            Message::RecordsAppendRefused(error) => format!("Saved session records are still unavailable ({}), not overwriting them", error),
            Message::RecordRejected(error) => format!("Session record rejected: {}", error),
            Message::RecordsWriteFailed(error) => format!("Failed to save session records: {}", error),

            // === COMMENTARY MESSAGES ===
            Message::CredentialMissing(variable) => format!("{} is not set, commentary will use fallback texts.", variable),
            Message::CommentaryFailed { touchpoint, error } => format!("Commentary request '{}' failed: {}", touchpoint, error),
            Message::CommentaryDiscarded(touchpoint) => format!("Discarded late '{}' commentary for a view that is no longer shown", touchpoint),
            Message::AnalysisUnavailable => "The analysis service is too busy (it may be on the toilet too), please try again later!".to_string(),
            Message::AnalysisEmpty => "Can't reach the health assistant right now. Drink more water!".to_string(),
            Message::EntertainmentUnavailable => "Failed to load. Just focus on the task at hand.".to_string(),
            Message::EntertainmentEmpty => "Nothing to read right now.".to_string(),
            Message::ChatUnavailable => "Nobody in the next stall is answering...".to_string(),
            Message::ChatEmpty => "...".to_string(),
            Message::CompanionGreeting => "Hi, I'm your neighbour in the next stall. Bored? Let's chat.".to_string(),
            Message::AnonymousNeighbourMessage => "Anyone in the third-floor stall? There's no paper left!!".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigFileNotFound => "Configuration file not found, using defaults".to_string(),
            Message::ConfigParseError(error) => format!("Failed to parse configuration: {}", error),

            // === LOCATION MESSAGES ===
            Message::LocationSearchSimulated => "Simulated: navigating you to the nearest five-star restroom...".to_string(),
        };
        write!(f, "{}", text)
    }
}
