//! Session lifecycle state machine.
//!
//! [`AppState`] is the single source of truth for which view the tracker is
//! in. Each variant carries only the data that view needs: a running
//! [`SessionTimer`] while active, the captured [`FinishedSession`] while the
//! user annotates it, and the chat transcript while the social view is open.
//! Because the data lives inside the variant, "annotating without a finished
//! session" or "two timers at once" cannot be expressed.
//!
//! ## Transitions
//!
//! ```text
//!            start                 finish
//!   Idle ───────────▶ Active ───────────────▶ Annotating
//!    ▲ │                                       │      │
//!    │ │ navigate        cancel                │      │ save
//!    │ ├──────────▶ Report ◀───────────────────┼──────┘
//!    │ │                                       │
//!    │ └──────────▶ Social                     │
//!    └─────────────────────────────────────────┘
//! ```
//!
//! Transition methods consume the state and return the next one. A refused
//! transition hands the unchanged state back inside [`Rejected`] together
//! with the reason, so nothing is lost and the caller can put it back.

use crate::libs::chat::{ChatMessage, Transcript};
use crate::libs::record::{Annotation, FinishedSession, SessionRecord, ValidationError};
use crate::libs::timer::{SessionTimer, TimerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What the user is doing during the session; steers entertainment content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Study,
    Work,
    #[default]
    Home,
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preference::Study => "study",
            Preference::Work => "work",
            Preference::Home => "home",
        };
        write!(f, "{}", name)
    }
}

/// The five views, without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Idle,
    Active,
    Annotating,
    Report,
    Social,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Idle => "idle",
            View::Active => "active",
            View::Annotating => "annotating",
            View::Report => "report",
            View::Social => "social",
        };
        write!(f, "{}", name)
    }
}

/// Operations that can be refused, named for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Finish,
    Save,
    Cancel,
    Navigate(View),
    ChangePreference,
    RequestAnalysis,
    RequestEntertainment,
    SendChat,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start => write!(f, "start a session"),
            Action::Finish => write!(f, "finish the session"),
            Action::Save => write!(f, "save the record"),
            Action::Cancel => write!(f, "discard the session"),
            Action::Navigate(view) => write!(f, "open the {} view", view),
            Action::ChangePreference => write!(f, "change the preference"),
            Action::RequestAnalysis => write!(f, "request an analysis"),
            Action::RequestEntertainment => write!(f, "request entertainment"),
            Action::SendChat => write!(f, "send a chat message"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} from the {from} view")]
    IllegalTransition { from: View, action: Action },
    #[error("the preference can only be changed while a session is active")]
    PreferenceLocked,
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] crate::db::records::StoreError),
}

/// A refused transition: the state it was attempted on, unchanged.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    pub state: AppState,
    #[source]
    pub error: SessionError,
}

impl Rejected {
    fn illegal(state: AppState, action: Action) -> Self {
        let from = state.view();
        Self {
            state,
            error: SessionError::IllegalTransition { from, action },
        }
    }
}

pub type Transition = Result<AppState, Rejected>;

#[derive(Debug)]
pub struct ActiveSession {
    timer: SessionTimer,
    preference: Preference,
    entertainment: Option<String>,
}

impl ActiveSession {
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn elapsed(&self) -> u64 {
        self.timer.elapsed()
    }

    pub fn preference(&self) -> Preference {
        self.preference
    }

    /// Entertainment text currently shown, if any arrived.
    pub fn entertainment(&self) -> Option<&str> {
        self.entertainment.as_deref()
    }

    pub fn set_entertainment(&mut self, text: String) {
        self.entertainment = Some(text);
    }
}

/// A finished session waiting for its annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    finished: FinishedSession,
    analysis_display: Option<String>,
    commentary: Option<String>,
}

impl PendingRecord {
    pub fn finished(&self) -> &FinishedSession {
        &self.finished
    }

    /// Text shown in the analysis panel; a fallback message after a failure.
    pub fn analysis_display(&self) -> Option<&str> {
        self.analysis_display.as_deref()
    }

    /// Commentary that will be attached to the saved record.
    pub fn commentary(&self) -> Option<&str> {
        self.commentary.as_deref()
    }

    /// Stores a successful analysis; it is both shown and attached.
    pub fn set_analysis(&mut self, text: String) {
        self.analysis_display = Some(text.clone());
        self.commentary = Some(text);
    }

    /// Shows a fallback message without attaching anything to the record.
    pub fn set_analysis_fallback(&mut self, text: String) {
        self.analysis_display = Some(text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SocialSession {
    transcript: Transcript,
}

impl SocialSession {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }
}

#[derive(Debug, Default)]
pub enum AppState {
    #[default]
    Idle,
    Active(ActiveSession),
    Annotating(PendingRecord),
    Report,
    Social(SocialSession),
}

impl AppState {
    pub fn view(&self) -> View {
        match self {
            AppState::Idle => View::Idle,
            AppState::Active(_) => View::Active,
            AppState::Annotating(_) => View::Annotating,
            AppState::Report => View::Report,
            AppState::Social(_) => View::Social,
        }
    }

    /// Idle → Active with a fresh timer at 0.
    pub fn start(self, preference: Preference) -> Transition {
        match self {
            AppState::Idle => match SessionTimer::start() {
                Ok(timer) => Ok(AppState::Active(ActiveSession {
                    timer,
                    preference,
                    entertainment: None,
                })),
                Err(error) => Err(Rejected {
                    state: AppState::Idle,
                    error: error.into(),
                }),
            },
            other => Err(Rejected::illegal(other, Action::Start)),
        }
    }

    /// Active → Annotating. The timer is stopped and its count becomes the
    /// session duration; `ended_at_ms` is the finish instant.
    pub fn finish(self, ended_at_ms: i64) -> Transition {
        match self {
            AppState::Active(active) => {
                let duration_seconds = active.timer.stop();
                Ok(AppState::Annotating(PendingRecord {
                    finished: FinishedSession::new(duration_seconds, ended_at_ms),
                    analysis_display: None,
                    commentary: None,
                }))
            }
            other => Err(Rejected::illegal(other, Action::Finish)),
        }
    }

    /// Annotating → Idle, discarding the session.
    pub fn cancel(self) -> Transition {
        match self {
            AppState::Annotating(_) => Ok(AppState::Idle),
            other => Err(Rejected::illegal(other, Action::Cancel)),
        }
    }

    /// Annotating → Report, once the record built by
    /// [`prepare_record`](Self::prepare_record) has been persisted.
    pub fn saved(self) -> Transition {
        match self {
            AppState::Annotating(_) => Ok(AppState::Report),
            other => Err(Rejected::illegal(other, Action::Save)),
        }
    }

    /// Moves between the non-session views.
    ///
    /// Idle opens Report or Social, and both return to Idle. Opening the
    /// current view is a no-op. Everything else is refused.
    pub fn navigate(self, target: View) -> Transition {
        match (self, target) {
            (AppState::Idle, View::Idle) => Ok(AppState::Idle),
            (AppState::Idle, View::Report) => Ok(AppState::Report),
            (AppState::Idle, View::Social) => Ok(AppState::Social(SocialSession::default())),
            (AppState::Report, View::Report) => Ok(AppState::Report),
            (AppState::Report, View::Idle) => Ok(AppState::Idle),
            (AppState::Social(social), View::Social) => Ok(AppState::Social(social)),
            (AppState::Social(_), View::Idle) => Ok(AppState::Idle),
            (other, target) => Err(Rejected::illegal(other, Action::Navigate(target))),
        }
    }

    /// Changes the preference of the running session.
    pub fn set_preference(&mut self, preference: Preference) -> Result<(), SessionError> {
        match self {
            AppState::Active(active) => {
                active.preference = preference;
                active.entertainment = None;
                Ok(())
            }
            _ => Err(SessionError::PreferenceLocked),
        }
    }

    /// Builds the record the pending session would be saved as.
    ///
    /// Only legal while annotating. The record's duration is the one captured
    /// when the timer stopped, and it is validated before being returned.
    pub fn prepare_record(&self, annotation: &Annotation, created_at: DateTime<Utc>) -> Result<SessionRecord, SessionError> {
        let pending = match self {
            AppState::Annotating(pending) => pending,
            other => {
                return Err(SessionError::IllegalTransition {
                    from: other.view(),
                    action: Action::Save,
                });
            }
        };

        let record = SessionRecord::from_session(&pending.finished, annotation, pending.commentary.clone(), created_at);
        record.validate()?;
        Ok(record)
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            AppState::Active(active) => Some(active),
            _ => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveSession> {
        match self {
            AppState::Active(active) => Some(active),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingRecord> {
        match self {
            AppState::Annotating(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingRecord> {
        match self {
            AppState::Annotating(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn social(&self) -> Option<&SocialSession> {
        match self {
            AppState::Social(social) => Some(social),
            _ => None,
        }
    }

    pub fn social_mut(&mut self) -> Option<&mut SocialSession> {
        match self {
            AppState::Social(social) => Some(social),
            _ => None,
        }
    }
}
