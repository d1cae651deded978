//! The session tracker: state machine, history and commentary in one place.
//!
//! [`Tracker`] owns the current [`AppState`], the [`RecordStore`] and the
//! commentary [`Dispatcher`]. All user actions go through it, and it is the
//! only place where the three meet:
//!
//! - starting a session also asks for entertainment content
//! - saving builds the record from the pending session, appends it and only
//!   then leaves the annotation view
//! - commentary results are applied to the view they were requested for, or
//!   dropped
//!
//! ## Stale results
//!
//! Every successful transition and every preference change bumps a
//! generation counter. Requests are tagged with the generation they were
//! issued in, and [`Tracker::poll_commentary`] discards any result whose tag
//! no longer matches. A slow analysis therefore cannot land in the next
//! session, and entertainment for an old preference is never shown.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use throne::libs::tracker::Tracker;
//! use throne::libs::record::Annotation;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut tracker = Tracker::open()?;
//! tracker.start_session()?;
//! // ... time passes ...
//! tracker.finish_session()?;
//! let record = tracker.save(Annotation::default())?;
//! println!("saved {} ({}s)", record.id, record.duration_seconds);
//! let report = tracker.report();
//! println!("{} sessions, {:.0}s on average", report.count, report.average_duration_seconds);
//! # Ok(())
//! # }
//! ```

use crate::api::{Commentary, CommentaryUpdate, Dispatcher, GeminiProvider, Ticket, Touchpoint};
use crate::db::kv::KeyValueStore;
use crate::db::records::RecordStore;
use crate::db::sqlite_kv::SqliteKv;
use crate::libs::chat::{ChatMessage, Sender};
use crate::libs::config::{Config, ReportConfig};
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::record::{Annotation, SessionRecord};
use crate::libs::report::{Report, ReportSnapshot};
use crate::libs::session::{Action, AppState, Preference, Rejected, SessionError, Transition, View};
use crate::{msg_debug, msg_warning};
use anyhow::Result;
use chrono::{FixedOffset, Utc};
use std::mem;
use std::sync::Arc;

pub struct Tracker<K: KeyValueStore> {
    state: AppState,
    store: RecordStore<K>,
    dispatcher: Dispatcher,
    preference: Preference,
    generation: u64,
    report_config: ReportConfig,
    history_lines: usize,
    offset: Option<FixedOffset>,
}

impl Tracker<SqliteKv> {
    /// Opens the tracker with the configuration and database of the default
    /// data directory.
    pub fn open() -> Result<Self> {
        Self::open_in(&DataStorage::new())
    }

    /// Opens the tracker on a specific data directory.
    ///
    /// An unreadable configuration file is reported and replaced by the
    /// defaults. Commentary uses the Gemini provider with the credential
    /// from the environment.
    pub fn open_in(storage: &DataStorage) -> Result<Self> {
        let config = Config::read_from(storage).unwrap_or_else(|error| {
            msg_warning!(Message::ConfigParseError(error.to_string()));
            Config::default()
        });
        let kv = SqliteKv::with_storage(storage)?;
        let store = RecordStore::open(kv, config.storage().records_key);
        let provider = GeminiProvider::from_env(&config.commentary());
        Ok(Self::new(store, Commentary::new(Arc::new(provider)), &config))
    }
}

impl<K: KeyValueStore> Tracker<K> {
    pub fn new(store: RecordStore<K>, commentary: Commentary, config: &Config) -> Self {
        Self {
            state: AppState::Idle,
            store,
            dispatcher: Dispatcher::new(commentary),
            preference: Preference::default(),
            generation: 0,
            report_config: config.report(),
            history_lines: config.commentary().history_lines,
            offset: None,
        }
    }

    /// Pins the UTC offset used for report labels.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.state.view()
    }

    pub fn store(&self) -> &RecordStore<K> {
        &self.store
    }

    /// The preference the next session starts with.
    pub fn preference(&self) -> Preference {
        self.preference
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Idle → Active. Also requests entertainment for the current
    /// preference.
    pub fn start_session(&mut self) -> Result<(), SessionError> {
        let preference = self.preference;
        self.transition(|state| state.start(preference))?;
        msg_debug!(Message::SessionStarted(preference.to_string()));
        self.request_entertainment()
    }

    /// Active → Annotating. Returns the captured duration in seconds.
    pub fn finish_session(&mut self) -> Result<u64, SessionError> {
        let ended_at_ms = Utc::now().timestamp_millis();
        self.transition(|state| state.finish(ended_at_ms))?;
        let duration = self.state.pending().map(|pending| pending.finished().duration_seconds).unwrap_or_default();
        msg_debug!(Message::SessionFinished(duration));
        Ok(duration)
    }

    /// Annotating → Report, persisting the annotated session.
    ///
    /// If the record cannot be built or written the tracker stays in the
    /// annotation view with everything intact, so the save can be retried.
    pub fn save(&mut self, annotation: Annotation) -> Result<SessionRecord, SessionError> {
        let record = self.state.prepare_record(&annotation, Utc::now())?;
        self.store.append(record.clone())?;
        self.transition(AppState::saved)?;
        msg_debug!(Message::SessionSaved(record.id.clone()));
        Ok(record)
    }

    /// Annotating → Idle, discarding the session.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.transition(AppState::cancel)?;
        msg_debug!(Message::SessionCancelled);
        Ok(())
    }

    pub fn open_report(&mut self) -> Result<ReportSnapshot, SessionError> {
        self.transition(|state| state.navigate(View::Report))?;
        Ok(self.report())
    }

    pub fn open_social(&mut self) -> Result<(), SessionError> {
        self.transition(|state| state.navigate(View::Social))
    }

    pub fn go_idle(&mut self) -> Result<(), SessionError> {
        self.transition(|state| state.navigate(View::Idle))
    }

    /// Changes the preference of the running session and asks for matching
    /// entertainment. Results requested for the old preference are dropped.
    pub fn set_preference(&mut self, preference: Preference) -> Result<(), SessionError> {
        if let Err(error) = self.state.set_preference(preference) {
            msg_debug!(Message::PreferenceLocked);
            return Err(error);
        }
        self.preference = preference;
        self.generation += 1;
        msg_debug!(Message::PreferenceChanged(preference.to_string()));
        self.request_entertainment()
    }

    pub fn request_entertainment(&mut self) -> Result<(), SessionError> {
        let preference = match self.state.active() {
            Some(active) => active.preference(),
            None => return Err(self.illegal(Action::RequestEntertainment)),
        };
        let ticket = self.ticket();
        self.dispatcher.entertain(ticket, preference);
        Ok(())
    }

    /// Asks for an analysis of the pending session with the annotation as
    /// currently filled in.
    pub fn request_analysis(&mut self, annotation: &Annotation) -> Result<(), SessionError> {
        let duration_seconds = match self.state.pending() {
            Some(pending) => pending.finished().duration_seconds,
            None => return Err(self.illegal(Action::RequestAnalysis)),
        };
        let ticket = self.ticket();
        self.dispatcher.analyze(
            ticket,
            annotation.category,
            annotation.color_tag.clone(),
            duration_seconds,
            annotation.notes.clone(),
        );
        Ok(())
    }

    /// Adds the user's message to the transcript and asks for a reply.
    pub fn send_chat(&mut self, text: &str) -> Result<(), SessionError> {
        let history_lines = self.history_lines;
        let ticket = self.ticket();
        let social = match self.state.social_mut() {
            Some(social) => social,
            None => return Err(self.illegal(Action::SendChat)),
        };

        let history = social.transcript().history_lines(history_lines);
        social.push(ChatMessage::new(Sender::User, text));
        self.dispatcher.chat(ticket, text.to_string(), history);
        Ok(())
    }

    /// Applies every commentary result that has already arrived. Returns how
    /// many were applied; stale ones are dropped.
    pub fn poll_commentary(&mut self) -> usize {
        let mut applied = 0;
        while let Some(update) = self.dispatcher.try_next() {
            if self.apply(update) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next commentary result and applies it. Returns whether
    /// it was applied, or `None` at once if no request is outstanding.
    pub async fn next_commentary(&mut self) -> Option<bool> {
        let update = self.dispatcher.next().await?;
        Some(self.apply(update))
    }

    /// Aggregates the current history.
    pub fn report(&self) -> ReportSnapshot {
        let window = self.report_config.recent_window;
        let long_minutes = self.report_config.long_session_minutes;
        let offset = self.offset;
        self.store.with_records(|records| {
            let report = Report::new(records).with_long_session_minutes(long_minutes);
            let report = match offset {
                Some(offset) => report.with_offset(offset),
                None => report,
            };
            report.snapshot(window)
        })
    }

    /// Location search is not backed by any service yet.
    pub fn find_location(&self) -> Message {
        Message::LocationSearchSimulated
    }

    fn apply(&mut self, update: CommentaryUpdate) -> bool {
        if update.ticket != self.ticket() {
            msg_debug!(Message::CommentaryDiscarded(update.touchpoint.to_string()));
            return false;
        }

        let reply = update.reply;
        match (update.touchpoint, &mut self.state) {
            (Touchpoint::Entertainment, AppState::Active(active)) => {
                active.set_entertainment(reply.text);
                true
            }
            (Touchpoint::Analysis, AppState::Annotating(pending)) => {
                if reply.is_generated() {
                    pending.set_analysis(reply.text);
                } else {
                    pending.set_analysis_fallback(reply.text);
                }
                true
            }
            (Touchpoint::Chat, AppState::Social(social)) => {
                social.push(ChatMessage::new(Sender::Ai, reply.text));
                true
            }
            (touchpoint, _) => {
                msg_debug!(Message::CommentaryDiscarded(touchpoint.to_string()));
                false
            }
        }
    }

    fn transition(&mut self, step: impl FnOnce(AppState) -> Transition) -> Result<(), SessionError> {
        let state = mem::take(&mut self.state);
        let previous = state.view();
        match step(state) {
            Ok(next) => {
                // Re-opening the current view keeps outstanding requests valid.
                if next.view() != previous {
                    self.generation += 1;
                }
                self.state = next;
                Ok(())
            }
            Err(Rejected { state, error }) => {
                self.state = state;
                if let SessionError::IllegalTransition { from, action } = &error {
                    msg_debug!(Message::IllegalTransition {
                        from: from.to_string(),
                        action: action.to_string(),
                    });
                }
                Err(error)
            }
        }
    }

    fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn illegal(&self, action: Action) -> SessionError {
        SessionError::IllegalTransition {
            from: self.state.view(),
            action,
        }
    }
}
