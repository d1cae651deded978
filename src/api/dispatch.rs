//! Background execution of commentary requests.
//!
//! Each request runs as its own tokio task and reports back over an
//! unbounded channel. Every request carries a [`Ticket`] naming the state
//! generation it was issued in; the receiver compares it with its current
//! generation and drops results that arrive after the state moved on.
//!
//! Without a runtime the request degrades immediately: the fallback reply
//! is queued as if the provider had failed.
//!
//! The dispatcher counts the requests whose result has not been taken yet,
//! so [`Dispatcher::next`] returns `None` instead of waiting when nothing is
//! outstanding.

use super::commentary::{Commentary, CommentaryReply};
use super::Touchpoint;
use crate::libs::record::Category;
use crate::libs::session::Preference;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// The state generation a request was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryUpdate {
    pub ticket: Ticket,
    pub touchpoint: Touchpoint,
    pub reply: CommentaryReply,
}

pub struct Dispatcher {
    commentary: Commentary,
    tx: mpsc::UnboundedSender<CommentaryUpdate>,
    rx: mpsc::UnboundedReceiver<CommentaryUpdate>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(commentary: Commentary) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            commentary,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn commentary(&self) -> &Commentary {
        &self.commentary
    }

    pub fn analyze(&mut self, ticket: Ticket, category: Category, color_tag: String, duration_seconds: u64, notes: String) {
        let commentary = self.commentary.clone();
        self.spawn(ticket, Touchpoint::Analysis, async move {
            commentary.analyze(category, &color_tag, duration_seconds, &notes).await
        });
    }

    pub fn entertain(&mut self, ticket: Ticket, preference: Preference) {
        let commentary = self.commentary.clone();
        self.spawn(ticket, Touchpoint::Entertainment, async move { commentary.entertain(preference).await });
    }

    pub fn chat(&mut self, ticket: Ticket, message: String, history: Vec<String>) {
        let commentary = self.commentary.clone();
        self.spawn(ticket, Touchpoint::Chat, async move { commentary.chat(&message, &history).await });
    }

    /// Requests issued whose result has not been taken yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Next finished request, if one is already waiting.
    pub fn try_next(&mut self) -> Option<CommentaryUpdate> {
        let update = self.rx.try_recv().ok()?;
        self.in_flight -= 1;
        Some(update)
    }

    /// Waits for the next finished request. Returns `None` at once when no
    /// request is outstanding.
    pub async fn next(&mut self) -> Option<CommentaryUpdate> {
        if self.in_flight == 0 {
            return None;
        }
        let update = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(update)
    }

    fn spawn<F>(&mut self, ticket: Ticket, touchpoint: Touchpoint, request: F)
    where
        F: Future<Output = CommentaryReply> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let reply = request.await;
                    let _ = tx.send(CommentaryUpdate { ticket, touchpoint, reply });
                });
            }
            Err(_) => {
                let reply = CommentaryReply::fallback(touchpoint.unavailable_message());
                let _ = tx.send(CommentaryUpdate { ticket, touchpoint, reply });
            }
        }
    }
}
