//! Whole-second timer for one active session.
//!
//! A [`SessionTimer`] owns a tokio task that increments a counter once per
//! second, starting from 0. The counter is the authoritative session
//! duration: [`SessionTimer::stop`] captures its value and tears the task
//! down in one step.
//!
//! ## Teardown
//!
//! The ticker checks a `stopped` flag under the same lock it increments
//! under, and `stop` sets that flag under the lock before reading the value.
//! Once `stop` returns no further increment can happen, even if the aborted
//! task is still being polled on another worker. Dropping a timer without
//! stopping it goes through the same path.
//!
//! ## Display
//!
//! Presentation code subscribes to a `watch` channel that receives every new
//! count, so the ticking display never reads the counter directly.
//!
//! ```rust,no_run
//! use throne::libs::timer::SessionTimer;
//!
//! # async fn demo() -> Result<(), throne::libs::timer::TimerError> {
//! let timer = SessionTimer::start()?;
//! let mut display = timer.subscribe();
//! display.changed().await.ok();
//! let seconds = timer.stop();
//! # Ok(())
//! # }
//! ```

use crate::libs::messages::Message;
use crate::msg_debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Interval between increments.
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("the session timer needs a running tokio runtime")]
    NoRuntime,
}

#[derive(Debug)]
struct TimerState {
    elapsed: u64,
    stopped: bool,
    display: watch::Sender<u64>,
}

#[derive(Debug)]
pub struct SessionTimer {
    state: Arc<Mutex<TimerState>>,
    ticker: Option<JoinHandle<()>>,
    display: watch::Receiver<u64>,
}

impl SessionTimer {
    /// Starts a fresh counter at 0 on the current tokio runtime.
    pub fn start() -> Result<Self, TimerError> {
        let handle = Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
        let (display_tx, display_rx) = watch::channel(0);
        let state = Arc::new(Mutex::new(TimerState {
            elapsed: 0,
            stopped: false,
            display: display_tx,
        }));

        let ticker_state = state.clone();
        let ticker = handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let mut state = ticker_state.lock();
                if state.stopped {
                    break;
                }
                state.elapsed += 1;
                state.display.send_replace(state.elapsed);
            }
        });

        Ok(Self {
            state,
            ticker: Some(ticker),
            display: display_rx,
        })
    }

    /// Current count, in whole seconds.
    pub fn elapsed(&self) -> u64 {
        self.state.lock().elapsed
    }

    /// Receiver that observes every new count.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.display.clone()
    }

    /// Stops the counter and returns its final value.
    pub fn stop(mut self) -> u64 {
        let elapsed = self.teardown();
        msg_debug!(Message::TimerStopped(elapsed));
        elapsed
    }

    fn teardown(&mut self) -> u64 {
        let elapsed = {
            let mut state = self.state.lock();
            state.stopped = true;
            state.elapsed
        };
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        elapsed
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            self.teardown();
        }
    }
}
