// Fixed-interval poller with visibility-driven pause/resume.
//
// No backoff and no jitter: while running, `tick()` completes once per
// period. While stopped it never completes, so it can sit in a
// `tokio::select!` unconditionally.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::protocol::Visibility;

pub struct Poller {
    period: Duration,
    pause_when_hidden: bool,
    interval: Option<Interval>,
}

impl Poller {
    /// Create a stopped poller.
    pub fn new(period: Duration, pause_when_hidden: bool) -> Self {
        Poller {
            period,
            pause_when_hidden,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Start the periodic timer; the first tick fires one full period from
    /// now. Returns `true` when the poller was stopped, in which case the
    /// caller should load immediately.
    pub fn start(&mut self) -> bool {
        if self.interval.is_some() {
            return false;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        info!("Polling started every {:?}", self.period);
        true
    }

    /// Cancel the timer. Returns `true` when it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.interval.take().is_some();
        if was_running {
            info!("Polling stopped");
        }
        was_running
    }

    /// React to the UI becoming visible or hidden.
    ///
    /// Returns `true` when the caller should fetch right away (the poller
    /// was paused and has just been resumed).
    pub fn on_visibility(&mut self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Hidden => {
                if self.pause_when_hidden {
                    self.stop();
                } else {
                    debug!("UI hidden, polling continues (pause_when_hidden=false)");
                }
                false
            }
            Visibility::Visible => self.start(),
        }
    }

    /// Wait for the next poll. Pends forever while stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
