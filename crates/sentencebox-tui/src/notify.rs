// Transient visual feedback: toast, "merit +1" floats, card flash.
//
// All timing is driven by the `now` passed in by the caller so the render
// loop and the tests share one clock.

use std::time::{Duration, Instant};

use sentencebox_core::config::UiConfig;
use sentencebox_core::model::SentenceId;
use sentencebox_core::protocol::Toast;

/// A toast and the moment it was shown.
#[derive(Debug, Clone)]
struct ActiveToast {
    toast: Toast,
    shown_at: Instant,
}

/// One floating "merit +1" label anchored to a card.
#[derive(Debug, Clone, Copy)]
pub struct Merit {
    pub sentence_id: SentenceId,
    started_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    sentence_id: SentenceId,
    started_at: Instant,
}

pub struct Notifier {
    toast_for: Duration,
    merit_for: Duration,
    flash_for: Duration,
    merit_text: String,
    toast: Option<ActiveToast>,
    merits: Vec<Merit>,
    flash: Option<Flash>,
}

impl Notifier {
    pub fn new(toast_for: Duration, merit_for: Duration, flash_for: Duration, merit_text: impl Into<String>) -> Self {
        Notifier {
            toast_for,
            merit_for,
            flash_for,
            merit_text: merit_text.into(),
            toast: None,
            merits: Vec::new(),
            flash: None,
        }
    }

    pub fn from_config(ui: &UiConfig) -> Self {
        Self::new(
            Duration::from_millis(ui.toast_ms),
            Duration::from_millis(ui.merit_ms),
            Duration::from_millis(ui.flash_ms),
            ui.merit_text.clone(),
        )
    }

    pub fn merit_text(&self) -> &str {
        &self.merit_text
    }

    /// Show `toast`, replacing any toast still on screen and restarting the
    /// display timer.
    pub fn show_toast(&mut self, toast: Toast, now: Instant) {
        self.toast = Some(ActiveToast {
            toast,
            shown_at: now,
        });
    }

    /// The toast to draw at `now`, if it has not expired.
    pub fn current_toast(&self, now: Instant) -> Option<&Toast> {
        self.toast
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < self.toast_for)
            .map(|t| &t.toast)
    }

    /// Start the copy feedback for a card: a new merit float and the flash.
    pub fn copied(&mut self, sentence_id: SentenceId, now: Instant) {
        self.merits.push(Merit {
            sentence_id,
            started_at: now,
        });
        self.flash = Some(Flash {
            sentence_id,
            started_at: now,
        });
    }

    /// Live merit floats with their progress in `[0, 1)`.
    pub fn merits(&self, now: Instant) -> impl Iterator<Item = (SentenceId, f32)> + '_ {
        let total = self.merit_for.as_secs_f32();
        self.merits.iter().filter_map(move |m| {
            let elapsed = now.saturating_duration_since(m.started_at);
            if elapsed >= self.merit_for || total <= 0.0 {
                return None;
            }
            Some((m.sentence_id, elapsed.as_secs_f32() / total))
        })
    }

    pub fn is_flashing(&self, sentence_id: SentenceId, now: Instant) -> bool {
        self.flash.is_some_and(|f| {
            f.sentence_id == sentence_id
                && now.saturating_duration_since(f.started_at) < self.flash_for
        })
    }

    /// Drop everything that has finished animating.
    pub fn prune(&mut self, now: Instant) {
        if self.current_toast(now).is_none() {
            self.toast = None;
        }
        let merit_for = self.merit_for;
        self.merits
            .retain(|m| now.saturating_duration_since(m.started_at) < merit_for);
        if let Some(flash) = self.flash {
            if !self.is_flashing(flash.sentence_id, now) {
                self.flash = None;
            }
        }
    }

    /// Whether anything is still animating.
    pub fn is_idle(&self) -> bool {
        self.toast.is_none() && self.merits.is_empty() && self.flash.is_none()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
