// Messages exchanged between the app loop and the UI.

use chrono::{DateTime, Local};

use crate::model::{Sentence, SentenceId};

/// Whether the UI is currently visible to the user (terminal focus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Reachability of the backend as seen by the last request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A short user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Toast {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Toast {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }
}

/// Commands from the UI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Refresh,
    Add {
        content: String,
        /// `None` or blank lets the backend pick its default group.
        group: Option<String>,
    },
    Delete {
        id: SentenceId,
    },
    RenameGroup {
        from: String,
        to: String,
    },
    DeleteGroup {
        name: String,
    },
    /// The UI copied this sentence to the clipboard.
    RecordCopy {
        id: SentenceId,
    },
    SetVisibility(Visibility),
    Quit,
}

/// Updates pushed from the app loop to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Full replacement of the sentence list.
    Sentences(Vec<Sentence>),
    Backend(BackendStatus),
    /// Time of the last successful fetch.
    Synced(DateTime<Local>),
    Toast(Toast),
    /// An add request is in flight (`true`) or finished (`false`).
    AddPending(bool),
    /// The add succeeded; the UI should clear its input.
    AddSucceeded,
    /// Polling is running (`true`) or paused (`false`).
    Polling(bool),
}
