// Application state and orchestration logic.
//
// The central event loop multiplexes user commands from the TUI with poll
// ticks. Every mutation goes to the backend first and is followed by a full
// re-fetch; the in-memory list is never edited locally.

use std::sync::Arc;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiError, SentenceApi};
use crate::config::Config;
use crate::model::{self, NewSentence, Sentence, SentenceId, SentenceUpdate};
use crate::protocol::{BackendStatus, Toast, UiUpdate, UserCommand};
use crate::sync::Poller;

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

pub const MSG_ADDED: &str = "Added";
pub const MSG_ADD_FAILED: &str = "Add failed, please retry";
pub const MSG_EMPTY_CONTENT: &str = "Please enter content";
pub const MSG_DELETED: &str = "Deleted";
pub const MSG_DELETE_FAILED: &str = "Delete failed, please retry";
pub const MSG_GROUP_RENAMED: &str = "Group renamed";
pub const MSG_GROUP_DELETED: &str = "Group deleted";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a CRUD action did not (fully) happen.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("content is empty")]
    EmptyContent,

    #[error("group name is empty")]
    EmptyGroupName,

    #[error("group is already named `{0}`")]
    SameGroupName(String),

    #[error("the default group `{0}` cannot be deleted")]
    DefaultGroupProtected(String),

    #[error("no sentences in group `{0}`")]
    UnknownGroup(String),

    #[error("{failed} of {total} updates failed")]
    Partial { failed: usize, total: usize },

    #[error(transparent)]
    Api(#[from] ApiError),
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub api: Arc<dyn SentenceApi>,
    /// Last list fetched from the backend, in server order.
    pub sentences: Vec<Sentence>,
    pub poller: Poller,
    pub backend: BackendStatus,
    pub last_sync: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn SentenceApi>) -> Self {
        let poller = Poller::new(config.poll_interval(), config.sync.pause_when_hidden);
        AppState {
            config,
            api,
            sentences: Vec::new(),
            poller,
            backend: BackendStatus::Offline,
            last_sync: None,
        }
    }

    pub fn default_group(&self) -> &str {
        &self.config.groups.default_group
    }

    /// Replace the in-memory list with the backend's.
    ///
    /// On failure the list is reset to empty so the UI shows the empty
    /// state instead of stale data.
    pub async fn load(&mut self) -> Result<usize, ApiError> {
        match self.api.list().await {
            Ok(list) => {
                let count = list.len();
                self.sentences = list;
                self.backend = BackendStatus::Online;
                self.last_sync = Some(Local::now());
                debug!("Loaded {} sentences", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load sentences: {}", e);
                self.sentences.clear();
                self.backend = BackendStatus::Offline;
                Err(e)
            }
        }
    }

    /// Create a sentence. Content is trimmed; a blank group lets the backend
    /// choose its default.
    pub async fn add(&self, content: &str, group: Option<&str>) -> Result<Sentence, ActionError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ActionError::EmptyContent);
        }
        let group = group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        let new = NewSentence {
            content: content.to_string(),
            group,
        };
        let created = self.api.create(&new).await?;
        info!("Added sentence #{} to group '{}'", created.id, created.group);
        Ok(created)
    }

    pub async fn delete(&self, id: SentenceId) -> Result<(), ActionError> {
        self.api.delete(id).await?;
        info!("Deleted sentence #{}", id);
        Ok(())
    }

    /// Retag every member of `from` with `to`. Renaming onto an existing
    /// group merges the two. Returns how many sentences moved.
    pub async fn rename_group(&self, from: &str, to: &str) -> Result<usize, ActionError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(ActionError::EmptyGroupName);
        }
        if to == from {
            return Err(ActionError::SameGroupName(to.to_string()));
        }
        let moved = self.regroup(from, to).await?;
        info!("Renamed group '{}' -> '{}' ({} sentences)", from, to, moved);
        Ok(moved)
    }

    /// Dissolve a group by moving its members to the default group.
    pub async fn delete_group(&self, name: &str) -> Result<usize, ActionError> {
        let default_group = self.default_group().to_string();
        if name == default_group {
            return Err(ActionError::DefaultGroupProtected(default_group));
        }
        let moved = self.regroup(name, &default_group).await?;
        info!(
            "Deleted group '{}', {} sentences moved to '{}'",
            name, moved, default_group
        );
        Ok(moved)
    }

    async fn regroup(&self, from: &str, to: &str) -> Result<usize, ActionError> {
        let ids: Vec<SentenceId> = model::members(&self.sentences, from, self.default_group())
            .map(|s| s.id)
            .collect();
        if ids.is_empty() {
            return Err(ActionError::UnknownGroup(from.to_string()));
        }

        let update = SentenceUpdate::regroup(to);
        let total = ids.len();
        let mut failed = 0;
        for id in ids {
            if let Err(e) = self.api.update(id, &update).await {
                warn!("Failed to move sentence #{} to '{}': {}", id, to, e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(ActionError::Partial { failed, total });
        }
        Ok(total)
    }

    /// Tell the backend a sentence was copied. Returns `false` when copy
    /// reporting is disabled.
    pub async fn record_copy(&self, id: SentenceId) -> Result<bool, ApiError> {
        if !self.config.clipboard.report_copies {
            return Ok(false);
        }
        self.api.record_copy(id).await?;
        debug!("Recorded copy of sentence #{}", id);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Loads once, starts the poller, then listens on:
/// 1. User commands from the TUI
/// 2. Poll ticks
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    refresh(&mut state, &ui_tx).await;
    state.poller.start();
    let _ = ui_tx.send(UiUpdate::Polling(true)).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = state.poller.tick() => {
                debug!("Poll tick");
                refresh(&mut state, &ui_tx).await;
            }
        }
    }

    state.poller.stop();
    info!("Application event loop exiting");
    Ok(())
}

/// Fetch the list and push the result (or the empty state) to the UI.
async fn refresh(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = state.load().await;
    let _ = ui_tx.send(UiUpdate::Sentences(state.sentences.clone())).await;
    let _ = ui_tx.send(UiUpdate::Backend(state.backend)).await;
    if result.is_ok() {
        if let Some(at) = state.last_sync {
            let _ = ui_tx.send(UiUpdate::Synced(at)).await;
        }
    }
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Refresh => {
            info!("Manual refresh");
            refresh(state, ui_tx).await;
        }
        UserCommand::Add { content, group } => {
            if content.trim().is_empty() {
                toast(ui_tx, Toast::error(MSG_EMPTY_CONTENT)).await;
                return;
            }
            let _ = ui_tx.send(UiUpdate::AddPending(true)).await;
            let result = state.add(&content, group.as_deref()).await;
            let _ = ui_tx.send(UiUpdate::AddPending(false)).await;
            match result {
                Ok(_) => {
                    let _ = ui_tx.send(UiUpdate::AddSucceeded).await;
                    refresh(state, ui_tx).await;
                    toast(ui_tx, Toast::success(MSG_ADDED)).await;
                }
                Err(ActionError::EmptyContent) => {
                    toast(ui_tx, Toast::error(MSG_EMPTY_CONTENT)).await;
                }
                Err(e) => {
                    warn!("Add failed: {}", e);
                    toast(ui_tx, Toast::error(MSG_ADD_FAILED)).await;
                }
            }
        }
        UserCommand::Delete { id } => match state.delete(id).await {
            Ok(()) => {
                toast(ui_tx, Toast::success(MSG_DELETED)).await;
                refresh(state, ui_tx).await;
            }
            Err(e) => {
                warn!("Delete of #{} failed: {}", id, e);
                toast(ui_tx, Toast::error(MSG_DELETE_FAILED)).await;
            }
        },
        UserCommand::RenameGroup { from, to } => {
            let result = state.rename_group(&from, &to).await;
            let attempted = !matches!(
                result,
                Err(ActionError::EmptyGroupName | ActionError::SameGroupName(_))
            );
            toast(ui_tx, group_toast(result, MSG_GROUP_RENAMED)).await;
            if attempted {
                refresh(state, ui_tx).await;
            }
        }
        UserCommand::DeleteGroup { name } => {
            let result = state.delete_group(&name).await;
            let attempted = !matches!(result, Err(ActionError::DefaultGroupProtected(_)));
            toast(ui_tx, group_toast(result, MSG_GROUP_DELETED)).await;
            if attempted {
                refresh(state, ui_tx).await;
            }
        }
        UserCommand::RecordCopy { id } => match state.record_copy(id).await {
            Ok(true) => refresh(state, ui_tx).await,
            Ok(false) => {}
            Err(e) => warn!("Failed to record copy of #{}: {}", id, e),
        },
        UserCommand::SetVisibility(visibility) => {
            debug!("Visibility changed: {:?}", visibility);
            if state.poller.on_visibility(visibility) {
                refresh(state, ui_tx).await;
            }
            let _ = ui_tx
                .send(UiUpdate::Polling(state.poller.is_running()))
                .await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Toast for the outcome of a group-wide action.
fn group_toast(result: Result<usize, ActionError>, success: &str) -> Toast {
    match result {
        Ok(_) => Toast::success(success),
        Err(ActionError::EmptyGroupName) => Toast::error("Group name cannot be empty"),
        Err(ActionError::SameGroupName(name)) => {
            Toast::error(format!("Group is already named {name}"))
        }
        Err(ActionError::DefaultGroupProtected(name)) => {
            Toast::error(format!("The default group {name} cannot be deleted"))
        }
        Err(ActionError::UnknownGroup(name)) => Toast::error(format!("Group {name} is empty")),
        Err(ActionError::Partial { failed, total }) => {
            Toast::error(format!("{failed} of {total} sentences could not be moved"))
        }
        Err(e) => {
            warn!("Group action failed: {}", e);
            Toast::error("Request failed, please retry")
        }
    }
}

async fn toast(ui_tx: &mpsc::Sender<UiUpdate>, toast: Toast) {
    let _ = ui_tx.send(UiUpdate::Toast(toast)).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
