// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the sentence list plus purely
// local state (selection, active group, dialogs, animations). The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange, Event,
    EventStream,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sentencebox_core::config::Config;
use sentencebox_core::model::{self, GroupFilter, Sentence, SentenceId};
use sentencebox_core::protocol::{BackendStatus, Toast, UiUpdate, UserCommand, Visibility};

use crate::clipboard::{Clipboard, ClipboardError};
use crate::notify::Notifier;
use crate::particles::ParticleField;

use input::{Action, InputMode};
use layout::build_layout;
use widgets::{card_list, confirm, dialog, group_tabs, merit, status_bar, toast};

pub const MSG_COPIED: &str = "Copied!";
pub const MSG_COPY_FAILED: &str = "Copy failed, please copy manually";

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    /// Latest list from the backend, in server order.
    pub sentences: Vec<Sentence>,
    pub default_group: String,
    /// Active group tab.
    pub filter: GroupFilter,
    /// Index into `visible()`.
    pub selected: usize,
    pub backend: BackendStatus,
    pub polling: bool,
    pub last_sync: Option<DateTime<Local>>,
    /// An add request is in flight.
    pub add_pending: bool,
    pub mode: InputMode,
    pub notifier: Notifier,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ViewState {
    pub fn from_config(config: &Config) -> Self {
        ViewState {
            sentences: Vec::new(),
            default_group: config.groups.default_group.clone(),
            filter: GroupFilter::All,
            selected: 0,
            backend: BackendStatus::Offline,
            polling: false,
            last_sync: None,
            add_pending: false,
            mode: InputMode::Normal,
            notifier: Notifier::from_config(&config.ui),
        }
    }

    pub fn groups(&self) -> Vec<String> {
        model::groups(&self.sentences, &self.default_group)
    }

    /// Sentences shown under the active tab.
    pub fn visible(&self) -> Vec<&Sentence> {
        model::filtered(&self.sentences, &self.filter, &self.default_group)
    }

    pub fn selected_sentence(&self) -> Option<&Sentence> {
        self.visible().get(self.selected).copied()
    }

    /// The group a rename/delete-group key applies to: the active tab, or
    /// the selected card's group under `All`.
    pub fn target_group(&self) -> Option<String> {
        match self.filter.group_name() {
            Some(name) => Some(name.to_string()),
            None => self
                .selected_sentence()
                .map(|s| s.group_or(&self.default_group).to_string()),
        }
    }

    /// Replace the list, keeping the selection on the same sentence when it
    /// survives and falling back to `All` when the active group vanished.
    pub fn set_sentences(&mut self, sentences: Vec<Sentence>) {
        let selected_id = self.selected_sentence().map(|s| s.id);
        self.sentences = sentences;

        let group_gone = self.filter.group_name().is_some_and(|name| {
            model::members(&self.sentences, name, &self.default_group)
                .next()
                .is_none()
        });
        if group_gone {
            debug!("Group {:?} is gone, showing all", self.filter);
            self.filter = GroupFilter::All;
        }

        let (position, len) = {
            let visible = self.visible();
            let position = selected_id.and_then(|id| visible.iter().position(|s| s.id == id));
            (position, visible.len())
        };
        self.selected = match position {
            Some(index) => index,
            None => self.selected.min(len.saturating_sub(1)),
        };
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move to the next (or previous) tab, wrapping around through `All`.
    pub fn cycle_group(&mut self, forward: bool) {
        let mut tabs = vec![GroupFilter::All];
        tabs.extend(self.groups().into_iter().map(GroupFilter::Named));
        let current = tabs.iter().position(|t| *t == self.filter).unwrap_or(0);
        let next = if forward {
            (current + 1) % tabs.len()
        } else {
            (current + tabs.len() - 1) % tabs.len()
        };
        self.filter = tabs.swap_remove(next);
        self.selected = 0;
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate, now: Instant) {
    match update {
        UiUpdate::Sentences(list) => state.set_sentences(list),
        UiUpdate::Backend(status) => state.backend = status,
        UiUpdate::Synced(at) => state.last_sync = Some(at),
        UiUpdate::Toast(toast) => state.notifier.show_toast(toast, now),
        UiUpdate::AddPending(pending) => state.add_pending = pending,
        UiUpdate::AddSucceeded => {
            state.add_pending = false;
            // A dialog opened after the submit keeps its text.
            if matches!(state.mode, InputMode::Adding(ref form) if form.submitted) {
                state.mode = InputMode::Normal;
            }
        }
        UiUpdate::Polling(running) => state.polling = running,
    }
}

/// Result of a background clipboard copy.
#[derive(Debug)]
pub struct CopyOutcome {
    pub id: SentenceId,
    pub result: Result<String, ClipboardError>,
}

/// Show copy feedback. Returns the command reporting the copy to the
/// backend when the copy worked.
pub fn apply_copy_outcome(state: &mut ViewState, outcome: CopyOutcome, now: Instant) -> Option<UserCommand> {
    match outcome.result {
        Ok(program) => {
            debug!("Copied sentence #{} via {}", outcome.id, program);
            state.notifier.copied(outcome.id, now);
            state.notifier.show_toast(Toast::success(MSG_COPIED), now);
            Some(UserCommand::RecordCopy { id: outcome.id })
        }
        Err(e) => {
            warn!("Copy of sentence #{} failed: {}", outcome.id, e);
            state.notifier.show_toast(Toast::error(MSG_COPY_FAILED), now);
            None
        }
    }
}

/// Map terminal focus to UI visibility.
pub fn focus_visibility(event: &Event) -> Option<Visibility> {
    match event {
        Event::FocusGained => Some(Visibility::Visible),
        Event::FocusLost => Some(Visibility::Hidden),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: base widgets, particles in the blank cells,
/// then overlays.
pub fn render_frame(frame: &mut Frame, state: &ViewState, particles: Option<&ParticleField>, now: Instant) {
    let area = frame.area();
    let layout = build_layout(area);

    status_bar::render(frame, layout.status_bar, state);
    group_tabs::render(frame, layout.group_tabs, state);
    let placements = card_list::render(frame, layout.card_list, state, now);
    render_help_bar(frame, layout.help_bar, &state.mode);

    if let Some(field) = particles {
        field.render(area, frame.buffer_mut());
    }

    merit::render(frame, layout.card_list, &placements, &state.notifier, now);
    render_dialog(frame, area, state);

    if let Some(current) = state.notifier.current_toast(now) {
        toast::render(frame, area, current);
    }
}

fn render_dialog(frame: &mut Frame, area: Rect, state: &ViewState) {
    match &state.mode {
        InputMode::Normal => {}
        InputMode::Adding(form) => {
            dialog::render_add(frame, area, form, state.add_pending, &state.default_group)
        }
        InputMode::Renaming { from, input } => dialog::render_rename(frame, area, from, input),
        InputMode::ConfirmDelete { preview, .. } => confirm::render(
            frame,
            area,
            "Delete?",
            &format!("Delete \"{}\"?", confirm::preview(preview)),
        ),
        InputMode::ConfirmDeleteGroup { name } => confirm::render(
            frame,
            area,
            "Delete group?",
            &format!("Move all of {name} to {}?", state.default_group),
        ),
        InputMode::ConfirmQuit => confirm::render(frame, area, "Quit?", "Really quit?"),
    }
}

pub fn help_text(mode: &InputMode) -> &'static str {
    match mode {
        InputMode::Normal => {
            " ↑↓:Select | Enter:Copy | Tab:Group | a:Add | d:Delete | r:Rename group | x:Delete group | R:Refresh | q:Quit"
        }
        InputMode::Adding(_) => " Enter:Save | Tab:Switch field | Esc:Cancel",
        InputMode::Renaming { .. } => " Enter:Rename | Esc:Cancel",
        InputMode::ConfirmDelete { .. }
        | InputMode::ConfirmDeleteGroup { .. }
        | InputMode::ConfirmQuit => " y:Confirm | n:Cancel",
    }
}

fn render_help_bar(frame: &mut Frame, area: Rect, mode: &InputMode) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(mode),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen, focus and
///    bracketed-paste reporting).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, terminal events, clipboard
///    results, render ticks.
/// 4. Restores the terminal on exit, including on error.
pub async fn run(
    ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    config: Config,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    enable_reporting(&mut stdout(), ratatui::restore)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(stdout(), DisableFocusChange, DisableBracketedPaste);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = event_loop(&mut terminal, ui_rx, cmd_tx, &config).await;

    let _ = execute!(stdout(), DisableFocusChange, DisableBracketedPaste);
    ratatui::restore();
    result
}

/// Turn on focus and bracketed-paste reporting. On failure `restore` runs
/// before the error is returned, since no panic hook is installed yet.
fn enable_reporting<W: Write>(out: &mut W, restore: impl FnOnce()) -> std::io::Result<()> {
    let result = execute!(out, EnableFocusChange, EnableBracketedPaste);
    if result.is_err() {
        restore();
    }
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut view_state = ViewState::from_config(config);
    let clipboard = Clipboard::from_config(&config.clipboard);
    let mut particles = config
        .ui
        .particles
        .enabled
        .then(|| ParticleField::new(config.ui.particles.count, 0, 0));

    let (copy_tx, mut copy_rx) = mpsc::channel::<CopyOutcome>(16);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(FRAME_INTERVAL);
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("TUI started");

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update, Instant::now()),
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Terminal input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let action = input::handle_key(key_event, &mut view_state, Instant::now());
                        match action {
                            Some(Action::Command(UserCommand::Quit)) => {
                                let _ = cmd_tx.send(UserCommand::Quit).await;
                                break;
                            }
                            Some(Action::Command(cmd)) => {
                                let _ = cmd_tx.send(cmd).await;
                            }
                            Some(Action::Copy { id, content }) => {
                                let clipboard = clipboard.clone();
                                let copy_tx = copy_tx.clone();
                                tokio::spawn(async move {
                                    let result = clipboard.copy(&content).await;
                                    let _ = copy_tx.send(CopyOutcome { id, result }).await;
                                });
                            }
                            None => {}
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        input::handle_paste(&text, &mut view_state);
                    }
                    Some(Ok(event)) => {
                        if let Some(visibility) = focus_visibility(&event) {
                            let _ = cmd_tx.send(UserCommand::SetVisibility(visibility)).await;
                        }
                        // Resize is picked up on the next draw.
                    }
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            // Clipboard results
            Some(outcome) = copy_rx.recv() => {
                if let Some(cmd) = apply_copy_outcome(&mut view_state, outcome, Instant::now()) {
                    let _ = cmd_tx.send(cmd).await;
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                let now = Instant::now();
                view_state.notifier.prune(now);
                terminal.draw(|frame| {
                    let area = frame.area();
                    if let Some(field) = particles.as_mut() {
                        field.resize(area.width, area.height);
                        field.step();
                    }
                    render_frame(frame, &view_state, particles.as_ref(), now);
                })?;
            }
        }
    }

    info!("TUI exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
