// Keyboard and paste handling.
//
// Translates crossterm events into actions for the run loop: either a
// UserCommand for the app orchestrator or a clipboard copy. Everything else
// (selection, tab switching, dialog editing) mutates ViewState locally.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use sentencebox_core::app::MSG_EMPTY_CONTENT;
use sentencebox_core::model::SentenceId;
use sentencebox_core::protocol::{Toast, UserCommand};

use super::ViewState;

/// Which modal interaction, if any, owns the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Adding(AddForm),
    Renaming {
        from: String,
        input: String,
    },
    ConfirmDelete {
        id: SentenceId,
        preview: String,
    },
    ConfirmDeleteGroup {
        name: String,
    },
    ConfirmQuit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddForm {
    pub content: String,
    pub group: String,
    pub focus: AddField,
    /// This form sent an add that has not been confirmed yet.
    pub submitted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddField {
    #[default]
    Content,
    Group,
}

impl AddForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AddField::Content => &mut self.content,
            AddField::Group => &mut self.group,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AddField::Content => AddField::Group,
            AddField::Group => AddField::Content,
        };
    }
}

/// What the run loop should do in response to an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Command(UserCommand),
    /// Put this sentence on the clipboard.
    Copy { id: SentenceId, content: String },
}

/// Handle a keyboard event.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState, now: Instant) -> Option<Action> {
    // Windows reports both press and release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(Action::Command(UserCommand::Quit));
    }

    match std::mem::take(&mut state.mode) {
        InputMode::Normal => handle_normal(key_event, state),
        InputMode::Adding(form) => handle_adding(key_event, form, state, now),
        InputMode::Renaming { from, input } => handle_renaming(key_event, from, input, state),
        InputMode::ConfirmDelete { id, preview } => {
            confirm(key_event, state, InputMode::ConfirmDelete { id, preview }, UserCommand::Delete { id })
        }
        InputMode::ConfirmDeleteGroup { name } => confirm(
            key_event,
            state,
            InputMode::ConfirmDeleteGroup { name: name.clone() },
            UserCommand::DeleteGroup { name },
        ),
        InputMode::ConfirmQuit => handle_confirm_quit(key_event, state),
    }
}

/// Route pasted text into whichever text field has focus.
pub fn handle_paste(text: &str, state: &mut ViewState) {
    match &mut state.mode {
        InputMode::Adding(form) => match form.focus {
            AddField::Content => form.content.push_str(&text.replace("\r\n", "\n")),
            AddField::Group => form.group.push_str(&single_line(text)),
        },
        InputMode::Renaming { input, .. } => input.push_str(&single_line(text)),
        _ => {}
    }
}

fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

fn handle_normal(key_event: KeyEvent, state: &mut ViewState) -> Option<Action> {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.select_prev();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.select_next();
            None
        }
        KeyCode::Tab => {
            state.cycle_group(true);
            None
        }
        KeyCode::BackTab => {
            state.cycle_group(false);
            None
        }

        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
            state.selected_sentence().map(|s| Action::Copy {
                id: s.id,
                content: s.content.clone(),
            })
        }

        KeyCode::Char('a') => {
            state.mode = InputMode::Adding(AddForm {
                group: state.filter.group_name().unwrap_or_default().to_string(),
                ..AddForm::default()
            });
            None
        }
        KeyCode::Char('d') => {
            if let Some(s) = state.selected_sentence() {
                state.mode = InputMode::ConfirmDelete {
                    id: s.id,
                    preview: s.content.clone(),
                };
            }
            None
        }
        KeyCode::Char('r') => {
            if let Some(name) = state.target_group() {
                state.mode = InputMode::Renaming {
                    input: name.clone(),
                    from: name,
                };
            }
            None
        }
        KeyCode::Char('x') => {
            if let Some(name) = state.target_group() {
                state.mode = InputMode::ConfirmDeleteGroup { name };
            }
            None
        }

        KeyCode::Char('R') | KeyCode::F(5) => Some(Action::Command(UserCommand::Refresh)),

        KeyCode::Char('q') => {
            state.mode = InputMode::ConfirmQuit;
            None
        }

        _ => None,
    }
}

fn handle_adding(
    key_event: KeyEvent,
    mut form: AddForm,
    state: &mut ViewState,
    now: Instant,
) -> Option<Action> {
    match key_event.code {
        KeyCode::Esc => {
            // Leaves Normal mode in place; the form is discarded.
            return None;
        }
        KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
        KeyCode::Enter => {
            if state.add_pending {
                state.mode = InputMode::Adding(form);
                return None;
            }
            let content = form.content.trim().to_string();
            if content.is_empty() {
                state.notifier.show_toast(Toast::error(MSG_EMPTY_CONTENT), now);
                state.mode = InputMode::Adding(form);
                return None;
            }
            let group = Some(form.group.trim().to_string()).filter(|g| !g.is_empty());
            // Blocks a second Enter before the app's AddPending arrives. The
            // dialog stays open until the app confirms the add.
            state.add_pending = true;
            form.submitted = true;
            state.mode = InputMode::Adding(form);
            return Some(Action::Command(UserCommand::Add { content, group }));
        }
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            form.focused_mut().push(c);
        }
        _ => {}
    }
    state.mode = InputMode::Adding(form);
    None
}

fn handle_renaming(
    key_event: KeyEvent,
    from: String,
    mut input: String,
    state: &mut ViewState,
) -> Option<Action> {
    match key_event.code {
        KeyCode::Esc => return None,
        KeyCode::Enter => {
            return Some(Action::Command(UserCommand::RenameGroup { from, to: input }));
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            input.push(c);
        }
        _ => {}
    }
    state.mode = InputMode::Renaming { from, input };
    None
}

/// y/Enter confirms, n/Esc cancels, everything else keeps the dialog up.
fn confirm(
    key_event: KeyEvent,
    state: &mut ViewState,
    pending: InputMode,
    command: UserCommand,
) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::Command(command)),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
        _ => {
            state.mode = pending;
            None
        }
    }
}

fn handle_confirm_quit(key_event: KeyEvent, state: &mut ViewState) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(Action::Command(UserCommand::Quit))
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
        _ => {
            state.mode = InputMode::ConfirmQuit;
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
