// Integration tests for the terminal front end.
//
// These drive `ViewState` the way the run loop does (key events in,
// `UiUpdate`s from the app loop, clipboard outcomes) and render complete
// frames into a `TestBackend`.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use sentencebox_core::config::Config;
use sentencebox_core::model::{GroupFilter, Sentence};
use sentencebox_core::protocol::{BackendStatus, Toast, UiUpdate, UserCommand};
use sentencebox_tui::clipboard::ClipboardError;
use sentencebox_tui::particles::ParticleField;
use sentencebox_tui::tui::input::{self, Action, InputMode};
use sentencebox_tui::tui::{
    apply_copy_outcome, apply_ui_update, render_frame, CopyOutcome, ViewState, MSG_COPIED,
    MSG_COPY_FAILED,
};

// ===========================================================================
// Test helpers
// ===========================================================================

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

fn press(state: &mut ViewState, code: KeyCode, now: Instant) -> Option<Action> {
    input::handle_key(key(code), state, now)
}

fn type_text(state: &mut ViewState, text: &str, now: Instant) {
    for c in text.chars() {
        assert!(press(state, KeyCode::Char(c), now).is_none());
    }
}

fn draw(state: &ViewState, particles: Option<&ParticleField>, now: Instant) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal
        .draw(|frame| render_frame(frame, state, particles, now))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}

fn seed() -> Vec<Sentence> {
    vec![
        Sentence::new(1, "Good morning!", "greetings"),
        Sentence::new(2, "Thanks a lot.", "greetings"),
        Sentence::new(3, "See you tomorrow.", "farewells"),
    ]
}

fn online(state: &mut ViewState, list: Vec<Sentence>, now: Instant) {
    apply_ui_update(state, UiUpdate::Sentences(list), now);
    apply_ui_update(state, UiUpdate::Backend(BackendStatus::Online), now);
    apply_ui_update(state, UiUpdate::Polling(true), now);
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn add_flow_from_keypress_to_rendered_card() {
    let now = Instant::now();
    let mut state = ViewState::from_config(&Config::default());
    online(&mut state, seed(), now);

    // Switch to the "farewells" tab and open the add dialog.
    press(&mut state, KeyCode::Tab, now);
    press(&mut state, KeyCode::Tab, now);
    assert_eq!(state.filter, GroupFilter::Named("farewells".into()));
    press(&mut state, KeyCode::Char('a'), now);
    type_text(&mut state, "Take care", now);

    let action = press(&mut state, KeyCode::Enter, now);
    assert_eq!(
        action,
        Some(Action::Command(UserCommand::Add {
            content: "Take care".into(),
            group: Some("farewells".into()),
        }))
    );

    // The app loop answers.
    apply_ui_update(&mut state, UiUpdate::AddPending(true), now);
    assert!(draw(&state, None, now).contains("Adding…"));
    apply_ui_update(&mut state, UiUpdate::AddPending(false), now);
    apply_ui_update(&mut state, UiUpdate::AddSucceeded, now);
    let mut list = seed();
    list.push(Sentence::new(4, "Take care", "farewells"));
    apply_ui_update(&mut state, UiUpdate::Sentences(list), now);
    apply_ui_update(&mut state, UiUpdate::Toast(Toast::success("Added")), now);

    assert_eq!(state.mode, InputMode::Normal);
    let screen = draw(&state, None, now);
    assert!(screen.contains("Take care"));
    assert!(screen.contains("See you tomorrow."));
    assert!(!screen.contains("Good morning!"), "other groups are filtered out");
    assert!(screen.contains("Added"));
}

#[test]
fn failed_add_keeps_dialog_and_text() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);

    press(&mut state, KeyCode::Char('a'), now);
    type_text(&mut state, "draft", now);
    press(&mut state, KeyCode::Enter, now);
    apply_ui_update(&mut state, UiUpdate::AddPending(true), now);
    apply_ui_update(&mut state, UiUpdate::AddPending(false), now);
    apply_ui_update(
        &mut state,
        UiUpdate::Toast(Toast::error("Add failed, please retry")),
        now,
    );

    match &state.mode {
        InputMode::Adding(form) => assert_eq!(form.content, "draft"),
        other => panic!("expected Adding, got {other:?}"),
    }
    let screen = draw(&state, None, now);
    assert!(screen.contains("Add failed, please retry"));
}

#[test]
fn copy_flow_reports_and_animates() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);

    press(&mut state, KeyCode::Down, now);
    let action = press(&mut state, KeyCode::Enter, now);
    let Some(Action::Copy { id, content }) = action else {
        panic!("expected Copy, got {action:?}");
    };
    assert_eq!((id, content.as_str()), (2, "Thanks a lot."));

    let report = apply_copy_outcome(
        &mut state,
        CopyOutcome {
            id,
            result: Ok("wl-copy".into()),
        },
        now,
    );
    assert_eq!(report, Some(UserCommand::RecordCopy { id: 2 }));

    let screen = draw(&state, None, now + Duration::from_millis(100));
    assert!(screen.contains(MSG_COPIED));
    assert!(screen.contains("merit +1"));

    // Everything fades on schedule.
    let later = now + Duration::from_secs(2);
    state.notifier.prune(later);
    assert!(state.notifier.is_idle());
    let screen = draw(&state, None, later);
    assert!(!screen.contains("merit +1"));
    assert!(!screen.contains(MSG_COPIED));
}

#[test]
fn copy_failure_shows_manual_copy_hint() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);

    let report = apply_copy_outcome(
        &mut state,
        CopyOutcome {
            id: 1,
            result: Err(ClipboardError::Unavailable {
                tried: "xclip, xsel".into(),
            }),
        },
        now,
    );
    assert!(report.is_none());
    assert!(draw(&state, None, now).contains(MSG_COPY_FAILED));
}

#[test]
fn backend_outage_renders_empty_state() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);
    press(&mut state, KeyCode::Tab, now);

    // A failed poll clears the list and flips the indicator.
    apply_ui_update(&mut state, UiUpdate::Sentences(vec![]), now);
    apply_ui_update(&mut state, UiUpdate::Backend(BackendStatus::Offline), now);

    assert_eq!(state.filter, GroupFilter::All);
    let screen = draw(&state, None, now);
    assert!(screen.contains("offline"));
    assert!(screen.contains("No sentences yet"));
}

#[test]
fn group_rename_and_delete_commands() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);
    press(&mut state, KeyCode::Tab, now);

    press(&mut state, KeyCode::Char('r'), now);
    for _ in 0.."greetings".len() {
        press(&mut state, KeyCode::Backspace, now);
    }
    type_text(&mut state, "hello", now);
    assert!(draw(&state, None, now).contains("Rename group greetings"));
    assert_eq!(
        press(&mut state, KeyCode::Enter, now),
        Some(Action::Command(UserCommand::RenameGroup {
            from: "greetings".into(),
            to: "hello".into(),
        }))
    );

    press(&mut state, KeyCode::Char('x'), now);
    assert!(draw(&state, None, now).contains("Delete group?"));
    assert_eq!(
        press(&mut state, KeyCode::Char('y'), now),
        Some(Action::Command(UserCommand::DeleteGroup {
            name: "greetings".into(),
        }))
    );
}

#[test]
fn particles_decorate_without_hiding_cards() {
    let now = Instant::now();
    let mut state = ViewState::default();
    online(&mut state, seed(), now);

    let mut field = ParticleField::seeded(300, 100, 30, 5);
    for _ in 0..10 {
        field.step();
    }
    let plain = draw(&state, None, now);
    let screen = draw(&state, Some(&field), now);
    assert!(screen.contains("Good morning!"));
    assert!(screen.matches('·').count() > plain.matches('·').count());
}
