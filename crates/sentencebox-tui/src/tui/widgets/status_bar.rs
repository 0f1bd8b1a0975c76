// Status bar widget: backend status, sentence count, polling, last sync.

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use sentencebox_core::protocol::BackendStatus;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [backend indicator] [count] [live/paused] [last sync]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color, label) = backend_indicator(state.backend);
    let separator = Span::styled(" | ", Style::default().fg(Color::Gray));

    let mut spans = vec![
        Span::styled(format!(" {dot} "), Style::default().fg(dot_color)),
        Span::styled(label, Style::default().fg(Color::White)),
        separator.clone(),
        Span::styled(
            count_label(state.sentences.len()),
            Style::default().fg(Color::White),
        ),
        separator.clone(),
    ];

    let (polling, polling_style) = if state.polling {
        ("live", Style::default().fg(Color::Green))
    } else {
        ("paused", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    };
    spans.push(Span::styled(polling, polling_style));
    spans.push(separator);
    spans.push(Span::styled(
        sync_label(state.last_sync),
        Style::default().fg(Color::Gray),
    ));

    if state.add_pending {
        spans.push(Span::styled(
            "  adding…",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the indicator dot, its color and a label.
pub fn backend_indicator(status: BackendStatus) -> (&'static str, Color, &'static str) {
    match status {
        BackendStatus::Online => ("●", Color::Green, "online"),
        BackendStatus::Offline => ("●", Color::Red, "offline"),
    }
}

pub fn count_label(count: usize) -> String {
    match count {
        1 => "1 sentence".to_string(),
        n => format!("{n} sentences"),
    }
}

pub fn sync_label(last_sync: Option<DateTime<Local>>) -> String {
    match last_sync {
        Some(at) => format!("synced {}", at.format("%H:%M:%S")),
        None => "never synced".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
