// Group tab strip: `All` followed by every derived group.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use sentencebox_core::model::{self, GroupFilter};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(tab_spans(state)));
    frame.render_widget(paragraph, area);
}

/// `(label, active)` for each tab, `All` first.
pub fn tab_labels(state: &ViewState) -> Vec<(String, bool)> {
    let mut tabs = vec![(
        format!("All {}", state.sentences.len()),
        state.filter == GroupFilter::All,
    )];
    for group in state.groups() {
        let count = model::members(&state.sentences, &group, &state.default_group).count();
        let active = state.filter.group_name() == Some(group.as_str());
        tabs.push((format!("{group} {count}"), active));
    }
    tabs
}

/// Tab spans with the active tab highlighted, e.g. "[All 3] [work 2] [默认 1]".
pub fn tab_spans(state: &ViewState) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for (label, active) in tab_labels(state) {
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
