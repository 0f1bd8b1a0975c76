// Text-entry dialogs: add sentence and rename group.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::input::{AddField, AddForm};

use super::confirm::centered_rect;

const DIALOG_WIDTH: u16 = 60;
const ADD_HEIGHT: u16 = 11;
const RENAME_HEIGHT: u16 = 6;

const CURSOR: &str = "▏";

/// Render the add dialog. `pending` dims the form while the request is in
/// flight.
pub fn render_add(frame: &mut Frame, area: Rect, form: &AddForm, pending: bool, default_group: &str) {
    let dialog_area = centered_rect(DIALOG_WIDTH, ADD_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let title = if pending { " Adding… " } else { " Add sentence " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let content_focused = form.focus == AddField::Content;
    let mut lines = vec![field_label("Content", content_focused)];
    let content_lines: Vec<&str> = if form.content.is_empty() {
        vec![""]
    } else {
        form.content.split('\n').collect()
    };
    let last = content_lines.len() - 1;
    for (i, line) in content_lines.into_iter().enumerate() {
        lines.push(field_line(line, content_focused && i == last, None));
    }
    lines.push(Line::from(""));
    lines.push(field_label("Group", !content_focused));
    lines.push(field_line(
        &form.group,
        !content_focused,
        Some(default_group),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Enter: save  Tab: switch field  Esc: cancel",
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
    )));

    let mut style = Style::default().bg(Color::Black);
    if pending {
        style = style.add_modifier(Modifier::DIM);
    }
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(style)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, dialog_area);
}

/// Render the rename-group dialog.
pub fn render_rename(frame: &mut Frame, area: Rect, from: &str, input: &str) {
    let dialog_area = centered_rect(DIALOG_WIDTH, RENAME_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" Rename group {from} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let lines = vec![
        field_label("New name", true),
        field_line(input, true, None),
        Line::from(""),
        Line::from(Span::styled(
            " Enter: rename  Esc: cancel",
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

fn field_label(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(format!(" {label}"), style))
}

/// One line of field text, with a cursor when focused and a dim placeholder
/// when empty.
fn field_line<'a>(text: &'a str, focused: bool, placeholder: Option<&'a str>) -> Line<'a> {
    let mut spans = vec![Span::raw("  ")];
    if text.is_empty() {
        if let Some(hint) = placeholder {
            spans.push(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ));
        }
    } else {
        spans.push(Span::raw(text));
    }
    if focused {
        spans.push(Span::styled(CURSOR, Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
