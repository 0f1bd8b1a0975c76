// Card list widget: one bordered card per sentence in the active group.
//
// Rebuilt from ViewState on every frame. The list scrolls just enough to
// keep the selected card in view.

use std::time::Instant;

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use sentencebox_core::model::{Sentence, SentenceId};

use crate::tui::ViewState;

/// Where a card ended up on screen, for overlays anchored to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPlacement {
    pub id: SentenceId,
    pub area: Rect,
}

/// Render the card list and return the placement of every visible card.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, now: Instant) -> Vec<CardPlacement> {
    let title = match state.filter.group_name() {
        Some(name) => format!(" {name} "),
        None => " All ".to_string(),
    };
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let cards = state.visible();
    if cards.is_empty() {
        render_empty(frame, inner);
        return Vec::new();
    }

    let heights: Vec<u16> = cards
        .iter()
        .map(|s| card_height(s, &state.default_group, inner.width))
        .collect();
    let first = first_visible(&heights, state.selected, inner.height);

    let mut placements = Vec::new();
    let mut y = inner.y;
    for (index, sentence) in cards.iter().enumerate().skip(first) {
        let remaining = inner.bottom().saturating_sub(y);
        if remaining < 3 {
            break;
        }
        let height = heights[index].min(remaining);
        let card_area = Rect::new(inner.x, y, inner.width, height);
        render_card(
            frame,
            card_area,
            sentence,
            &state.default_group,
            index == state.selected,
            state.notifier.is_flashing(sentence.id, now),
        );
        placements.push(CardPlacement {
            id: sentence.id,
            area: card_area,
        });
        y += height;
    }
    placements
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let top = area.y + area.height.saturating_sub(2) / 2;
    let text_area = Rect::new(area.x, top, area.width, 2.min(area.height));
    let lines = vec![
        Line::from(Span::styled(
            "No sentences yet",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Add your first sentence (press a)",
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    sentence: &Sentence,
    default_group: &str,
    selected: bool,
    flashing: bool,
) {
    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let body_style = if flashing {
        Style::default().bg(Color::Rgb(0x3a, 0x3a, 0x5c))
    } else {
        Style::default()
    };

    let paragraph = card_paragraph(sentence, default_group)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .style(body_style);
    frame.render_widget(paragraph, area);
}

/// Content lines plus the meta line, wrapped at word boundaries.
fn card_paragraph<'a>(sentence: &'a Sentence, default_group: &str) -> Paragraph<'a> {
    let mut lines: Vec<Line> = sentence.content.lines().map(Line::from).collect();
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        meta_label(sentence, default_group),
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
    )));
    Paragraph::new(lines).wrap(Wrap { trim: false })
}

/// The dim line under each sentence.
pub fn meta_label(sentence: &Sentence, default_group: &str) -> String {
    format!(
        "{} · copied {}×",
        sentence.group_or(default_group),
        sentence.copy_count
    )
}

/// Rows a card needs at `outer_width`: the wrapped paragraph plus two
/// borders.
pub fn card_height(sentence: &Sentence, default_group: &str, outer_width: u16) -> u16 {
    let width = outer_width.saturating_sub(2).max(1);
    let rows = card_paragraph(sentence, default_group).line_count(width);
    u16::try_from(rows + 2).unwrap_or(u16::MAX).max(3)
}

/// Index of the first card to draw so the selected one is fully visible.
pub fn first_visible(heights: &[u16], selected: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let selected = selected.min(heights.len() - 1);
    let mut used: u32 = 0;
    let mut first = selected;
    for index in (0..=selected).rev() {
        used += u32::from(heights[index]);
        if used > u32::from(available) {
            break;
        }
        first = index;
    }
    first
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn height_of(content: &str, outer_width: u16) -> u16 {
        card_height(&Sentence::new(1, content, "g"), "默认", outer_width)
    }

    #[test]
    fn card_height_counts_wrapped_lines() {
        assert_eq!(height_of("short", 40), 4);
        assert_eq!(height_of("", 40), 4);
        assert_eq!(height_of("a\nb", 40), 5);
        // 38 columns inside the borders: 50 chars wrap onto two rows.
        assert_eq!(height_of(&"x".repeat(50), 40), 5);
        // Wide characters take two columns each.
        assert_eq!(height_of(&"你".repeat(20), 40), 5);
    }

    #[test]
    fn card_height_follows_word_wrap() {
        // 29 columns of text fit two rows of 16 by width, but word wrapping
        // puts each word on its own row.
        let content = "aaaaaaaaa bbbbbbbbb ccccccccc";
        assert_eq!(height_of(content, 18), 6);

        let mut terminal = Terminal::new(TestBackend::new(20, 14)).unwrap();
        let mut state = ViewState::default();
        state.set_sentences(vec![Sentence::new(1, content, "g")]);
        let mut placements = Vec::new();
        terminal
            .draw(|frame| placements = render(frame, frame.area(), &state, Instant::now()))
            .unwrap();

        assert_eq!(placements[0].area.height, 6);
        let text = buffer_text(&terminal);
        assert!(text.contains("ccccccccc"));
        assert!(text.contains("g · copied 0×"), "meta line is not cut off");
    }

    #[test]
    fn first_visible_keeps_selection_in_view() {
        let heights = [4, 4, 4, 4, 4];
        assert_eq!(first_visible(&heights, 0, 10), 0);
        assert_eq!(first_visible(&heights, 1, 10), 0);
        assert_eq!(first_visible(&heights, 2, 10), 1);
        assert_eq!(first_visible(&heights, 4, 10), 3);
        assert_eq!(first_visible(&[], 3, 10), 0);
        // A card taller than the area still starts at itself.
        assert_eq!(first_visible(&[20, 20], 1, 10), 1);
    }

    #[test]
    fn meta_label_uses_default_for_blank_group() {
        let mut s = Sentence::new(1, "x", "");
        s.copy_count = 3;
        assert_eq!(meta_label(&s, "默认"), "默认 · copied 3×");
    }

    #[test]
    fn empty_state_message() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| {
                let placements = render(frame, frame.area(), &state, Instant::now());
                assert!(placements.is_empty());
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("No sentences yet"));
        assert!(text.contains("Add your first sentence"));
    }

    #[test]
    fn renders_cards_and_reports_placements() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut state = ViewState::default();
        state.set_sentences(vec![
            Sentence::new(1, "hello there", "work"),
            Sentence::new(2, "see you", "home"),
        ]);
        let mut placements = Vec::new();
        terminal
            .draw(|frame| placements = render(frame, frame.area(), &state, Instant::now()))
            .unwrap();

        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].id, 1);
        assert_eq!(placements[0].area.height, 4);
        assert_eq!(placements[1].area.y, placements[0].area.bottom());

        let text = buffer_text(&terminal);
        assert!(text.contains("hello there"));
        assert!(text.contains("work · copied 0×"));
        assert!(text.contains("see you"));
    }

    #[test]
    fn scrolls_to_selected_card() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut state = ViewState::default();
        state.set_sentences((1..=5).map(|i| Sentence::new(i, format!("card {i}"), "g")).collect());
        state.selected = 4;
        let mut placements = Vec::new();
        terminal
            .draw(|frame| placements = render(frame, frame.area(), &state, Instant::now()))
            .unwrap();
        assert_eq!(placements.last().map(|p| p.id), Some(5));
        assert!(!placements.iter().any(|p| p.id == 1));
    }
}
