// Floating "merit +1" labels that rise from a copied card and fade out.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::notify::Notifier;

use super::card_list::CardPlacement;

/// Rows a label climbs over its lifetime.
const RISE_ROWS: f32 = 3.0;

/// Draw every live merit label above its card, clipped to `bounds`.
pub fn render(
    frame: &mut Frame,
    bounds: Rect,
    placements: &[CardPlacement],
    notifier: &Notifier,
    now: Instant,
) {
    let text = notifier.merit_text();
    let width = u16::try_from(Line::from(text).width()).unwrap_or(u16::MAX);

    for (id, progress) in notifier.merits(now) {
        // The card may have scrolled out of view or been deleted.
        let Some(card) = placements.iter().find(|p| p.id == id) else {
            continue;
        };
        if let Some(area) = label_area(card.area, bounds, width, progress) {
            let paragraph = Paragraph::new(text).style(fade_style(progress));
            frame.render_widget(paragraph, area);
        }
    }
}

/// Where the label sits at `progress`: starting on the card's top border,
/// right-aligned, climbing `RISE_ROWS` rows.
pub fn label_area(card: Rect, bounds: Rect, width: u16, progress: f32) -> Option<Rect> {
    let rise = (progress.clamp(0.0, 1.0) * RISE_ROWS) as u16;
    let y = card.y.checked_sub(rise)?;
    if y < bounds.y || y >= bounds.bottom() {
        return None;
    }
    let width = width.min(card.width.saturating_sub(2));
    if width == 0 {
        return None;
    }
    let x = card.right().saturating_sub(width + 2);
    Some(Rect::new(x, y, width, 1))
}

pub fn fade_style(progress: f32) -> Style {
    if progress < 0.5 {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if progress < 0.8 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rises_with_progress() {
        let bounds = Rect::new(0, 0, 60, 30);
        let card = Rect::new(0, 10, 60, 4);
        let start = label_area(card, bounds, 8, 0.0).unwrap();
        let end = label_area(card, bounds, 8, 0.99).unwrap();
        assert_eq!(start.y, 10);
        assert_eq!(end.y, 8);
        assert_eq!(start.x, 50);
        assert_eq!(start.width, 8);
    }

    #[test]
    fn label_clipped_at_top_of_list() {
        let bounds = Rect::new(0, 3, 60, 20);
        let card = Rect::new(0, 3, 60, 4);
        assert!(label_area(card, bounds, 8, 0.0).is_some());
        assert!(label_area(card, bounds, 8, 0.6).is_none());
    }

    #[test]
    fn style_fades() {
        assert!(fade_style(0.1).add_modifier.contains(Modifier::BOLD));
        assert_eq!(fade_style(0.9).fg, Some(Color::DarkGray));
    }

    #[test]
    fn render_draws_text_for_live_merit() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut notifier = Notifier::default();
        let now = Instant::now();
        notifier.copied(1, now);
        let placements = [CardPlacement {
            id: 1,
            area: Rect::new(0, 5, 40, 4),
        }];
        terminal
            .draw(|frame| render(frame, frame.area(), &placements, &notifier, now))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("merit +1"));
    }
}
