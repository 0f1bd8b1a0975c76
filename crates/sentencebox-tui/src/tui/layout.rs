// Screen layout.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Group Tabs (1 row)                                |
// +--------------------------------------------------+
// | Card List (fill)                                  |
// |                                                   |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Backend status, sentence count, polling state, last sync.
    pub status_bar: Rect,
    pub group_tabs: Rect,
    pub card_list: Rect,
    /// Keyboard shortcut hints for the current mode.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // group tabs
            Constraint::Min(3),    // card list
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        group_tabs: vertical[1],
        card_list: vertical[2],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("group_tabs", layout.group_tabs),
            ("card_list", layout.card_list),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in &rects {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_bars_are_single_rows() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.group_tabs.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_card_list_takes_the_rest() {
        let layout = build_layout(test_area());
        assert_eq!(layout.card_list.height, 27);
        assert_eq!(layout.card_list.y, 2);
        assert_eq!(layout.help_bar.y, 29);
    }

    #[test]
    fn layout_small_terminal_still_valid() {
        let area = Rect::new(0, 0, 30, 6);
        let layout = build_layout(area);
        for rect in [layout.status_bar, layout.group_tabs, layout.card_list, layout.help_bar] {
            assert!(rect.width > 0 && rect.height > 0, "zero area: {:?}", rect);
            assert!(rect.y + rect.height <= area.height);
        }
    }
}
