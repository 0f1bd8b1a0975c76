// Toast overlay: a single short message near the bottom of the screen.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use sentencebox_core::protocol::{Toast, ToastKind};

/// Render `toast` centered horizontally just above the bottom of `area`.
pub fn render(frame: &mut Frame, area: Rect, toast: &Toast) {
    let Some(toast_area) = toast_rect(area, &toast.message) else {
        return;
    };
    frame.render_widget(Clear, toast_area);

    let color = match toast.kind {
        ToastKind::Success => Color::White,
        ToastKind::Error => Color::Red,
    };
    let paragraph = Paragraph::new(Line::from(toast.message.as_str()).centered())
        .style(Style::default().fg(color).bg(Color::Black))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(paragraph, toast_area);
}

/// Three rows tall, sized to the message, sitting one row above the bottom.
pub fn toast_rect(area: Rect, message: &str) -> Option<Rect> {
    if area.height < 4 || area.width < 6 {
        return None;
    }
    let text_width = u16::try_from(Line::from(message).width()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(4).min(area.width);
    let x = area.x + (area.width - width) / 2;
    let y = area.bottom() - 4;
    Some(Rect::new(x, y, width, 3))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
