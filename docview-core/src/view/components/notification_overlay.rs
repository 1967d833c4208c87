//! src/view/components/notification_overlay.rs
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{instrument, trace};

use crate::model::ui_state::{Notification, NotificationLevel};
use crate::view::theme::Palette;

pub struct NotificationOverlay;

impl NotificationOverlay {
    /// Banner rectangle near the top of the screen; errors get more room.
    pub fn area(screen: Rect, level: NotificationLevel) -> Rect {
        let height = if level == NotificationLevel::Error { 6 } else { 5 };
        let width = (screen.width * 60) / 100;
        Rect {
            x: screen.x + (screen.width - width) / 2,
            y: screen.y + 1,
            width,
            height: height.min(screen.height),
        }
    }

    #[instrument(
        level = "trace",
        skip_all,
        fields(level = ?notification.level, message_len = notification.message.len())
    )]
    pub fn render(frame: &mut Frame<'_>, notification: &Notification, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);

        let (color, title, icon) = match notification.level {
            NotificationLevel::Info => (palette.info, "Info", "ℹ"),
            NotificationLevel::Warning => (palette.warning, "Warning", "⚠"),
            NotificationLevel::Error => (palette.error, "Error", "✕"),
            NotificationLevel::Success => (palette.success, "Success", "✓"),
        };
        let border_style = Style::default().fg(color);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {icon} {title} "))
            .title_style(border_style.bold())
            .border_style(border_style)
            .style(Style::default().bg(palette.background));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(inner_area);

        let message = Paragraph::new(notification.message.as_str())
            .style(Style::default().fg(palette.foreground))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(message, layout[0]);

        let dismiss_text = if notification.auto_dismiss_ms.is_some() {
            "Auto-dismissing... Esc to dismiss"
        } else {
            "Esc to dismiss"
        };
        trace!(dismiss_text, "Notification footer");

        let dismiss = Paragraph::new(dismiss_text)
            .style(
                Style::default()
                    .fg(palette.comment)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Right);
        frame.render_widget(dismiss, layout[1]);
    }
}
