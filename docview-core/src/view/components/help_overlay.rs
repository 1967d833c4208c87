//! Key binding reference.
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::theme::Palette;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("↑ / k, ↓ / j", "Move cursor"),
            ("Enter", "Open item"),
            ("→ / l, ← / h", "Expand / collapse category"),
            ("Space", "Toggle category"),
            ("PgUp / PgDn", "Scroll content"),
        ],
    ),
    (
        "Editing",
        &[
            ("m", "Item menu (rename, add, delete)"),
            ("a", "Add top-level category"),
            ("n", "Add top-level document"),
            ("e", "Edit selected document"),
            ("Ctrl-S", "Save in editor"),
        ],
    ),
    (
        "General",
        &[
            ("?", "Toggle this help"),
            ("Esc", "Dismiss notification / close dialog"),
            ("q, Ctrl-C", "Quit"),
        ],
    ),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn lines(palette: Palette) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (title, bindings) in SECTIONS {
            lines.push(Line::styled(*title, palette.title()));
            for (keys, action) in *bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<16}"), palette.active()),
                    Span::styled(*action, palette.base()),
                ]));
            }
            lines.push(Line::default());
        }
        lines.pop();
        lines
    }

    pub fn render(frame: &mut Frame<'_>, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let help = Paragraph::new(Self::lines(palette))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_alignment(Alignment::Center)
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(help, area);
    }
}
