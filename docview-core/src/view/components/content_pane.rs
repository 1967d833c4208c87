//! ``src/view/components/content_pane.rs``
//! ============================================================================
//! # ContentPane: the resolved content of the active selection

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::content::sanitize::HtmlTrust;
use crate::model::app_state::AppState;
use crate::view::html_text::html_to_lines;
use crate::view::theme::Palette;

pub struct ContentPane;

impl ContentPane {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, palette: Palette, area: Rect) {
        let node = app.active_node();
        let title = node.map_or_else(|| " Welcome ".to_string(), |node| format!(" {} ", node.name()));

        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(palette.title())
            .border_style(palette.border())
            .style(palette.base());
        if app.content().trust() == HtmlTrust::Unsanitized {
            block = block.title_bottom(Line::styled(" unsanitized ", palette.dim().fg(palette.warning)));
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let last_updated = node
            .and_then(|node| node.document())
            .and_then(|doc| doc.last_updated.as_deref());
        let [meta_area, body_area] = Layout::vertical([
            Constraint::Length(u16::from(last_updated.is_some()) * 2),
            Constraint::Fill(1),
        ])
        .areas(inner);

        if let Some(date) = last_updated {
            frame.render_widget(
                Paragraph::new(format!("Last updated: {date}")).style(palette.dim()),
                meta_area,
            );
        }

        if app.is_loading() {
            frame.render_widget(
                Paragraph::new("Loading content…").style(palette.dim()),
                body_area,
            );
            return;
        }

        let lines = html_to_lines(app.content().as_str(), palette);
        let body = Paragraph::new(lines)
            .style(palette.base())
            .wrap(Wrap { trim: false })
            .scroll((app.ui.content_scroll, 0));
        frame.render_widget(body, body_area);
    }
}
