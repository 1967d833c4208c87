//! src/view/components/status_bar.rs
//!
//! One-line footer: breadcrumb of the active node, the document source and
//! key hints.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::app_state::AppState;
use crate::view::theme::Palette;

pub struct StatusBar;

impl StatusBar {
    /// Path from the top level down to the active node, `/`-separated.
    pub fn breadcrumb(app: &AppState) -> String {
        let Some(active) = app.active_id() else {
            return "No selection".to_string();
        };
        let forest = app.forest();
        let mut names = Vec::new();
        let mut current = forest.find_by_id(active.as_str());
        while let Some(node) = current {
            names.push(node.name());
            current = forest.parent_of(node.id().as_str());
        }
        names.reverse();
        names.join(" / ")
    }

    pub fn render(frame: &mut Frame<'_>, app: &AppState, palette: Palette, area: Rect) {
        let left = Line::from(vec![
            Span::styled(" ", palette.base()),
            Span::styled(Self::breadcrumb(app), palette.active()),
            Span::styled(format!("  │ {} items", app.forest().len()), palette.dim()),
        ]);
        let right = Line::from(vec![
            Span::styled(app.source_description(), palette.dim()),
            Span::styled("  ? help  q quit ", palette.dim()),
        ])
        .right_aligned();

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);
        frame.render_widget(Paragraph::new(left).style(palette.highlight()), left_area);
        frame.render_widget(Paragraph::new(right).style(palette.highlight()), right_area);
    }
}
