//! ``src/view/components/sidebar_tree.rs``
//! ============================================================================
//! # SidebarTree: category/document tree in display order
//!
//! Rows come from [`AppState::visible_rows`], so collapsed categories hide
//! their subtree. The cursor row is highlighted and the active node is drawn
//! in the accent colour.

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::model::app_state::AppState;
use crate::view::theme::Palette;

pub struct SidebarTree;

impl SidebarTree {
    pub fn render(frame: &mut Frame<'_>, app: &mut AppState, palette: Palette, area: Rect) {
        let active = app.active_id().cloned();
        let items: Vec<ListItem<'static>> = app
            .visible_rows()
            .iter()
            .map(|row| {
                let node = row.node;
                let indent = "  ".repeat(row.depth);
                let marker = if node.is_category() {
                    if !row.has_children {
                        "▹ "
                    } else if app.ui.is_expanded(node.id()) {
                        "▾ "
                    } else {
                        "▸ "
                    }
                } else {
                    "  "
                };

                let mut name_style = if node.is_category() {
                    palette.base().add_modifier(Modifier::BOLD)
                } else {
                    palette.base()
                };
                if active.as_ref() == Some(node.id()) {
                    name_style = palette.active();
                }

                ListItem::new(Line::from(vec![
                    Span::raw(indent),
                    Span::styled(marker, palette.dim()),
                    Span::styled(node.name().to_string(), name_style),
                ]))
            })
            .collect();

        let empty = items.is_empty();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Documents ")
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .highlight_style(palette.highlight().add_modifier(Modifier::BOLD));

        let mut state = ListState::default()
            .with_offset(app.ui.sidebar_scroll)
            .with_selected((!empty).then_some(app.ui.cursor));
        frame.render_stateful_widget(list, area, &mut state);
        app.ui.sidebar_scroll = state.offset();
    }
}
