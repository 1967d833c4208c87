//! ``src/view/components/context_menu.rs``
//! ============================================================================
//! # ContextMenu: per-item actions anchored next to the sidebar row

use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use crate::model::ui_state::ContextMenuState;
use crate::view::theme::Palette;

pub struct ContextMenu;

impl ContextMenu {
    /// Places the menu just below the anchored row, kept inside `screen`.
    pub fn area(menu: &ContextMenuState, sidebar: Rect, screen: Rect) -> Rect {
        let width = 22.min(screen.width);
        let height = (menu.items().len() as u16 + 2).min(screen.height);
        let x = (sidebar.x + 4).min(screen.right().saturating_sub(width));
        let y = (sidebar.y + 2 + menu.anchor_row).min(screen.bottom().saturating_sub(height));
        Rect::new(x, y, width, height)
    }

    pub fn render(frame: &mut Frame<'_>, menu: &ContextMenuState, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let items: Vec<ListItem<'_>> = menu
            .items()
            .iter()
            .map(|item| ListItem::new(item.label()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .highlight_style(palette.highlight())
            .highlight_symbol("› ");
        let mut state = ListState::default().with_selected(Some(menu.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
