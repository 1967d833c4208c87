//! ``src/view/components/prompt_overlay.rs``
//! ============================================================================
//! # Single-line prompt and delete confirmation dialogs

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::model::app_state::AppState;
use crate::model::ui_state::PromptKind;
use crate::view::theme::Palette;

pub const DELETE_CONFIRM_MESSAGE: &str =
    "Are you sure you want to delete this item and all its children?";

pub struct PromptOverlay;

impl PromptOverlay {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, kind: &PromptKind, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Input ")
            .title_alignment(Alignment::Center)
            .border_style(palette.border())
            .style(palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [title_area, input_area, _, help_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(kind.title()).style(palette.title()), title_area);
        frame.render_widget(
            Paragraph::new(format!("> {}", app.ui.input)).style(palette.base()),
            input_area,
        );
        frame.render_widget(
            Paragraph::new("Enter to confirm • Esc to cancel")
                .style(palette.dim())
                .alignment(Alignment::Center),
            help_area,
        );

        let cursor = app.ui.input[..app.ui.input_cursor.min(app.ui.input.len())]
            .chars()
            .count();
        let x = input_area.x + 2 + u16::try_from(cursor).unwrap_or(u16::MAX);
        frame.set_cursor_position((x.min(input_area.right().saturating_sub(1)), input_area.y));
    }
}

pub struct ConfirmDeleteOverlay;

impl ConfirmDeleteOverlay {
    pub fn render(frame: &mut Frame<'_>, target_name: &str, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let text = vec![
            Line::styled(DELETE_CONFIRM_MESSAGE, palette.base()),
            Line::default(),
            Line::from(vec![
                Span::styled("Item: ", palette.dim()),
                Span::styled(target_name.to_string(), palette.active()),
            ]),
            Line::default(),
            Line::styled("y / Enter delete • n / Esc cancel", palette.dim()).centered(),
        ];
        let dialog = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Delete ")
                    .title_alignment(Alignment::Center)
                    .border_style(palette.dim().fg(palette.error))
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(dialog, area);
    }
}
