//! Multi-line document editor.
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::model::editor::EditorState;
use crate::view::theme::Palette;

pub struct EditorOverlay;

impl EditorOverlay {
    pub fn render(frame: &mut Frame<'_>, editor: &mut EditorState, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Editing: {} ", editor.document_name))
            .title_alignment(Alignment::Center)
            .title_bottom(Line::styled(" Ctrl-S save • Esc cancel ", palette.dim()).centered())
            .border_style(palette.border())
            .style(palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [gutter_area, text_area] =
            Layout::horizontal([Constraint::Length(5), Constraint::Fill(1)]).areas(inner);
        let height = usize::from(text_area.height);
        editor.scroll_to_cursor(height);

        let visible = editor.lines().iter().enumerate().skip(editor.scroll).take(height);
        let (numbers, text): (Vec<Line<'_>>, Vec<Line<'_>>) = visible
            .map(|(index, line)| {
                (
                    Line::styled(format!("{:>4} ", index + 1), palette.dim()),
                    Line::styled(line.as_str(), palette.base()),
                )
            })
            .unzip();
        frame.render_widget(Paragraph::new(numbers), gutter_area);

        // long lines scroll horizontally with the cursor
        let (row, col) = editor.cursor();
        let width = usize::from(text_area.width.max(1));
        let h_scroll = col.saturating_sub(width - 1);
        frame.render_widget(
            Paragraph::new(text).scroll((0, u16::try_from(h_scroll).unwrap_or(u16::MAX))),
            text_area,
        );

        let x = u16::try_from(col - h_scroll).unwrap_or(0);
        let y = u16::try_from(row.saturating_sub(editor.scroll)).unwrap_or(0);
        frame.set_cursor_position((text_area.x + x, text_area.y + y));
    }
}
