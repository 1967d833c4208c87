//! ``src/view/components/add_document_overlay.rs``
//! ============================================================================
//! # Add-document form: name, content kind and path

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::model::ui_state::{AddDocumentForm, DraftKind, FormField};
use crate::view::theme::Palette;

pub struct AddDocumentOverlay;

impl AddDocumentOverlay {
    fn path_label(kind: DraftKind) -> &'static str {
        match kind {
            DraftKind::Link => "File path (e.g. /documents/guide.md)",
            _ => "Local file (.md or .html)",
        }
    }

    fn field_style(form: &AddDocumentForm, field: FormField, palette: Palette) -> Style {
        if form.focus == field {
            palette.highlight()
        } else {
            palette.base()
        }
    }

    pub fn lines(form: &AddDocumentForm, palette: Palette) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::styled("Name", palette.dim()),
            Line::styled(format!(" {} ", form.name), Self::field_style(form, FormField::Name, palette)),
            Line::default(),
            Line::styled("Content", palette.dim()),
            Line::from(vec![
                Span::styled("◀ ", palette.dim()),
                Span::styled(
                    form.kind.label(),
                    Self::field_style(form, FormField::Kind, palette),
                ),
                Span::styled(" ▶", palette.dim()),
            ]),
        ];

        if form.kind != DraftKind::Blank {
            lines.push(Line::default());
            lines.push(Line::styled(Self::path_label(form.kind), palette.dim()));
            lines.push(Line::styled(
                format!(" {} ", form.path),
                Self::field_style(form, FormField::Path, palette),
            ));
        }

        lines.push(Line::default());
        if form.pending_upload.is_some() {
            lines.push(Line::styled("Reading file…", palette.dim().fg(palette.info)));
        } else if let Some(error) = &form.error {
            lines.push(Line::styled(error.to_string(), palette.dim().fg(palette.error)));
        }
        lines.push(
            Line::styled("Tab next field • ←/→ change content • Enter add • Esc cancel", palette.dim())
                .centered(),
        );
        lines
    }

    pub fn render(frame: &mut Frame<'_>, form: &AddDocumentForm, palette: Palette, area: Rect) {
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(Self::lines(form, palette))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", form.title()))
                    .title_alignment(Alignment::Center)
                    .border_style(palette.border())
                    .style(palette.base()),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(dialog, area);
    }
}
