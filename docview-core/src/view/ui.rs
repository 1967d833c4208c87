//! src/view/ui.rs
//! ============================================================
//! Frame renderer: sidebar, content pane and status bar, with at
//! most one modal overlay and a notification banner on top.

use std::time::{Duration, Instant};

use ratatui::prelude::*;
use tracing::{instrument, trace};

use crate::model::app_state::AppState;
use crate::model::ui_state::UIOverlay;
use crate::view::components::{
    add_document_overlay::AddDocumentOverlay, content_pane::ContentPane,
    context_menu::ContextMenu, editor_overlay::EditorOverlay, help_overlay::HelpOverlay,
    notification_overlay::NotificationOverlay,
    prompt_overlay::{ConfirmDeleteOverlay, PromptOverlay},
    sidebar_tree::SidebarTree, status_bar::StatusBar,
};
use crate::view::theme::Palette;

/// ---------------------------------------------------------------------------
/// Renderer struct (layout cache + stats)
/// ---------------------------------------------------------------------------
pub struct UIRenderer {
    palette: Palette,
    cache: LayoutCache,
    stats: RenderStats,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    sidebar: Rect,
    content: Rect,
    status: Rect,
    hit: u64,
    miss: u64,
}

#[derive(Default, Debug)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl UIRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            cache: LayoutCache::default(),
            stats: RenderStats::default(),
        }
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }
}

/// ---------------------------------------------------------------------------
/// public API
/// ---------------------------------------------------------------------------
impl UIRenderer {
    /// Draws a full frame. Takes the state mutably so scroll offsets can
    /// follow the cursor.
    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, app: &mut AppState) {
        let start = Instant::now();
        self.update_layout_cache(f.area());
        let palette = self.palette;

        SidebarTree::render(f, app, palette, self.cache.sidebar);
        ContentPane::render(f, app, palette, self.cache.content);
        StatusBar::render(f, app, palette, self.cache.status);
        self.draw_overlay(f, app);

        if let Some(notification) = &app.ui.notification {
            let area = NotificationOverlay::area(self.cache.screen, notification.level);
            NotificationOverlay::render(f, notification, palette, area);
        }

        let elapsed = start.elapsed();
        self.stats.total += elapsed;
        self.stats.frames += 1;
        if elapsed > Duration::from_millis(16) {
            self.stats.slow += 1;
            trace!(elapsed_ms = elapsed.as_millis() as u64, "Slow frame");
        }
    }
}

/// ---------------------------------------------------------------------------
/// overlays
/// ---------------------------------------------------------------------------
impl UIRenderer {
    fn draw_overlay(&self, f: &mut Frame<'_>, app: &mut AppState) {
        let screen = self.cache.screen;
        let palette = self.palette;

        match app.ui.overlay {
            UIOverlay::None => {}

            UIOverlay::Help => HelpOverlay::render(f, palette, centered_rect(60, 70, screen)),

            UIOverlay::ContextMenu => {
                if let Some(menu) = &app.ui.context_menu {
                    let area = ContextMenu::area(menu, self.cache.sidebar, screen);
                    ContextMenu::render(f, menu, palette, area);
                }
            }

            UIOverlay::Prompt => {
                if let Some(kind) = &app.ui.prompt {
                    let area = fixed_height_rect(60, 6, screen);
                    PromptOverlay::render(f, app, kind, palette, area);
                }
            }

            UIOverlay::ConfirmDelete => {
                if let Some(target) = &app.ui.confirm_delete {
                    let name = app
                        .forest()
                        .find_by_id(target.as_str())
                        .map_or(target.as_str(), |node| node.name());
                    ConfirmDeleteOverlay::render(f, name, palette, fixed_height_rect(60, 9, screen));
                }
            }

            UIOverlay::AddDocument => {
                if let Some(form) = &app.ui.add_document {
                    AddDocumentOverlay::render(f, form, palette, fixed_height_rect(70, 16, screen));
                }
            }

            UIOverlay::Editor => {
                if let Some(editor) = app.ui.editor.as_mut() {
                    EditorOverlay::render(f, editor, palette, centered_rect(90, 85, screen));
                }
            }
        }
    }
}

/// ---------------------------------------------------------------------------
/// util: layout / rectangles
/// ---------------------------------------------------------------------------
impl UIRenderer {
    fn update_layout_cache(&mut self, screen: Rect) {
        if self.cache.screen == screen && self.cache.hit + self.cache.miss > 0 {
            self.cache.hit += 1;
            return;
        }

        self.cache.miss += 1;
        self.cache.screen = screen;
        let [main, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(screen);
        let sidebar_width = (main.width / 3).clamp(24.min(main.width), 40);
        let [sidebar, content] =
            Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Fill(1)])
                .areas(main);
        self.cache.sidebar = sidebar;
        self.cache.content = content;
        self.cache.status = status;
    }
}

/// Rectangle of the given percentage size centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (area.width * percent_x / 100).min(area.width);
    let height = (area.height * percent_y / 100).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Like [`centered_rect`] but with a fixed number of rows.
pub fn fixed_height_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width * percent_x / 100).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// ---------------------------------------------------------------------------
/// tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content::fetcher::DirectoryFetcher;
    use doctree::{NodeId, seed};
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        AppState::new(
            Arc::new(Config::default()),
            seed::builtin_forest(),
            Arc::new(DirectoryFetcher::new("/nonexistent")),
            tx,
        )
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn cache_hit() {
        let mut r = UIRenderer::new(Palette::MOCHA);
        r.update_layout_cache(Rect::new(0, 0, 100, 40));
        r.update_layout_cache(Rect::new(0, 0, 100, 40));
        assert_eq!(r.cache.hit, 1);
        assert_eq!(r.cache.sidebar.width, 33);
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(10, 5, 80, 20);
        let r = centered_rect(50, 50, area);
        assert_eq!(r, Rect::new(30, 10, 40, 10));
        assert_eq!(fixed_height_rect(50, 100, area).height, 20);
    }

    #[test]
    fn renders_tree_and_inline_content() {
        let mut app = app();
        app.select_node(Some(NodeId::from("new_doc")));
        let mut renderer = UIRenderer::new(Palette::MOCHA);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| renderer.render(f, &mut app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("EC2 Instances"));
        assert!(text.contains("Getting Started"));
        assert!(text.contains("Inline Content"));
        assert!(text.contains("Last updated:"));
        assert_eq!(renderer.stats().frames, 1);
    }

    #[test]
    fn renders_confirm_dialog() {
        let mut app = app();
        app.ui.open_confirm_delete(NodeId::from("2"));
        let mut renderer = UIRenderer::new(Palette::MOCHA);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal.draw(|f| renderer.render(f, &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("Are you sure you want to delete"));
    }
}
