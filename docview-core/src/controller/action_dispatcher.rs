//! ActionDispatcher: applies actions to the shared session state.
//!
//! The event loop produces [`Action`]s; the dispatcher locks [`AppState`],
//! runs the matching operation and turns failures into notifications so the
//! session always stays usable.

use std::sync::Arc;

use doctree::TreeError;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::controller::Action;
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::model::ui_state::{MenuItem, PromptKind, RedrawFlag, UIOverlay};

/// Shown when a node is added under a document or a vanished parent.
pub const INVALID_PARENT_MESSAGE: &str = "Cannot add to this item type or parent not found.";

const CONTENT_SCROLL_STEP: u16 = 10;

pub struct ActionDispatcher {
    app: Arc<Mutex<AppState>>,
}

impl ActionDispatcher {
    pub fn new(app: Arc<Mutex<AppState>>) -> Self {
        Self { app }
    }

    /// Applies `action`. Returns `false` if the application should terminate.
    pub async fn handle(&mut self, action: Action) -> bool {
        let mut app = self.app.lock().await;
        apply_action(&mut app, action)
    }
}

fn apply_action(app: &mut AppState, action: Action) -> bool {
    match action {
        Action::Quit => {
            info!("Quit requested");
            return false;
        }

        Action::NoOp => {}

        Action::Tick => {
            app.ui.update_notification();
        }

        Action::Resize(..) => app.ui.request_redraw(RedrawFlag::All),

        Action::TaskResult(result) => {
            if !app.apply_task_result(result) {
                debug!("Task result discarded");
            }
        }

        Action::ToggleHelp => app.ui.toggle_help(),

        Action::CloseOverlay => {
            debug!("Closing overlay {:?}", app.ui.overlay);
            app.ui.close_overlay();
        }

        Action::MoveCursorUp => app.move_cursor(-1),
        Action::MoveCursorDown => app.move_cursor(1),

        Action::SelectAtCursor => {
            let id = app.cursor_node_id();
            app.select_node(id);
        }

        Action::ExpandAtCursor => app.set_cursor_expanded(Some(true)),
        Action::CollapseAtCursor => app.set_cursor_expanded(Some(false)),
        Action::ToggleExpandAtCursor => app.set_cursor_expanded(None),

        Action::ScrollContentUp => {
            app.ui.content_scroll = app.ui.content_scroll.saturating_sub(CONTENT_SCROLL_STEP);
            app.ui.request_redraw(RedrawFlag::Content);
        }

        Action::ScrollContentDown => {
            app.ui.content_scroll = app.ui.content_scroll.saturating_add(CONTENT_SCROLL_STEP);
            app.ui.request_redraw(RedrawFlag::Content);
        }

        Action::OpenContextMenu => open_context_menu(app),

        Action::ContextMenuUp => {
            if let Some(menu) = app.ui.context_menu.as_mut() {
                menu.move_up();
                app.ui.request_redraw(RedrawFlag::Overlay);
            }
        }

        Action::ContextMenuDown => {
            if let Some(menu) = app.ui.context_menu.as_mut() {
                menu.move_down();
                app.ui.request_redraw(RedrawFlag::Overlay);
            }
        }

        Action::ContextMenuActivate => activate_menu_item(app),

        Action::AddRootCategory => {
            app.ui.open_prompt(PromptKind::AddCategory { parent: None }, "");
        }

        Action::AddRootDocument => app.open_add_document_form(None),

        Action::SubmitPrompt { kind, input } => submit_prompt(app, kind, &input),

        Action::ConfirmDelete(id) => {
            app.ui.close_overlay();
            match app.delete(&id) {
                Ok(removed) => app
                    .ui
                    .show_success(format!("Deleted {} item(s)", removed.len())),
                Err(e) => report(app, &e),
            }
        }

        Action::SubmitAddDocument => {
            if let Err(e) = app.submit_add_document() {
                // already on the form
                debug!("Add document rejected: {}", e);
                if app.ui.overlay != UIOverlay::AddDocument {
                    report_add(app, &e);
                }
            }
        }

        Action::OpenEditor => {
            if let Err(e) = app.open_editor() {
                report(app, &e);
            }
        }

        Action::SaveEditor => {
            if let Err(e) = app.save_edit() {
                report(app, &e);
            }
        }
    }

    true
}

fn open_context_menu(app: &mut AppState) {
    let Some(id) = app.cursor_node_id() else {
        return;
    };
    let Some(kind) = app.forest().find_by_id(id.as_str()).map(|node| node.kind()) else {
        return;
    };
    let row = app.ui.cursor.saturating_sub(app.ui.sidebar_scroll);
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    app.ui.open_context_menu(id, kind, row);
}

fn activate_menu_item(app: &mut AppState) {
    let Some(menu) = app.ui.context_menu.clone() else {
        app.ui.close_overlay();
        return;
    };
    let Some(item) = menu.selected_item() else {
        app.ui.close_overlay();
        return;
    };
    let target = menu.target_id;
    debug!(?item, %target, "Context menu item activated");

    match item {
        MenuItem::Rename => {
            let current = app
                .forest()
                .find_by_id(target.as_str())
                .map(|node| node.name().to_string())
                .unwrap_or_default();
            app.ui.open_prompt(PromptKind::Rename { target }, &current);
        }
        MenuItem::AddSubcategory => {
            app.ui.open_prompt(
                PromptKind::AddCategory {
                    parent: Some(target),
                },
                "",
            );
        }
        MenuItem::AddDocument => app.open_add_document_form(Some(target)),
        MenuItem::Delete => app.ui.open_confirm_delete(target),
    }
}

fn submit_prompt(app: &mut AppState, kind: PromptKind, input: &str) {
    app.ui.close_overlay();
    match kind {
        PromptKind::AddCategory { parent } => match app.add_category(parent.as_ref(), input) {
            Ok(id) => debug!(%id, "Category created from prompt"),
            Err(e) => report_add(app, &e),
        },
        PromptKind::Rename { target } => match app.rename(&target, input) {
            Ok(true) => app.ui.show_success("Renamed"),
            Ok(false) => {}
            Err(e) => report(app, &e),
        },
    }
}

/// User-facing text for a failed operation.
///
/// On the add paths a missing node can only be the parent, so it reads the
/// same as adding under a document.
pub fn user_message(error: &AppError, adding: bool) -> String {
    match error {
        AppError::Tree(TreeError::InvalidParent { .. }) => INVALID_PARENT_MESSAGE.to_string(),
        AppError::Tree(TreeError::NodeNotFound(_)) if adding => {
            INVALID_PARENT_MESSAGE.to_string()
        }
        other => other.to_string(),
    }
}

fn report(app: &mut AppState, error: &AppError) {
    notify_failure(app, error, user_message(error, false));
}

fn report_add(app: &mut AppState, error: &AppError) {
    notify_failure(app, error, user_message(error, true));
}

fn notify_failure(app: &mut AppState, error: &AppError, message: String) {
    if error.is_validation() {
        debug!("Validation failed: {}", message);
        app.ui.show_warning(message);
    } else {
        warn!("Operation failed: {}", error);
        app.ui.show_error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content::fetcher::DirectoryFetcher;
    use crate::model::ui_state::NotificationLevel;
    use doctree::{NodeId, seed};
    use tokio::sync::mpsc;

    fn dispatcher() -> (ActionDispatcher, Arc<Mutex<AppState>>) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let app = Arc::new(Mutex::new(AppState::new(
            Arc::new(Config::default()),
            seed::builtin_forest(),
            Arc::new(DirectoryFetcher::new("/nonexistent")),
            tx,
        )));
        (ActionDispatcher::new(Arc::clone(&app)), app)
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let (mut dispatcher, _app) = dispatcher();
        assert!(dispatcher.handle(Action::NoOp).await);
        assert!(!dispatcher.handle(Action::Quit).await);
    }

    #[tokio::test]
    async fn context_menu_adds_subcategory() {
        let (mut dispatcher, app) = dispatcher();
        // first row is the "EC2 Instances" category
        dispatcher.handle(Action::OpenContextMenu).await;
        dispatcher.handle(Action::ContextMenuDown).await;
        dispatcher.handle(Action::ContextMenuActivate).await;

        let kind = {
            let app = app.lock().await;
            assert_eq!(app.ui.overlay, UIOverlay::Prompt);
            app.ui.prompt.clone().unwrap()
        };
        assert_eq!(
            kind,
            PromptKind::AddCategory {
                parent: Some(NodeId::from("2"))
            }
        );

        dispatcher
            .handle(Action::SubmitPrompt {
                kind,
                input: "Networking".into(),
            })
            .await;
        let app = app.lock().await;
        assert_eq!(app.ui.overlay, UIOverlay::None);
        let children: Vec<_> = app
            .forest()
            .sorted_children("2")
            .iter()
            .map(|node| node.name().to_string())
            .collect();
        assert_eq!(children, ["Getting Started", "Networking", "Overview"]);
    }

    #[tokio::test]
    async fn adding_under_document_reports_invalid_parent() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher
            .handle(Action::SubmitPrompt {
                kind: PromptKind::AddCategory {
                    parent: Some(NodeId::from("1")),
                },
                input: "Nested".into(),
            })
            .await;

        let app = app.lock().await;
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.message, INVALID_PARENT_MESSAGE);
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(app.forest().len(), 6);
    }

    #[tokio::test]
    async fn missing_parent_reads_as_invalid_parent() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher
            .handle(Action::SubmitPrompt {
                kind: PromptKind::AddCategory {
                    parent: Some(NodeId::from("missing")),
                },
                input: "Nested".into(),
            })
            .await;

        let app = app.lock().await;
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.message, INVALID_PARENT_MESSAGE);
    }

    #[tokio::test]
    async fn renaming_vanished_node_names_the_node() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher
            .handle(Action::SubmitPrompt {
                kind: PromptKind::Rename {
                    target: NodeId::from("missing"),
                },
                input: "Renamed".into(),
            })
            .await;

        let app = app.lock().await;
        let notification = app.ui.notification.as_ref().unwrap();
        assert_ne!(notification.message, INVALID_PARENT_MESSAGE);
        assert!(notification.message.contains("missing"));
        assert_eq!(notification.level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn empty_category_name_is_a_warning() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher.handle(Action::AddRootCategory).await;
        dispatcher
            .handle(Action::SubmitPrompt {
                kind: PromptKind::AddCategory { parent: None },
                input: "  ".into(),
            })
            .await;

        let app = app.lock().await;
        let notification = app.ui.notification.as_ref().unwrap();
        assert_eq!(notification.message, "Category name is required.");
        assert_eq!(notification.level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn confirm_delete_removes_subtree() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher
            .handle(Action::ConfirmDelete(NodeId::from("2")))
            .await;

        let app = app.lock().await;
        assert_eq!(app.forest().len(), 3);
        assert!(app.forest().find_by_id("2.1").is_none());
    }

    #[tokio::test]
    async fn rename_prompt_is_prefilled() {
        let (mut dispatcher, app) = dispatcher();
        dispatcher.handle(Action::OpenContextMenu).await;
        dispatcher.handle(Action::ContextMenuActivate).await;

        let app = app.lock().await;
        assert_eq!(app.ui.input, "EC2 Instances");
        assert_eq!(
            app.ui.prompt,
            Some(PromptKind::Rename {
                target: NodeId::from("2")
            })
        );
    }
}
