pub mod error;

pub mod config;

pub mod content {
    pub mod fetcher;
    pub use fetcher::{DirectoryFetcher, HttpFetcher, ResourceFetcher};

    pub mod markdown;

    pub mod resolver;
    pub use resolver::{ContentPlan, ContentResolver, EditSource};

    pub mod sanitize;
    pub use sanitize::{DisplayHtml, HtmlPolicy, HtmlTrust};

    pub mod upload;
}

pub mod tasks {
    pub mod content_task;
}

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod action_dispatcher;
    pub use action_dispatcher::ActionDispatcher;

    pub mod event_loop;
    pub use event_loop::{EventLoop, TaskResult};
}

pub mod model {
    pub mod app_state;

    pub mod editor;
    pub use editor::EditorState;

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, RedrawFlag, UIOverlay, UIState};
}

pub mod view {
    pub mod html_text;

    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod add_document_overlay;
        pub use add_document_overlay::AddDocumentOverlay;
        pub mod content_pane;
        pub use content_pane::ContentPane;
        pub mod context_menu;
        pub use context_menu::ContextMenu;
        pub mod editor_overlay;
        pub use editor_overlay::EditorOverlay;
        pub mod help_overlay;
        pub use help_overlay::HelpOverlay;
        pub mod notification_overlay;
        pub use notification_overlay::NotificationOverlay;
        pub mod prompt_overlay;
        pub use prompt_overlay::{ConfirmDeleteOverlay, PromptOverlay};
        pub mod sidebar_tree;
        pub use sidebar_tree::SidebarTree;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }

    pub use components::*;
}

pub mod logging;
pub use logging::Logger;

pub use error::AppError;

pub use model::{app_state::AppState, ui_state::UIState};
