//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Every user input and internal event the viewer responds to. The event loop
//! maps raw terminal events to these; the dispatcher applies them to state.

use doctree::NodeId;

use crate::controller::event_loop::TaskResult;
use crate::model::ui_state::PromptKind;

#[derive(Debug, Clone)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Periodic tick: notification expiry and redraw.
    Tick,
    /// Terminal resized.
    Resize(u16, u16),
    /// Event fully handled by the event loop.
    NoOp,
    /// Result from a background task.
    TaskResult(TaskResult),

    ToggleHelp,
    CloseOverlay,

    // Sidebar navigation
    MoveCursorUp,
    MoveCursorDown,
    /// Make the node under the cursor the active selection.
    SelectAtCursor,
    ExpandAtCursor,
    CollapseAtCursor,
    ToggleExpandAtCursor,

    ScrollContentUp,
    ScrollContentDown,

    // Context menu
    OpenContextMenu,
    ContextMenuUp,
    ContextMenuDown,
    ContextMenuActivate,

    /// Ask for the name of a new top-level category.
    AddRootCategory,
    /// Open the add-document form without a parent.
    AddRootDocument,
    SubmitPrompt {
        kind: PromptKind,
        input: String,
    },
    ConfirmDelete(NodeId),
    SubmitAddDocument,

    OpenEditor,
    SaveEditor,
}
