//! Transient UI state: overlays, prompts, forms, notifications and the sidebar view.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use compact_str::CompactString;
use doctree::{NodeId, NodeKind};
use smallvec::SmallVec;

use crate::model::editor::EditorState;

/// Atomic redraw flags for lock-free UI updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Sidebar = 1,
    Content = 2,
    StatusBar = 4,
    Overlay = 8,
    Notification = 16,
    All = 31,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// At most one overlay is open at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UIOverlay {
    #[default]
    None = 0,
    Help = 1,
    ContextMenu = 2,
    Prompt = 3,
    ConfirmDelete = 4,
    AddDocument = 5,
    Editor = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss_ms: Option<u32>,
}

/// What a submitted single-line prompt does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddCategory { parent: Option<NodeId> },
    Rename { target: NodeId },
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::AddCategory { .. } => "Enter name for new category:",
            PromptKind::Rename { .. } => "Enter new name:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Rename,
    AddSubcategory,
    AddDocument,
    Delete,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Rename => "Rename",
            MenuItem::AddSubcategory => "Add Subcategory",
            MenuItem::AddDocument => "Add Document",
            MenuItem::Delete => "Delete",
        }
    }
}

/// Rebuilt on every open, discarded on close or after an item runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenuState {
    pub target_id: NodeId,
    pub target_kind: NodeKind,
    /// Sidebar row the menu is anchored to.
    pub anchor_row: u16,
    pub selected: usize,
}

impl ContextMenuState {
    pub fn items(&self) -> SmallVec<[MenuItem; 4]> {
        let mut items = SmallVec::new();
        items.push(MenuItem::Rename);
        if self.target_kind == NodeKind::Category {
            items.push(MenuItem::AddSubcategory);
            items.push(MenuItem::AddDocument);
        }
        items.push(MenuItem::Delete);
        items
    }

    pub fn selected_item(&self) -> Option<MenuItem> {
        self.items().get(self.selected).copied()
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let last = self.items().len().saturating_sub(1);
        self.selected = (self.selected + 1).min(last);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DraftKind {
    #[default]
    Blank,
    Link,
    Upload,
}

impl DraftKind {
    pub fn label(self) -> &'static str {
        match self {
            DraftKind::Blank => "Blank document",
            DraftKind::Link => "Link to file path",
            DraftKind::Upload => "Upload local file",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DraftKind::Blank => DraftKind::Link,
            DraftKind::Link => DraftKind::Upload,
            DraftKind::Upload => DraftKind::Blank,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Name,
    Kind,
    Path,
}

/// Add-document dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddDocumentForm {
    pub parent: Option<NodeId>,
    pub parent_name: CompactString,
    pub name: String,
    pub kind: DraftKind,
    /// Link target or local file, depending on `kind`.
    pub path: String,
    pub focus: FormField,
    pub error: Option<CompactString>,
    /// Set while an upload is being read; the form is frozen meanwhile.
    pub pending_upload: Option<u64>,
}

impl AddDocumentForm {
    pub fn new(parent: Option<NodeId>, parent_name: impl Into<CompactString>) -> Self {
        Self {
            parent,
            parent_name: parent_name.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> String {
        if self.parent_name.is_empty() {
            "Add New Document".to_string()
        } else {
            format!("Add New Document to '{}'", self.parent_name)
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match (self.focus, self.kind) {
            (FormField::Name, _) => FormField::Kind,
            (FormField::Kind, DraftKind::Blank) => FormField::Name,
            (FormField::Kind, _) => FormField::Path,
            (FormField::Path, _) => FormField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match (self.focus, self.kind) {
            (FormField::Name, DraftKind::Blank) => FormField::Kind,
            (FormField::Name, _) => FormField::Path,
            (FormField::Kind, _) => FormField::Name,
            (FormField::Path, _) => FormField::Kind,
        };
    }

    pub fn insert_char(&mut self, ch: char) {
        self.error = None;
        match self.focus {
            FormField::Name => self.name.push(ch),
            FormField::Path => self.path.push(ch),
            FormField::Kind => {}
        }
    }

    pub fn backspace(&mut self) {
        self.error = None;
        match self.focus {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Path => {
                self.path.pop();
            }
            FormField::Kind => {}
        }
    }

    pub fn cycle_kind(&mut self, forward: bool) {
        self.error = None;
        self.kind = if forward {
            self.kind.next()
        } else {
            self.kind.prev()
        };
        self.path.clear();
    }
}

#[derive(Debug)]
pub struct UIState {
    pub redraw_flags: AtomicU32,

    pub overlay: UIOverlay,

    // Single-line prompt
    pub input: CompactString,
    pub input_cursor: usize,
    pub prompt: Option<PromptKind>,

    pub context_menu: Option<ContextMenuState>,
    pub confirm_delete: Option<NodeId>,
    pub add_document: Option<AddDocumentForm>,
    pub editor: Option<EditorState>,

    // Sidebar view: categories are expanded unless listed here
    pub collapsed: HashSet<NodeId>,
    pub cursor: usize,
    pub sidebar_scroll: usize,

    pub content_scroll: u16,

    pub notification: Option<Notification>,
    pub notification_ms: u32,
    pub last_update: Instant,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new(3000)
    }
}

impl UIState {
    pub fn new(notification_ms: u32) -> Self {
        Self {
            redraw_flags: AtomicU32::new(u32::from(RedrawFlag::All.bits())),
            overlay: UIOverlay::None,
            input: CompactString::new(""),
            input_cursor: 0,
            prompt: None,
            context_menu: None,
            confirm_delete: None,
            add_document: None,
            editor: None,
            collapsed: HashSet::new(),
            cursor: 0,
            sidebar_scroll: 0,
            content_scroll: 0,
            notification: None,
            notification_ms,
            last_update: Instant::now(),
        }
    }

    #[inline]
    pub fn request_redraw(&self, flag: RedrawFlag) {
        self.redraw_flags
            .fetch_or(u32::from(flag.bits()), Ordering::Relaxed);
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw_flags.load(Ordering::Relaxed) != 0
    }

    #[inline]
    pub fn clear_redraw(&self) {
        self.redraw_flags.store(0, Ordering::Relaxed);
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        !self.collapsed.contains(id)
    }

    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) {
        if expanded {
            self.collapsed.remove(id);
        } else {
            self.collapsed.insert(id.clone());
        }
        self.request_redraw(RedrawFlag::Sidebar);
    }

    // Overlays

    pub fn toggle_help(&mut self) {
        self.overlay = if self.overlay == UIOverlay::Help {
            UIOverlay::None
        } else {
            UIOverlay::Help
        };
        self.request_redraw(RedrawFlag::All);
    }

    pub fn open_context_menu(&mut self, target_id: NodeId, target_kind: NodeKind, anchor_row: u16) {
        self.context_menu = Some(ContextMenuState {
            target_id,
            target_kind,
            anchor_row,
            selected: 0,
        });
        self.overlay = UIOverlay::ContextMenu;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn open_prompt(&mut self, kind: PromptKind, initial: &str) {
        self.context_menu = None;
        self.prompt = Some(kind);
        self.set_input(initial);
        self.overlay = UIOverlay::Prompt;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn open_confirm_delete(&mut self, target: NodeId) {
        self.context_menu = None;
        self.confirm_delete = Some(target);
        self.overlay = UIOverlay::ConfirmDelete;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn open_add_document(&mut self, form: AddDocumentForm) {
        self.context_menu = None;
        self.add_document = Some(form);
        self.overlay = UIOverlay::AddDocument;
        self.request_redraw(RedrawFlag::Overlay);
    }

    pub fn open_editor(&mut self, editor: EditorState) {
        self.context_menu = None;
        self.editor = Some(editor);
        self.overlay = UIOverlay::Editor;
        self.request_redraw(RedrawFlag::All);
    }

    /// Closes whatever overlay is open and drops its transient state.
    pub fn close_overlay(&mut self) {
        self.overlay = UIOverlay::None;
        self.context_menu = None;
        self.prompt = None;
        self.confirm_delete = None;
        self.add_document = None;
        self.editor = None;
        self.clear_input();
        self.request_redraw(RedrawFlag::All);
    }

    // Notification system with inline helpers

    pub fn show_notification(
        &mut self,
        message: impl Into<CompactString>,
        level: NotificationLevel,
        auto_dismiss_ms: Option<u32>,
    ) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss_ms,
        });
        self.request_redraw(RedrawFlag::Notification);
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Info, Some(self.notification_ms));
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<CompactString>) {
        self.show_notification(
            message,
            NotificationLevel::Success,
            Some(self.notification_ms),
        );
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<CompactString>) {
        self.show_notification(
            message,
            NotificationLevel::Warning,
            Some(self.notification_ms.saturating_mul(2)),
        );
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Error, None);
    }

    pub fn dismiss_notification(&mut self) {
        if self.notification.take().is_some() {
            self.request_redraw(RedrawFlag::Notification);
        }
    }

    // Auto-dismiss notifications
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification
            && let Some(auto_dismiss_ms) = notification.auto_dismiss_ms
            && notification.timestamp.elapsed().as_millis() > u128::from(auto_dismiss_ms)
        {
            self.notification = None;
            self.request_redraw(RedrawFlag::Notification);
            return true;
        }
        false
    }

    // Input management

    pub fn clear_input(&mut self) {
        self.input = CompactString::new("");
        self.input_cursor = 0;
    }

    pub fn set_input(&mut self, text: impl Into<CompactString>) {
        self.input = text.into();
        self.input_cursor = self.input.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut input_str = self.input.to_string();
        input_str.insert(self.input_cursor, ch);
        self.input = input_str.into();
        self.input_cursor += ch.len_utf8();
    }

    pub fn delete_char_before(&mut self) -> bool {
        if let Some((char_pos, _)) = self.input[..self.input_cursor].char_indices().next_back() {
            let mut input_str = self.input.to_string();
            input_str.remove(char_pos);
            self.input = input_str.into();
            self.input_cursor = char_pos;
            return true;
        }
        false
    }

    pub fn move_input_cursor_left(&mut self) {
        if let Some((char_pos, _)) = self.input[..self.input_cursor].char_indices().next_back() {
            self.input_cursor = char_pos;
        }
    }

    pub fn move_input_cursor_right(&mut self) {
        if let Some(ch) = self.input[self.input_cursor..].chars().next() {
            self.input_cursor += ch.len_utf8();
        }
    }
}
