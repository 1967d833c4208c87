// docview-core/src/model/app_state.rs
// Session state: the document forest, the active selection and the content it resolves to

use std::path::PathBuf;
use std::sync::Arc;

use doctree::draft::{self, DOCUMENT_NAME_REQUIRED, DocumentDraft, DraftSource};
use doctree::node::today_display;
use doctree::{Forest, IdGenerator, Node, NodeId, TreeError, TreeRow, initial_selection};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::content::fetcher::ResourceFetcher;
use crate::content::resolver::{
    ContentPlan, ContentResolver, EditSource, edit_source, select_item_placeholder,
};
use crate::content::sanitize::{DisplayHtml, HtmlPolicy};
use crate::content::upload::check_upload_path;
use crate::controller::event_loop::TaskResult;
use crate::error::{AppError, FetchError, UploadError};
use crate::model::editor::EditorState;
use crate::model::ui_state::{AddDocumentForm, DraftKind, RedrawFlag, UIOverlay, UIState};
use crate::tasks::content_task::{
    ContentRequest, FetchPurpose, spawn_content_fetch, spawn_upload_read,
};

/// A fetch the session is still waiting for.
#[derive(Debug)]
struct InFlight {
    request_id: u64,
    node_id: NodeId,
    cancel: CancellationToken,
}

impl InFlight {
    fn matches(&self, request: &ContentRequest) -> bool {
        self.request_id == request.request_id && self.node_id == request.node_id
    }
}

pub struct AppState {
    pub config: Arc<Config>,
    forest: Forest,
    ids: IdGenerator,

    // Selection and resolved content
    active_id: Option<NodeId>,
    content: DisplayHtml,
    loading: bool,

    // Monotonic id shared by every background request
    request_seq: u64,
    display_fetch: Option<InFlight>,
    edit_fetch: Option<InFlight>,

    resolver: ContentResolver,
    fetcher: Arc<dyn ResourceFetcher>,
    task_tx: mpsc::UnboundedSender<TaskResult>,

    pub ui: UIState,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        forest: Forest,
        fetcher: Arc<dyn ResourceFetcher>,
        task_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        let ids = IdGenerator::seeded_from(&forest);
        let resolver = ContentResolver::new(HtmlPolicy::new(
            config.content.allow_unsanitized_html,
        ));
        let notification_ms = u32::try_from(config.ui.notification_ms).unwrap_or(u32::MAX);

        info!(
            nodes = forest.len(),
            next_id = ids.peek(),
            "Session state created"
        );

        Self {
            config,
            forest,
            ids,
            active_id: None,
            content: select_item_placeholder(),
            loading: false,
            request_seq: 0,
            display_fetch: None,
            edit_fetch: None,
            resolver,
            fetcher,
            task_tx,
            ui: UIState::new(notification_ms),
        }
    }

    // Accessors

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn active_id(&self) -> Option<&NodeId> {
        self.active_id.as_ref()
    }

    pub fn active_node(&self) -> Option<&Node> {
        self.active_id
            .as_ref()
            .and_then(|id| self.forest.find_by_id(id.as_str()))
    }

    pub fn content(&self) -> &DisplayHtml {
        &self.content
    }

    /// True while the pane or the editor is waiting on a fetch.
    pub fn is_loading(&self) -> bool {
        self.loading || self.edit_fetch.is_some()
    }

    pub fn source_description(&self) -> String {
        self.fetcher.describe()
    }

    fn next_request_id(&mut self) -> u64 {
        self.request_seq += 1;
        self.request_seq
    }

    // Selection

    /// Applies the initial auto-select policy.
    pub fn start(&mut self) {
        let initial = initial_selection(&self.forest);
        info!(initial = ?initial, "Initial selection");
        self.select_node(initial);
    }

    /// Makes `id` the active selection and re-resolves the content pane.
    ///
    /// Unknown ids clear the selection. An open editor is closed.
    #[instrument(level = "debug", skip(self))]
    pub fn select_node(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.forest.contains(id.as_str()));

        if self.ui.overlay == UIOverlay::Editor {
            self.ui.close_overlay();
        }
        if let Some(pending) = self.edit_fetch.take() {
            pending.cancel.cancel();
        }

        self.active_id = id;
        if let Some(id) = self.active_id.clone() {
            self.reveal(&id);
        }
        self.refresh_content();
        self.ui.request_redraw(RedrawFlag::Sidebar);
    }

    /// Re-runs content resolution for the active selection.
    pub fn refresh_content(&mut self) {
        if let Some(previous) = self.display_fetch.take() {
            debug!(request_id = previous.request_id, "Cancelling superseded fetch");
            previous.cancel.cancel();
        }

        self.loading = true;
        self.ui.content_scroll = 0;

        let plan = self.resolver.plan(
            self.active_id
                .as_ref()
                .and_then(|id| self.forest.find_by_id(id.as_str())),
        );

        match (plan, self.active_id.clone()) {
            (ContentPlan::Fetch(path), Some(node_id)) => {
                let request_id = self.next_request_id();
                let cancel = CancellationToken::new();
                debug!(request_id, %path, "Fetching document content");

                self.content = DisplayHtml::trusted(String::new());
                spawn_content_fetch(
                    ContentRequest {
                        request_id,
                        node_id: node_id.clone(),
                        path,
                        purpose: FetchPurpose::Display,
                    },
                    Arc::clone(&self.fetcher),
                    cancel.clone(),
                    self.task_tx.clone(),
                );
                self.display_fetch = Some(InFlight {
                    request_id,
                    node_id,
                    cancel,
                });
            }
            (ContentPlan::Ready(html), _) => {
                self.content = html;
                self.loading = false;
            }
            (ContentPlan::Fetch(_), None) => {
                self.content = select_item_placeholder();
                self.loading = false;
            }
        }

        self.ui.request_redraw(RedrawFlag::Content);
    }

    /// Applies a background result. Returns `false` when it was stale and dropped.
    pub fn apply_task_result(&mut self, result: TaskResult) -> bool {
        match result {
            TaskResult::ContentFetched { request, result } => match request.purpose {
                FetchPurpose::Display => self.finish_display_fetch(request, result),
                FetchPurpose::Edit => self.finish_edit_fetch(request, result),
            },
            TaskResult::UploadRead { request_id, result } => {
                self.finish_upload(request_id, result)
            }
        }
    }

    fn is_current(slot: &Option<InFlight>, request: &ContentRequest, active: Option<&NodeId>) -> bool {
        slot.as_ref().is_some_and(|pending| pending.matches(request))
            && active == Some(&request.node_id)
    }

    fn finish_display_fetch(
        &mut self,
        request: ContentRequest,
        result: Result<String, FetchError>,
    ) -> bool {
        if !Self::is_current(&self.display_fetch, &request, self.active_id.as_ref()) {
            debug!(
                request_id = request.request_id,
                node_id = %request.node_id,
                "Dropping stale content response"
            );
            return false;
        }

        self.display_fetch = None;
        self.content = self.resolver.complete(&request.path, result);
        self.loading = false;
        self.ui.request_redraw(RedrawFlag::Content);
        true
    }

    fn finish_edit_fetch(
        &mut self,
        request: ContentRequest,
        result: Result<String, FetchError>,
    ) -> bool {
        if !Self::is_current(&self.edit_fetch, &request, self.active_id.as_ref()) {
            debug!(request_id = request.request_id, "Dropping stale edit response");
            return false;
        }
        self.edit_fetch = None;
        self.ui.request_redraw(RedrawFlag::Content);

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Error fetching raw document for edit: {}", e);
                self.ui.show_warning(format!(
                    "Could not load the original file content for editing: {e}. \
                     You'll edit the last known version or a blank slate."
                ));
                self.content.as_str().to_string()
            }
        };

        let name = self
            .forest
            .find_by_id(request.node_id.as_str())
            .map(|node| node.name().to_string())
            .unwrap_or_default();
        self.ui
            .open_editor(EditorState::new(request.node_id, name, &text));
        true
    }

    // Tree mutations

    fn check_parent(&self, parent: &NodeId) -> Result<(), TreeError> {
        match self.forest.find_by_id(parent.as_str()) {
            None => Err(TreeError::NodeNotFound(parent.as_str().into())),
            Some(node) if node.is_document() => Err(TreeError::invalid_parent(parent.as_str())),
            Some(_) => Ok(()),
        }
    }

    fn insert(&mut self, parent: Option<&NodeId>, node: Node) -> Result<NodeId, AppError> {
        let id = node.id().clone();
        match parent {
            Some(parent) => {
                self.forest.add_child(parent.as_str(), node)?;
                self.ui.set_expanded(parent, true);
            }
            None => self.forest.add_root(node)?,
        }
        self.ui.request_redraw(RedrawFlag::Sidebar);
        Ok(id)
    }

    /// Adds a category at the top level or under another category.
    #[instrument(level = "info", skip(self))]
    pub fn add_category(
        &mut self,
        parent: Option<&NodeId>,
        raw_name: &str,
    ) -> Result<NodeId, AppError> {
        if let Some(parent) = parent {
            self.check_parent(parent)?;
        }
        let node = draft::new_category(&mut self.ids, &self.forest, raw_name)?;
        let id = self.insert(parent, node)?;
        info!(%id, "Category added");
        Ok(id)
    }

    /// Adds a document and selects it.
    #[instrument(level = "info", skip(self, draft), fields(name = %draft.name))]
    pub fn add_document(
        &mut self,
        parent: Option<&NodeId>,
        draft: DocumentDraft,
    ) -> Result<NodeId, AppError> {
        if let Some(parent) = parent {
            self.check_parent(parent)?;
        }
        let node = draft.into_node(&mut self.ids, &self.forest, &today_display())?;
        let id = self.insert(parent, node)?;
        info!(%id, "Document added");
        self.select_node(Some(id.clone()));
        Ok(id)
    }

    /// Renames a node. Empty or unchanged names are ignored and return `false`.
    #[instrument(level = "info", skip(self))]
    pub fn rename(&mut self, id: &NodeId, raw_name: &str) -> Result<bool, AppError> {
        let node = self
            .forest
            .find_by_id(id.as_str())
            .ok_or_else(|| TreeError::NodeNotFound(id.as_str().into()))?;

        let name = raw_name.trim();
        if name.is_empty() || name == node.name() {
            debug!("Rename skipped");
            return Ok(false);
        }
        let is_category = node.is_category();

        self.forest.update_by_id(id.as_str(), |node| node.set_name(name));
        // the category placeholder embeds the name
        if is_category && self.active_id.as_ref() == Some(id) {
            self.refresh_content();
        }
        self.ui.request_redraw(RedrawFlag::Sidebar);
        Ok(true)
    }

    /// Deletes a node and its subtree, returning the removed ids.
    #[instrument(level = "info", skip(self))]
    pub fn delete(&mut self, id: &NodeId) -> Result<Vec<NodeId>, AppError> {
        let removed = self.forest.remove_by_id(id.as_str());
        if removed.is_empty() {
            return Err(TreeError::NodeNotFound(id.as_str().into()).into());
        }
        info!(count = removed.len(), "Removed subtree");

        for gone in &removed {
            self.ui.collapsed.remove(gone);
        }
        if self
            .ui
            .editor
            .as_ref()
            .is_some_and(|editor| removed.contains(&editor.node_id))
        {
            self.ui.close_overlay();
        }
        if self
            .active_id
            .as_ref()
            .is_some_and(|active| removed.contains(active))
        {
            self.select_node(None);
        }

        self.clamp_cursor();
        self.ui.request_redraw(RedrawFlag::All);
        Ok(removed)
    }

    // Add-document form

    pub fn open_add_document_form(&mut self, parent: Option<NodeId>) {
        let parent_name = parent
            .as_ref()
            .and_then(|id| self.forest.find_by_id(id.as_str()))
            .map(|node| node.name().to_string())
            .unwrap_or_default();
        self.ui
            .open_add_document(AddDocumentForm::new(parent, parent_name));
    }

    /// Submits the add-document form.
    ///
    /// Blank and linked documents are added immediately. Uploads are validated
    /// here and read in the background; the form stays open until the read
    /// completes. Errors are also recorded on the form.
    pub fn submit_add_document(&mut self) -> Result<Option<NodeId>, AppError> {
        let Some(form) = self.ui.add_document.as_ref() else {
            return Ok(None);
        };
        if form.pending_upload.is_some() {
            return Ok(None);
        }

        let parent = form.parent.clone();
        let name = form.name.clone();
        let source = match form.kind {
            DraftKind::Blank => DraftSource::Blank,
            DraftKind::Link => DraftSource::Link {
                path: form.path.clone(),
            },
            DraftKind::Upload => {
                let path = form.path.trim().to_string();
                let result = self.start_upload(&name, path);
                return result.map(|()| None).inspect_err(|e| self.record_form_error(e));
            }
        };

        let result = self.add_document(parent.as_ref(), DocumentDraft::new(name, source));
        self.finish_form(result).map(Some)
    }

    fn start_upload(&mut self, name: &str, path: String) -> Result<(), AppError> {
        draft::required_name(name, DOCUMENT_NAME_REQUIRED)?;
        let path = (!path.is_empty()).then(|| PathBuf::from(path));
        check_upload_path(path.as_deref())?;

        let request_id = self.next_request_id();
        if let Some(form) = self.ui.add_document.as_mut() {
            form.pending_upload = Some(request_id);
            form.error = None;
        }
        spawn_upload_read(request_id, path, self.task_tx.clone());
        Ok(())
    }

    fn finish_upload(&mut self, request_id: u64, result: Result<String, UploadError>) -> bool {
        let Some(form) = self
            .ui
            .add_document
            .as_mut()
            .filter(|form| form.pending_upload == Some(request_id))
        else {
            debug!(request_id, "Dropping stale upload result");
            return false;
        };
        form.pending_upload = None;

        let parent = form.parent.clone();
        let name = form.name.clone();
        let result = result.map_err(AppError::from).and_then(|content| {
            self.add_document(
                parent.as_ref(),
                DocumentDraft::new(name, DraftSource::Upload { content }),
            )
        });
        // surfaced on the form
        let _ = self.finish_form(result);
        true
    }

    fn finish_form(&mut self, result: Result<NodeId, AppError>) -> Result<NodeId, AppError> {
        match &result {
            Ok(_) => {
                if self.ui.overlay == UIOverlay::AddDocument {
                    self.ui.close_overlay();
                }
            }
            Err(e) => self.record_form_error(e),
        }
        result
    }

    fn record_form_error(&mut self, error: &AppError) {
        if let Some(form) = self.ui.add_document.as_mut() {
            form.error = Some(error.to_string().into());
            self.ui.request_redraw(RedrawFlag::Overlay);
        }
    }

    // Editing

    /// Opens the editor on the active document, fetching raw text for linked files.
    #[instrument(level = "info", skip(self))]
    pub fn open_editor(&mut self) -> Result<(), AppError> {
        let Some(node) = self.active_node().filter(|node| node.is_document()) else {
            return Err(TreeError::validation("selection", "Select a document to edit.").into());
        };
        let node_id = node.id().clone();
        let name = node.name().to_string();
        let source = node
            .document()
            .map_or(EditSource::Ready(String::new()), edit_source);

        match source {
            EditSource::Ready(text) => {
                self.ui.open_editor(EditorState::new(node_id, name, &text));
            }
            EditSource::FetchRaw(path) => {
                if let Some(previous) = self.edit_fetch.take() {
                    previous.cancel.cancel();
                }
                let request_id = self.next_request_id();
                let cancel = CancellationToken::new();
                spawn_content_fetch(
                    ContentRequest {
                        request_id,
                        node_id: node_id.clone(),
                        path,
                        purpose: FetchPurpose::Edit,
                    },
                    Arc::clone(&self.fetcher),
                    cancel.clone(),
                    self.task_tx.clone(),
                );
                self.edit_fetch = Some(InFlight {
                    request_id,
                    node_id,
                    cancel,
                });
                self.ui.show_info("Loading document for editing...");
                self.ui.request_redraw(RedrawFlag::Content);
            }
        }
        Ok(())
    }

    /// Writes the editor text back as inline content and closes the editor.
    ///
    /// Any file link is dropped and the date is refreshed.
    #[instrument(level = "info", skip(self))]
    pub fn save_edit(&mut self) -> Result<(), AppError> {
        let Some(editor) = self.ui.editor.take() else {
            return Ok(());
        };
        self.ui.close_overlay();

        let text = editor.text();
        let today = today_display();
        let updated = self.forest.update_by_id(editor.node_id.as_str(), |node| {
            if let Some(doc) = node.document_mut() {
                doc.set_inline(text, today);
            }
        });
        if !updated {
            return Err(TreeError::NodeNotFound(editor.node_id.as_str().into()).into());
        }

        info!(node_id = %editor.node_id, "Document saved");
        if self.active_id.as_ref() == Some(&editor.node_id) {
            self.refresh_content();
        }
        self.ui.show_success(format!("Saved '{}'", editor.document_name));
        Ok(())
    }

    // Sidebar view

    /// Visible sidebar rows in display order, honouring collapsed categories.
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        self.forest.walk_with(|id| self.ui.is_expanded(id))
    }

    pub fn cursor_node_id(&self) -> Option<NodeId> {
        self.visible_rows()
            .get(self.ui.cursor)
            .map(|row| row.node.id().clone())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.ui.cursor = 0;
            return;
        }
        self.ui.cursor = self.ui.cursor.saturating_add_signed(delta).min(len - 1);
        self.ui.request_redraw(RedrawFlag::Sidebar);
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_rows().len();
        self.ui.cursor = self.ui.cursor.min(len.saturating_sub(1));
    }

    /// Expands, collapses or toggles the category under the cursor.
    pub fn set_cursor_expanded(&mut self, expanded: Option<bool>) {
        let Some(id) = self.cursor_node_id() else {
            return;
        };
        if !self
            .forest
            .find_by_id(id.as_str())
            .is_some_and(Node::is_category)
        {
            return;
        }
        let expanded = expanded.unwrap_or(!self.ui.is_expanded(&id));
        self.ui.set_expanded(&id, expanded);
        self.clamp_cursor();
    }

    /// Expands every ancestor of `id` and moves the cursor onto it.
    fn reveal(&mut self, id: &NodeId) {
        let mut current = self.forest.parent_of(id.as_str()).map(|p| p.id().clone());
        while let Some(parent) = current {
            self.ui.collapsed.remove(&parent);
            current = self
                .forest
                .parent_of(parent.as_str())
                .map(|p| p.id().clone());
        }
        if let Some(position) = self
            .visible_rows()
            .iter()
            .position(|row| row.node.id() == id)
        {
            self.ui.cursor = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use doctree::{Document, FilePath, seed};
    use std::collections::HashMap;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Serves canned responses; unknown paths answer 404.
    #[derive(Default)]
    struct StubFetcher {
        responses: HashMap<&'static str, Result<String, FetchError>>,
    }

    impl StubFetcher {
        fn with(mut self, path: &'static str, response: Result<String, FetchError>) -> Self {
            self.responses.insert(path, response);
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for StubFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
            self.responses
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::status(path, 404)))
        }

        fn describe(&self) -> String {
            "stub".into()
        }
    }

    fn session(
        forest: Forest,
        fetcher: StubFetcher,
    ) -> (AppState, UnboundedReceiver<TaskResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState::new(Arc::new(Config::default()), forest, Arc::new(fetcher), tx);
        (state, rx)
    }

    fn doc(id: &str, name: &str, document: Document) -> Node {
        Node::new_document(NodeId::from(id), name, document)
    }

    fn linked(id: &str, name: &str, path: &str) -> Node {
        doc(id, name, Document::linked(FilePath::parse(path).unwrap()))
    }

    async fn pump(state: &mut AppState, rx: &mut UnboundedReceiver<TaskResult>) -> bool {
        let result = rx.recv().await.expect("task result");
        state.apply_task_result(result)
    }

    #[tokio::test]
    async fn missing_file_shows_error_with_path() {
        let mut forest = Forest::new();
        forest.add_root(linked("1", "Broken", "/d/x.md")).unwrap();
        let (mut state, mut rx) = session(forest, StubFetcher::default());

        state.select_node(Some(NodeId::from("1")));
        assert!(state.is_loading());

        assert!(pump(&mut state, &mut rx).await);
        assert!(state.content().as_str().contains("/d/x.md"));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn inline_content_is_shown_synchronously() {
        let mut forest = Forest::new();
        forest
            .add_root(doc("1", "Inline", Document::inline("<p>hi</p>", "1/1/2024")))
            .unwrap();
        let (mut state, mut rx) = session(forest, StubFetcher::default());

        state.select_node(Some(NodeId::from("1")));
        assert_eq!(state.content().as_str(), "<p>hi</p>");
        assert!(!state.is_loading());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn markdown_file_is_rendered() {
        let mut forest = Forest::new();
        forest
            .add_root(linked("1", "Intro", "/documents/introduction.md"))
            .unwrap();
        let fetcher =
            StubFetcher::default().with("/documents/introduction.md", Ok("# Welcome".into()));
        let (mut state, mut rx) = session(forest, fetcher);

        state.start();
        assert_eq!(state.active_id().unwrap().as_str(), "1");
        assert!(pump(&mut state, &mut rx).await);
        assert_eq!(state.content().as_str(), "<h1>Welcome</h1>\n");
    }

    #[tokio::test]
    async fn empty_document_name_leaves_forest_unchanged() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        let before = state.forest().clone();

        let err = state
            .add_document(None, DocumentDraft::new("   ", DraftSource::Blank))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Document name is required.");
        assert_eq!(state.forest(), &before);
    }

    #[tokio::test]
    async fn new_document_is_selected_with_next_id() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());

        let id = state
            .add_document(
                Some(&NodeId::from("2")),
                DocumentDraft::new("Pricing", DraftSource::Blank),
            )
            .unwrap();
        assert_eq!(id.as_str(), "4");
        assert_eq!(state.active_id(), Some(&id));
        assert_eq!(state.forest().parent_of("4").unwrap().id().as_str(), "2");
        assert_eq!(state.content().as_str(), draft::BLANK_DOCUMENT_HTML);
    }

    #[tokio::test]
    async fn adding_under_a_document_is_rejected() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        let before = state.forest().clone();

        let err = state
            .add_category(Some(&NodeId::from("3")), "Nested")
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Tree(TreeError::InvalidParent { .. })
        ));
        assert_eq!(state.forest(), &before);

        let err = state
            .add_document(
                Some(&NodeId::from("1")),
                DocumentDraft::new("Child", DraftSource::Blank),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Tree(TreeError::InvalidParent { .. })));
        assert_eq!(state.forest(), &before);
    }

    #[tokio::test]
    async fn roots_display_alphabetically() {
        let mut forest = Forest::new();
        forest
            .add_root(doc("1", "Zebra", Document::empty()))
            .unwrap();
        forest
            .add_root(doc("2", "Alpha", Document::empty()))
            .unwrap();
        let (state, _rx) = session(forest, StubFetcher::default());

        let names: Vec<_> = state
            .visible_rows()
            .iter()
            .map(|row| row.node.name().to_string())
            .collect();
        assert_eq!(names, ["Alpha", "Zebra"]);
    }

    #[tokio::test]
    async fn deleting_active_node_resets_selection() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("new_doc")));
        assert_eq!(state.active_id().unwrap().as_str(), "new_doc");

        state.delete(&NodeId::from("new_doc")).unwrap();
        assert!(state.active_id().is_none());
        assert_eq!(
            state.content().as_str(),
            "<p>Select an item from the sidebar.</p>"
        );
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn deleting_ancestor_of_active_node_resets_selection() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("2.1")));

        let removed = state.delete(&NodeId::from("2")).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(state.active_id().is_none());
        assert!(state.forest().find_by_id("2.2").is_none());
    }

    #[tokio::test]
    async fn response_for_deleted_node_is_dropped() {
        let (mut state, mut rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("3")));
        let request = ContentRequest {
            request_id: state.request_seq,
            node_id: NodeId::from("3"),
            path: FilePath::parse("/documents/s3-storage.html").unwrap(),
            purpose: FetchPurpose::Display,
        };

        state.delete(&NodeId::from("3")).unwrap();
        let applied = state.apply_task_result(TaskResult::ContentFetched {
            request,
            result: Ok("<p>late</p>".into()),
        });
        assert!(!applied);
        assert_eq!(state.content().as_str(), "<p>Select an item from the sidebar.</p>");
        // the cancelled task never reports
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn superseded_response_is_dropped() {
        let fetcher = StubFetcher::default()
            .with("/documents/introduction.md", Ok("# One".into()))
            .with("/documents/s3-storage.html", Ok("<p>three</p>".into()));
        let (mut state, mut rx) = session(seed::builtin_forest(), fetcher);

        state.select_node(Some(NodeId::from("1")));
        let first = ContentRequest {
            request_id: state.request_seq,
            node_id: NodeId::from("1"),
            path: FilePath::parse("/documents/introduction.md").unwrap(),
            purpose: FetchPurpose::Display,
        };
        state.select_node(Some(NodeId::from("3")));

        assert!(!state.apply_task_result(TaskResult::ContentFetched {
            request: first,
            result: Ok("# One".into()),
        }));
        assert!(state.is_loading());

        assert!(pump(&mut state, &mut rx).await);
        assert_eq!(state.content().as_str(), "<p>three</p>");
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn rename_requires_a_new_non_empty_name() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        let id = NodeId::from("2");
        state.select_node(Some(id.clone()));

        assert!(!state.rename(&id, "   ").unwrap());
        assert!(!state.rename(&id, "EC2 Instances").unwrap());
        assert!(state.rename(&id, " Compute ").unwrap());
        assert_eq!(state.forest().find_by_id("2").unwrap().name(), "Compute");
        assert!(state.content().as_str().contains("<strong>Compute</strong>"));
    }

    #[tokio::test]
    async fn edit_loads_raw_markdown() {
        let fetcher = StubFetcher::default()
            .with("/documents/introduction.md", Ok("# Raw *text*".into()));
        let (mut state, mut rx) = session(seed::builtin_forest(), fetcher);
        state.select_node(Some(NodeId::from("1")));
        assert!(pump(&mut state, &mut rx).await);

        state.open_editor().unwrap();
        assert!(state.is_loading());
        assert!(pump(&mut state, &mut rx).await);
        assert!(!state.is_loading());
        assert_eq!(state.ui.overlay, UIOverlay::Editor);
        assert_eq!(state.ui.editor.as_ref().unwrap().text(), "# Raw *text*");
    }

    #[tokio::test]
    async fn failed_raw_fetch_falls_back_to_displayed_content() {
        let fetcher = StubFetcher::default()
            .with("/documents/s3-storage.html", Ok("<p>shown</p>".into()));
        let (mut state, mut rx) = session(seed::builtin_forest(), fetcher);
        state.select_node(Some(NodeId::from("3")));
        assert!(pump(&mut state, &mut rx).await);

        // the file disappears between display and edit
        let request = ContentRequest {
            request_id: state.request_seq + 1,
            node_id: NodeId::from("3"),
            path: FilePath::parse("/documents/s3-storage.html").unwrap(),
            purpose: FetchPurpose::Edit,
        };
        state.open_editor().unwrap();
        assert!(state.is_loading());
        assert!(state.apply_task_result(TaskResult::ContentFetched {
            request,
            result: Err(FetchError::status("/documents/s3-storage.html", 500)),
        }));
        assert!(!state.is_loading());

        assert_eq!(state.ui.editor.as_ref().unwrap().text(), "<p>shown</p>");
        let warning = state.ui.notification.as_ref().unwrap();
        assert!(warning.message.starts_with("Could not load the original file content"));
    }

    #[tokio::test]
    async fn saving_edit_inlines_content() {
        let (mut state, mut rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("3")));
        assert!(pump(&mut state, &mut rx).await);

        state.ui.open_editor(EditorState::new(NodeId::from("3"), "S3 Buckets", "<p>new</p>"));
        state.save_edit().unwrap();

        let doc = state.forest().find_by_id("3").unwrap().document().unwrap();
        assert_eq!(doc.content(), Some("<p>new</p>"));
        assert!(doc.file_path().is_none());
        assert_eq!(doc.last_updated.as_deref(), Some(today_display().as_str()));
        assert_eq!(state.content().as_str(), "<p>new</p>");
        assert!(!state.is_loading());
        assert_eq!(state.ui.overlay, UIOverlay::None);
    }

    #[tokio::test]
    async fn selecting_another_node_closes_editor() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("new_doc")));
        state.open_editor().unwrap();
        assert_eq!(state.ui.overlay, UIOverlay::Editor);

        state.select_node(Some(NodeId::from("2")));
        assert_eq!(state.ui.overlay, UIOverlay::None);
        assert!(state.ui.editor.is_none());
    }

    #[tokio::test]
    async fn categories_cannot_be_edited() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.select_node(Some(NodeId::from("2")));
        assert!(state.open_editor().unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn upload_form_reads_file_then_adds_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        std::fs::write(&path, "# Guide").unwrap();

        let (mut state, mut rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.open_add_document_form(Some(NodeId::from("2")));
        {
            let form = state.ui.add_document.as_mut().unwrap();
            form.name = "Guide".into();
            form.kind = DraftKind::Upload;
            form.path = path.display().to_string();
        }

        assert_eq!(state.submit_add_document().unwrap(), None);
        assert!(pump(&mut state, &mut rx).await);

        let id = state.active_id().unwrap().clone();
        let node = state.forest().find_by_id(id.as_str()).unwrap();
        assert_eq!(node.name(), "Guide");
        assert_eq!(node.document().unwrap().content(), Some("# Guide"));
        assert_eq!(state.ui.overlay, UIOverlay::None);
    }

    #[tokio::test]
    async fn upload_form_rejects_bad_extension_before_reading() {
        let (mut state, mut rx) = session(seed::builtin_forest(), StubFetcher::default());
        state.open_add_document_form(None);
        {
            let form = state.ui.add_document.as_mut().unwrap();
            form.name = "Photo".into();
            form.kind = DraftKind::Upload;
            form.path = "/tmp/photo.png".into();
        }

        let err = state.submit_add_document().unwrap_err();
        assert_eq!(err.to_string(), "Please select a .md or .html file.");
        assert_eq!(
            state.ui.add_document.as_ref().unwrap().error.as_deref(),
            Some("Please select a .md or .html file.")
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn link_form_validates_path() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        let before = state.forest().clone();
        state.open_add_document_form(None);
        {
            let form = state.ui.add_document.as_mut().unwrap();
            form.name = "Notes".into();
            form.kind = DraftKind::Link;
            form.path = "notes.txt".into();
        }

        assert!(state.submit_add_document().unwrap_err().is_validation());
        assert_eq!(state.forest(), &before);
        assert_eq!(state.ui.overlay, UIOverlay::AddDocument);
    }

    #[tokio::test]
    async fn collapsing_hides_children() {
        let (mut state, _rx) = session(seed::builtin_forest(), StubFetcher::default());
        let total = state.visible_rows().len();
        assert_eq!(total, 6);

        // "EC2 Instances" is the first row
        state.ui.cursor = 0;
        state.set_cursor_expanded(Some(false));
        assert_eq!(state.visible_rows().len(), 4);

        state.select_node(Some(NodeId::from("2.2")));
        assert_eq!(state.visible_rows().len(), 6);
        assert_eq!(state.cursor_node_id().unwrap().as_str(), "2.2");
    }
}
