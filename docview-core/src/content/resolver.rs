//! ``src/content/resolver.rs``
//! ============================================================================
//! # Content Resolver
//!
//! Decides what the content pane shows for the current selection. Everything
//! except a linked document resolves synchronously; a linked document yields
//! a [`ContentPlan::Fetch`] that the session hands to a background task and
//! later completes with [`ContentResolver::complete`].

use doctree::{Document, DocumentFormat, DocumentSource, FilePath, Node};
use tracing::{debug, warn};

use super::markdown::render_markdown;
use super::sanitize::{DisplayHtml, HtmlPolicy, escape_html};
use crate::error::FetchError;

pub const SELECT_ITEM_HTML: &str = "<p>Select an item from the sidebar.</p>";

pub const NO_CONTENT_HTML: &str = "<p>No content or file path defined for this document.</p>";

/// Outcome of resolving a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPlan {
    /// Content is available now.
    Ready(DisplayHtml),
    /// Content must be fetched from `path` first.
    Fetch(FilePath),
}

/// What the editor starts from for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSource {
    Ready(String),
    /// Raw text of the linked file, never pre-rendered.
    FetchRaw(FilePath),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentResolver {
    policy: HtmlPolicy,
}

impl ContentResolver {
    pub fn new(policy: HtmlPolicy) -> Self {
        Self { policy }
    }

    pub fn plan(&self, node: Option<&Node>) -> ContentPlan {
        let Some(node) = node else {
            return ContentPlan::Ready(select_item_placeholder());
        };

        let Some(doc) = node.document() else {
            return ContentPlan::Ready(category_placeholder(node.name()));
        };

        match &doc.source {
            DocumentSource::Inline(content) => {
                ContentPlan::Ready(self.policy.admit(content.clone()))
            }
            DocumentSource::File(path) => ContentPlan::Fetch(path.clone()),
            DocumentSource::Empty => {
                ContentPlan::Ready(DisplayHtml::trusted(NO_CONTENT_HTML.to_string()))
            }
        }
    }

    /// Turns a finished fetch into display content.
    ///
    /// Markdown files are rendered, HTML files are used as fetched. Failures
    /// become an inline error naming the path.
    pub fn complete(&self, path: &FilePath, result: Result<String, FetchError>) -> DisplayHtml {
        match result {
            Ok(text) => match path.format() {
                DocumentFormat::Markdown => {
                    debug!("Rendering markdown from {}", path);
                    self.policy.admit(render_markdown(&text))
                }
                DocumentFormat::Html => self.policy.admit(text),
            },
            Err(e) => {
                warn!("Error fetching document content from {}: {}", path, e);
                fetch_error_placeholder(path.as_str())
            }
        }
    }
}

pub fn edit_source(doc: &Document) -> EditSource {
    match &doc.source {
        DocumentSource::Inline(content) => EditSource::Ready(content.clone()),
        DocumentSource::File(path) => EditSource::FetchRaw(path.clone()),
        DocumentSource::Empty => EditSource::Ready(String::new()),
    }
}

pub fn select_item_placeholder() -> DisplayHtml {
    DisplayHtml::trusted(SELECT_ITEM_HTML.to_string())
}

pub fn category_placeholder(name: &str) -> DisplayHtml {
    DisplayHtml::trusted(format!(
        "<p>This is the '<strong>{}</strong>' category. Select a document or add a sub-item.</p>",
        escape_html(name)
    ))
}

pub fn fetch_error_placeholder(path: &str) -> DisplayHtml {
    DisplayHtml::trusted(format!(
        "<p style=\"color:red;\">Error loading content from {}. Check console.</p>",
        escape_html(path)
    ))
}
