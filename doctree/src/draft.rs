use crate::error::{TreeError, TreeResult};
use crate::forest::Forest;
use crate::id::IdGenerator;
use crate::node::{Document, FilePath, Node};
use compact_str::CompactString;

pub const BLANK_DOCUMENT_HTML: &str =
    "<h1>New Document</h1><p>Start editing your content here.</p>";

pub const DOCUMENT_NAME_REQUIRED: &str = "Document name is required.";

/// Content source picked in the add-document dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSource {
    /// Starts from a placeholder page.
    Blank,
    /// Links an application-relative `.md`/`.html` path, fetched on display.
    Link { path: String },
    /// Text already read from a local file.
    Upload { content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    pub name: String,
    pub source: DraftSource,
}

impl DocumentDraft {
    pub fn new(name: impl Into<String>, source: DraftSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Validates the draft and turns it into a document node.
    ///
    /// An id is drawn from `ids` only once validation has passed. `today` is
    /// stamped as `last_updated` for blank and uploaded documents; linked
    /// documents get no timestamp until their content is written inline.
    pub fn into_node(
        self,
        ids: &mut IdGenerator,
        forest: &Forest,
        today: &str,
    ) -> TreeResult<Node> {
        let name = required_name(&self.name, DOCUMENT_NAME_REQUIRED)?;
        let document = match self.source {
            DraftSource::Blank => Document::inline(BLANK_DOCUMENT_HTML, today),
            DraftSource::Link { path } => Document::linked(FilePath::parse(&path)?),
            DraftSource::Upload { content } => Document::inline(content, today),
        };
        Ok(Node::new_document(ids.next_id(forest), name, document))
    }
}

pub fn new_category(ids: &mut IdGenerator, forest: &Forest, raw_name: &str) -> TreeResult<Node> {
    let name = required_name(raw_name, "Category name is required.")?;
    Ok(Node::category(ids.next_id(forest), name))
}

/// Trims a user-entered name, rejecting empty or whitespace-only input.
pub fn required_name(raw: &str, message: &'static str) -> TreeResult<CompactString> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TreeError::validation("name", message));
    }
    Ok(CompactString::from(trimmed))
}
