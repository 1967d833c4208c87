use crate::error::{TreeError, TreeResult};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Globally unique, immutable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(CompactString);

impl NodeId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Variant tag of a node, used wherever only the type matters (context menu, dialogs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Document,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Category => "category",
            NodeKind::Document => "document",
        }
    }
}

/// How the text behind a document path must be turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Html,
}

impl DocumentFormat {
    /// Recognises the two accepted extensions. Matching is case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".md") {
            Some(Self::Markdown)
        } else if name.ends_with(".html") {
            Some(Self::Html)
        } else {
            None
        }
    }
}

/// Application-relative path of an external document, always ending in `.md` or `.html`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath(CompactString);

impl FilePath {
    pub fn parse(raw: &str) -> TreeResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || DocumentFormat::from_name(trimmed).is_none() {
            return Err(TreeError::validation(
                "file_path",
                "Valid file path (ending in .md or .html) is required for linking.",
            ));
        }
        Ok(Self(CompactString::from(trimmed)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn format(&self) -> DocumentFormat {
        // parse() guarantees one of the two extensions
        DocumentFormat::from_name(self.as_str()).unwrap_or(DocumentFormat::Html)
    }

    pub fn is_markdown(&self) -> bool {
        self.format() == DocumentFormat::Markdown
    }
}

impl TryFrom<String> for FilePath {
    type Error = TreeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FilePath> for String {
    fn from(value: FilePath) -> Self {
        value.0.into_string()
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a document's content comes from. Inline content and a linked file are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DocumentSource {
    #[default]
    Empty,
    Inline(String),
    File(FilePath),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub source: DocumentSource,
    pub last_updated: Option<String>,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn inline(content: impl Into<String>, last_updated: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Inline(content.into()),
            last_updated: Some(last_updated.into()),
        }
    }

    pub fn linked(path: FilePath) -> Self {
        Self {
            source: DocumentSource::File(path),
            last_updated: None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.source {
            DocumentSource::Inline(content) => Some(content.as_str()),
            _ => None,
        }
    }

    pub fn file_path(&self) -> Option<&FilePath> {
        match &self.source {
            DocumentSource::File(path) => Some(path),
            _ => None,
        }
    }

    /// Replaces whatever source the document had with inline content, dropping any file link.
    pub fn set_inline(&mut self, content: impl Into<String>, last_updated: impl Into<String>) {
        self.source = DocumentSource::Inline(content.into());
        self.last_updated = Some(last_updated.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeBody {
    Category,
    Document(Document),
}

/// A category or document entry. Children live in the forest, not in the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    name: CompactString,
    body: NodeBody,
}

impl Node {
    pub fn category(id: NodeId, name: impl Into<CompactString>) -> Self {
        Self {
            id,
            name: name.into(),
            body: NodeBody::Category,
        }
    }

    pub fn new_document(id: NodeId, name: impl Into<CompactString>, document: Document) -> Self {
        Self {
            id,
            name: name.into(),
            body: NodeBody::Document(document),
        }
    }

    #[inline]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn set_name(&mut self, name: impl Into<CompactString>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Category => NodeKind::Category,
            NodeBody::Document(_) => NodeKind::Document,
        }
    }

    #[inline]
    pub fn is_category(&self) -> bool {
        matches!(self.body, NodeBody::Category)
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        !self.is_category()
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.body {
            NodeBody::Document(doc) => Some(doc),
            NodeBody::Category => None,
        }
    }

    pub fn document_mut(&mut self) -> Option<&mut Document> {
        match &mut self.body {
            NodeBody::Document(doc) => Some(doc),
            NodeBody::Category => None,
        }
    }
}

/// Formats a date the way document timestamps are shown (`M/D/YYYY`).
pub fn display_date(date: chrono::NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Today's date in display form, used whenever inline content is (re)written.
pub fn today_display() -> String {
    display_date(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_accepts_md_and_html_only() {
        assert!(FilePath::parse("/documents/intro.md").unwrap().is_markdown());
        assert_eq!(
            FilePath::parse("  /documents/page.html ").unwrap().as_str(),
            "/documents/page.html"
        );
        assert!(FilePath::parse("/documents/notes.txt").is_err());
        assert!(FilePath::parse("   ").is_err());
        assert!(FilePath::parse("/documents/README.MD").is_err());
    }

    #[test]
    fn set_inline_drops_file_link() {
        let path = FilePath::parse("/d/x.md").unwrap();
        let mut doc = Document::linked(path);
        assert!(doc.last_updated.is_none());

        doc.set_inline("<p>edited</p>", "1/2/2024");
        assert_eq!(doc.content(), Some("<p>edited</p>"));
        assert!(doc.file_path().is_none());
        assert_eq!(doc.last_updated.as_deref(), Some("1/2/2024"));
    }

    #[test]
    fn category_has_no_document_body() {
        let mut node = Node::category(NodeId::from("2"), "EC2 Instances");
        assert_eq!(node.kind(), NodeKind::Category);
        assert!(node.document().is_none());
        assert!(node.document_mut().is_none());
    }

    #[test]
    fn document_node_exposes_its_body() {
        let node = Node::new_document(
            NodeId::from("5"),
            "Notes",
            Document::inline("<p>hi</p>", "1/2/2024"),
        );
        assert_eq!(node.kind(), NodeKind::Document);
        assert_eq!(node.document().and_then(Document::content), Some("<p>hi</p>"));
    }

    #[test]
    fn display_date_has_no_padding() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(display_date(date), "3/7/2024");
    }
}
