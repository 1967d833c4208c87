//! Seed datasets: the built-in tree and the nested JSON format used for seed files.
//!
//! A seed file is an array of nodes shaped like
//! `{"id": "2", "name": "EC2", "type": "category", "children": [...]}` or
//! `{"id": "3", "name": "S3", "type": "document", "filePath": "/documents/s3.html"}`.

use crate::error::{TreeError, TreeResult};
use crate::forest::Forest;
use crate::node::{Document, DocumentSource, FilePath, Node, NodeId, NodeKind, today_display};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedNode {
    pub id: NodeId,
    pub name: CompactString,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<SeedNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl SeedNode {
    fn category(id: &str, name: &str, children: Vec<SeedNode>) -> Self {
        Self {
            id: NodeId::from(id),
            name: name.into(),
            kind: NodeKind::Category,
            children,
            content: None,
            file_path: None,
            last_updated: None,
        }
    }

    fn linked(id: &str, name: &str, path: &str) -> Self {
        Self {
            id: NodeId::from(id),
            name: name.into(),
            kind: NodeKind::Document,
            children: Vec::new(),
            content: None,
            file_path: Some(path.to_string()),
            last_updated: None,
        }
    }

    fn to_node(&self) -> TreeResult<Node> {
        match self.kind {
            NodeKind::Category => {
                if self.content.is_some() || self.file_path.is_some() {
                    return Err(TreeError::validation(
                        "type",
                        format!("category '{}' cannot carry content or a file path", self.id),
                    ));
                }
                Ok(Node::category(self.id.clone(), self.name.clone()))
            }
            NodeKind::Document => {
                if !self.children.is_empty() {
                    return Err(TreeError::validation(
                        "children",
                        format!("document '{}' cannot have children", self.id),
                    ));
                }
                let source = match (&self.content, &self.file_path) {
                    (Some(_), Some(_)) => {
                        return Err(TreeError::validation(
                            "content",
                            format!("document '{}' has both content and filePath", self.id),
                        ));
                    }
                    (Some(content), None) => DocumentSource::Inline(content.clone()),
                    (None, Some(path)) => DocumentSource::File(FilePath::parse(path)?),
                    (None, None) => DocumentSource::Empty,
                };
                let document = Document {
                    source,
                    last_updated: self.last_updated.clone(),
                };
                Ok(Node::new_document(self.id.clone(), self.name.clone(), document))
            }
        }
    }

    fn from_node(forest: &Forest, node: &Node) -> Self {
        let children = forest
            .children_of(node.id().as_str())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| forest.find_by_id(id.as_str()))
            .map(|child| Self::from_node(forest, child))
            .collect();

        let (content, file_path, last_updated) = match node.document() {
            Some(doc) => (
                doc.content().map(str::to_string),
                doc.file_path().map(|path| path.as_str().to_string()),
                doc.last_updated.clone(),
            ),
            None => (None, None, None),
        };

        Self {
            id: node.id().clone(),
            name: CompactString::from(node.name()),
            kind: node.kind(),
            children,
            content,
            file_path,
            last_updated,
        }
    }
}

/// The dataset a fresh session starts from.
pub fn builtin_seed() -> Vec<SeedNode> {
    vec![
        SeedNode::linked("1", "Introduction", "/documents/introduction.md"),
        SeedNode::category(
            "2",
            "EC2 Instances",
            vec![
                SeedNode::linked("2.1", "Overview", "/documents/ec2-overview.html"),
                SeedNode::linked("2.2", "Getting Started", "/documents/getting-started-ec2.md"),
            ],
        ),
        SeedNode::linked("3", "S3 Buckets", "/documents/s3-storage.html"),
        SeedNode {
            id: NodeId::from("new_doc"),
            name: "My New Doc (Inline)".into(),
            kind: NodeKind::Document,
            children: Vec::new(),
            content: Some(
                "<h1>Inline Content</h1><p>This content is directly in the data.</p>".to_string(),
            ),
            file_path: None,
            last_updated: Some(today_display()),
        },
    ]
}

pub fn builtin_forest() -> Forest {
    build_forest(&builtin_seed()).unwrap_or_else(|err| {
        warn!(%err, "built-in seed rejected, starting empty");
        Forest::new()
    })
}

/// Builds a forest from nested seed nodes, validating every node on the way.
pub fn build_forest(seed: &[SeedNode]) -> TreeResult<Forest> {
    let mut forest = Forest::new();
    let mut stack: Vec<(Option<&NodeId>, &SeedNode)> =
        seed.iter().rev().map(|node| (None, node)).collect();

    while let Some((parent, seed_node)) = stack.pop() {
        let node = seed_node.to_node()?;
        match parent {
            Some(parent) => forest.add_child(parent.as_str(), node)?,
            None => forest.add_root(node)?,
        }
        stack.extend(
            seed_node
                .children
                .iter()
                .rev()
                .map(|child| (Some(&seed_node.id), child)),
        );
    }
    Ok(forest)
}

/// Exports the forest back into seed form, keeping insertion order.
pub fn to_seed(forest: &Forest) -> Vec<SeedNode> {
    forest
        .roots()
        .map(|root| SeedNode::from_node(forest, root))
        .collect()
}

pub fn parse_seed(json: &str) -> TreeResult<Vec<SeedNode>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_seed_file(path: &Path) -> TreeResult<Forest> {
    let json = std::fs::read_to_string(path).map_err(|e| TreeError::seed_io(path, &e))?;
    let forest = build_forest(&parse_seed(&json)?)?;
    info!(path = %path.display(), nodes = forest.len(), "seed file loaded");
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_seed_matches_reference_layout() {
        let forest = builtin_forest();
        assert_eq!(forest.len(), 6);
        assert!(forest.find_by_id("2").unwrap().is_category());
        assert_eq!(forest.children_of("2").unwrap().len(), 2);
        let inline = forest.find_by_id("new_doc").unwrap().document().unwrap();
        assert!(inline.content().unwrap().contains("Inline Content"));
        assert!(inline.last_updated.is_some());
    }

    #[test]
    fn export_then_rebuild_is_stable() {
        let forest = builtin_forest();
        let rebuilt = build_forest(&to_seed(&forest)).unwrap();
        assert_eq!(forest, rebuilt);
    }

    #[test]
    fn parses_reference_json_shape() {
        let json = r#"[
            {"id": "1", "name": "Intro", "type": "document", "filePath": "/documents/intro.md", "children": []},
            {"id": "2", "name": "Cat", "type": "category", "children": [
                {"id": "2.1", "name": "Inline", "type": "document", "content": "<p>x</p>", "lastUpdated": "1/1/2024"}
            ]}
        ]"#;
        let forest = build_forest(&parse_seed(json).unwrap()).unwrap();
        assert_eq!(forest.parent_of("2.1").unwrap().name(), "Cat");
        let doc = forest.find_by_id("2.1").unwrap().document().unwrap();
        assert_eq!(doc.last_updated.as_deref(), Some("1/1/2024"));
    }

    #[test]
    fn rejects_content_and_file_path_together() {
        let json = r#"[{"id": "1", "name": "Both", "type": "document",
                        "content": "<p>x</p>", "filePath": "/d/x.md"}]"#;
        let err = build_forest(&parse_seed(json).unwrap()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_duplicate_ids_across_levels() {
        let json = r#"[{"id": "1", "name": "A", "type": "category", "children": [
                        {"id": "1", "name": "B", "type": "document"}]}]"#;
        assert!(matches!(
            build_forest(&parse_seed(json).unwrap()),
            Err(TreeError::DuplicateId(_))
        ));
    }

    #[test]
    fn loads_seed_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "10", "name": "Solo", "type": "document", "filePath": "/d/solo.html"}}]"#
        )
        .unwrap();
        let forest = load_seed_file(file.path()).unwrap();
        assert!(forest.contains("10"));

        let missing = load_seed_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(missing, TreeError::SeedIo { .. }));
    }
}
