//! Arena-backed forest of categories and documents.
//!
//! Nodes are stored in a flat table keyed by id with explicit parent/child links,
//! so lookups are O(1) and a mutation only touches the slots it affects. Child
//! lists keep insertion order; display order is computed on every read through
//! [`crate::sort`].

use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId};
use crate::sort;
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 8]>,
}

/// One visible line of the tree in display order.
#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    pub node: &'a Node,
    pub depth: usize,
    pub has_children: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    slots: HashMap<NodeId, Slot>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.slots.keys()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.slots.get(id).map(|slot| &slot.node)
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        let parent = self.slots.get(id)?.parent.as_ref()?;
        self.find_by_id(parent.as_str())
    }

    /// Child ids in insertion order. `None` for unknown ids, empty for documents.
    pub fn children_of(&self, id: &str) -> Option<&[NodeId]> {
        self.slots.get(id).map(|slot| slot.children.as_slice())
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().filter_map(|id| self.find_by_id(id.as_str()))
    }

    pub fn sorted_roots(&self) -> Vec<&Node> {
        self.sorted(&self.roots)
    }

    pub fn sorted_children(&self, id: &str) -> Vec<&Node> {
        match self.slots.get(id) {
            Some(slot) => self.sorted(&slot.children),
            None => Vec::new(),
        }
    }

    fn sorted(&self, ids: &[NodeId]) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = ids
            .iter()
            .filter_map(|id| self.find_by_id(id.as_str()))
            .collect();
        sort::sort_siblings(&mut nodes);
        nodes
    }

    /// True when `ancestor` is `id` itself or lies on the path from `id` to its root.
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self
                .slots
                .get(current)
                .and_then(|slot| slot.parent.as_ref())
                .map(NodeId::as_str);
        }
        false
    }

    /// Replaces the node in place through `update`. Returns `false` and leaves the
    /// forest untouched when `id` is absent.
    pub fn update_by_id<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut Node),
    {
        match self.slots.get_mut(id) {
            Some(slot) => {
                update(&mut slot.node);
                trace!(id, "node updated");
                true
            }
            None => false,
        }
    }

    /// Removes `id` and its whole subtree. Returns the removed ids, parent first;
    /// empty when `id` is absent.
    pub fn remove_by_id(&mut self, id: &str) -> Vec<NodeId> {
        let Some(slot) = self.slots.get(id) else {
            return Vec::new();
        };

        match slot.parent.clone() {
            Some(parent) => {
                if let Some(parent_slot) = self.slots.get_mut(parent.as_str()) {
                    parent_slot.children.retain(|child| child.as_str() != id);
                }
            }
            None => self.roots.retain(|root| root.as_str() != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![NodeId::from(id)];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slots.remove(current.as_str()) {
                stack.extend(slot.children.into_iter().rev());
                removed.push(current);
            }
        }

        debug!(id, removed = removed.len(), "subtree removed");
        removed
    }

    /// Appends `node` to the children of the category `parent_id`.
    ///
    /// Fails with [`TreeError::InvalidParent`] when the parent is a document; the
    /// forest is unchanged on every error path.
    pub fn add_child(&mut self, parent_id: &str, node: Node) -> TreeResult<()> {
        let parent = self
            .slots
            .get(parent_id)
            .ok_or_else(|| TreeError::NodeNotFound(parent_id.into()))?;

        if parent.node.is_document() {
            return Err(TreeError::invalid_parent(parent.node.name()));
        }
        self.ensure_unique(node.id())?;

        let id = node.id().clone();
        let parent_key = parent.node.id().clone();
        self.slots.insert(
            id.clone(),
            Slot {
                node,
                parent: Some(parent_key),
                children: SmallVec::new(),
            },
        );
        if let Some(parent) = self.slots.get_mut(parent_id) {
            parent.children.push(id);
        }
        Ok(())
    }

    pub fn add_root(&mut self, node: Node) -> TreeResult<()> {
        self.ensure_unique(node.id())?;
        let id = node.id().clone();
        self.slots.insert(
            id.clone(),
            Slot {
                node,
                parent: None,
                children: SmallVec::new(),
            },
        );
        self.roots.push(id);
        Ok(())
    }

    fn ensure_unique(&self, id: &NodeId) -> TreeResult<()> {
        if self.slots.contains_key(id.as_str()) {
            return Err(TreeError::DuplicateId(id.as_str().into()));
        }
        Ok(())
    }

    /// Pre-order traversal in display order, descending only into categories for
    /// which `expanded` returns true.
    pub fn walk_with<F>(&self, expanded: F) -> Vec<TreeRow<'_>>
    where
        F: Fn(&NodeId) -> bool,
    {
        let mut rows = Vec::with_capacity(self.slots.len());
        let mut stack: Vec<(&Node, usize)> = self
            .sorted_roots()
            .into_iter()
            .rev()
            .map(|node| (node, 0))
            .collect();

        while let Some((node, depth)) = stack.pop() {
            let children = self.children_of(node.id().as_str()).unwrap_or_default();
            rows.push(TreeRow {
                node,
                depth,
                has_children: !children.is_empty(),
            });

            if node.is_category() && expanded(node.id()) {
                let sorted = self.sorted(children);
                stack.extend(sorted.into_iter().rev().map(|child| (child, depth + 1)));
            }
        }
        rows
    }

    /// Full pre-order traversal in display order.
    pub fn walk(&self) -> Vec<TreeRow<'_>> {
        self.walk_with(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Document, FilePath};

    fn doc(id: &str, name: &str) -> Node {
        Node::new_document(NodeId::from(id), name, Document::empty())
    }

    fn cat(id: &str, name: &str) -> Node {
        Node::category(NodeId::from(id), name)
    }

    fn sample() -> Forest {
        let mut forest = Forest::new();
        forest.add_root(doc("1", "Introduction")).unwrap();
        forest.add_root(cat("2", "EC2 Instances")).unwrap();
        forest.add_child("2", doc("2.1", "Overview")).unwrap();
        forest.add_child("2", cat("2.2", "Guides")).unwrap();
        forest.add_child("2.2", doc("2.2.1", "Deep")).unwrap();
        forest.add_root(doc("3", "S3 Buckets")).unwrap();
        forest
    }

    #[test]
    fn find_by_id_reaches_any_depth() {
        let forest = sample();
        assert_eq!(forest.find_by_id("2.2.1").unwrap().name(), "Deep");
        assert_eq!(forest.parent_of("2.2.1").unwrap().id().as_str(), "2.2");
        assert!(forest.find_by_id("missing").is_none());
    }

    #[test]
    fn remove_cascades_to_descendants() {
        let mut forest = sample();
        let removed = forest.remove_by_id("2");
        assert_eq!(removed.len(), 4);
        for id in ["2", "2.1", "2.2", "2.2.1"] {
            assert!(forest.find_by_id(id).is_none(), "{id} should be gone");
        }
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.sorted_roots().len(), 2);
    }

    #[test]
    fn remove_nested_node_detaches_from_parent() {
        let mut forest = sample();
        forest.remove_by_id("2.1");
        assert_eq!(forest.children_of("2").unwrap().len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut forest = sample();
        let before = forest.clone();
        assert!(forest.remove_by_id("nope").is_empty());
        assert_eq!(forest, before);
    }

    #[test]
    fn add_child_under_document_is_rejected_without_mutation() {
        let mut forest = sample();
        let before = forest.clone();
        let err = forest.add_child("1", doc("9", "Child")).unwrap_err();
        assert!(matches!(err, TreeError::InvalidParent { .. }));
        assert_eq!(forest, before);
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let mut forest = sample();
        let err = forest.add_child("404", doc("9", "Child")).unwrap_err();
        assert_eq!(err, TreeError::NodeNotFound("404".into()));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut forest = sample();
        assert!(matches!(
            forest.add_root(doc("2.1", "Clash")),
            Err(TreeError::DuplicateId(_))
        ));
        assert!(matches!(
            forest.add_child("2", doc("3", "Clash")),
            Err(TreeError::DuplicateId(_))
        ));
    }

    #[test]
    fn update_by_id_changes_only_target() {
        let mut forest = sample();
        let path = FilePath::parse("/documents/x.md").unwrap();
        assert!(forest.update_by_id("2.1", |node| {
            node.set_name("Renamed");
            if let Some(doc) = node.document_mut() {
                *doc = Document::linked(path.clone());
            }
        }));
        let node = forest.find_by_id("2.1").unwrap();
        assert_eq!(node.name(), "Renamed");
        assert_eq!(node.document().unwrap().file_path(), Some(&path));
        assert_eq!(forest.find_by_id("1").unwrap().name(), "Introduction");

        let before = forest.clone();
        assert!(!forest.update_by_id("missing", |node| node.set_name("x")));
        assert_eq!(forest, before);
    }

    #[test]
    fn walk_is_sorted_pre_order() {
        let forest = sample();
        let names: Vec<(&str, usize)> = forest
            .walk()
            .iter()
            .map(|row| (row.node.name(), row.depth))
            .collect();
        assert_eq!(
            names,
            vec![
                ("EC2 Instances", 0),
                ("Guides", 1),
                ("Deep", 2),
                ("Overview", 1),
                ("Introduction", 0),
                ("S3 Buckets", 0),
            ]
        );
    }

    #[test]
    fn walk_with_skips_collapsed_categories() {
        let forest = sample();
        let rows = forest.walk_with(|id| id.as_str() != "2");
        let names: Vec<&str> = rows.iter().map(|row| row.node.name()).collect();
        assert_eq!(names, vec!["EC2 Instances", "Introduction", "S3 Buckets"]);
        assert!(rows[0].has_children);
    }

    #[test]
    fn ancestor_check_walks_up() {
        let forest = sample();
        assert!(forest.is_ancestor_or_self("2", "2.2.1"));
        assert!(forest.is_ancestor_or_self("2.2.1", "2.2.1"));
        assert!(!forest.is_ancestor_or_self("1", "2.2.1"));
    }
}
