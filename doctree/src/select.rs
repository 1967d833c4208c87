use crate::forest::Forest;
use crate::node::NodeId;

/// Picks the node a fresh session opens on.
///
/// The search is deliberately shallow: the first top-level document in display
/// order, else the first document directly under the first top-level node when
/// that node is a category, else the first top-level node of any kind.
pub fn initial_selection(forest: &Forest) -> Option<NodeId> {
    let roots = forest.sorted_roots();
    let first = roots.first()?;

    if let Some(doc) = roots.iter().find(|node| node.is_document()) {
        return Some(doc.id().clone());
    }

    if first.is_category()
        && let Some(doc) = forest
            .sorted_children(first.id().as_str())
            .into_iter()
            .find(|node| node.is_document())
    {
        return Some(doc.id().clone());
    }

    Some(first.id().clone())
}
