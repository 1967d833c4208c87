//! Sibling ordering by display name.
//!
//! Collation is done in three passes, like the root locale: base letters with
//! accents and case folded away, then accents, then case (lowercase first).
//! Equal names fall back to the node id so the order is total.

use crate::node::Node;
use std::cmp::Ordering;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        // names equal up to case: lowercase sorts first
        .then_with(|| b.cmp(a))
}

pub fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    compare_names(a.name(), b.name()).then_with(|| a.id().cmp(b.id()))
}

/// Sorts a sibling group in display order.
pub fn sort_siblings(nodes: &mut [&Node]) {
    nodes.sort_by(|a, b| compare_nodes(a, b));
}
