//! Helpers shared by the integration tests

#![allow(dead_code)]

use pageflow::{NodeId, NodeKind, PageMeasure, Tree};

/// Number of whitespace-separated words in the text runs and leaves under `node`.
/// Each run is counted on its own, so "four" and "five" in two different list items
/// are two words.
pub fn words(tree: &Tree, node: NodeId) -> usize {
    match tree.kind(node) {
        NodeKind::Text(text) => text.split_whitespace().count(),
        NodeKind::Leaf { content, .. } => content.split_whitespace().count(),
        NodeKind::Container { children, .. } => {
            children.iter().map(|&child| words(tree, child)).sum()
        }
    }
}

/// A container named `name` holding a single text run
pub fn block(tree: &mut Tree, name: &str, text: &str) -> NodeId {
    let node = tree.container(name);
    let run = tree.text(text);
    tree.append(node, run).unwrap();
    node
}

/// Two detached pages
pub fn pages(tree: &mut Tree) -> (NodeId, NodeId) {
    (tree.container("page"), tree.container("page"))
}

/// Text content of both pages, which must always add up to the original content
pub fn both(tree: &Tree, first: NodeId, second: NodeId) -> String {
    tree.text_content(first) + &tree.text_content(second)
}

/// Every container under `node` (inclusive) has children whose non-empty lineage
/// tags are pairwise distinct
pub fn lineage_is_unique(tree: &Tree, node: NodeId) -> bool {
    let mut seen = Vec::new();
    for &child in tree.children(node) {
        if let Some(tag) = tree.lineage(child).filter(|tag| !tag.is_empty()) {
            if seen.contains(&tag) {
                return false;
            }
            seen.push(tag);
        }
    }
    tree.children(node)
        .iter()
        .all(|&child| lineage_is_unique(tree, child))
}

/// A page holds at most `limit` words
pub struct WordLimit(pub usize);

impl PageMeasure for WordLimit {
    fn overflows(&self, tree: &Tree, page: NodeId) -> bool {
        words(tree, page) > self.0
    }
}
