//! Lineage tags link a structural node on one page to its continuation on the next.
//!
//! When a container has to be split across a page boundary, reflow gives it a tag (if
//! it does not already carry one) and creates an empty clone with the same name and
//! tag on the following page. Merging content back looks the clone up by that tag.

use crate::tree::{NodeId, NodeKind, Tree};
use crate::PaginateError;
use derive_more::{Deref, Display, From};
use uuid::Uuid;

/// Opaque token shared between a node and its continuation clone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From)]
pub struct LineageTag(String);

impl LineageTag {
    /// Generates a fresh lowercase alphanumeric token of (at most) `len` characters.
    /// Collisions are unlikely but not impossible; [ensure_tag] re-rolls on a clash
    /// with a sibling.
    pub fn generate(len: usize) -> LineageTag {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(len.max(1));
        LineageTag(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineageTag {
    fn from(tag: &str) -> Self {
        LineageTag(tag.to_string())
    }
}

/// Finds the direct child of `container` whose lineage tag equals `tag`. Returns
/// [None] when there is no tag, the tag is empty, or no child carries it.
pub fn find_continuation(
    tree: &Tree,
    container: NodeId,
    tag: Option<&LineageTag>,
) -> Option<NodeId> {
    let tag = tag.filter(|tag| !tag.is_empty())?;
    tree.children(container)
        .iter()
        .copied()
        .find(|&child| tree.lineage(child) == Some(tag))
}

/// Returns the lineage tag of `node`, generating and assigning a fresh one of
/// `len` characters if it has none. A freshly generated tag never matches the tag
/// of one of `node`'s current siblings.
pub fn ensure_tag(
    tree: &mut Tree,
    node: NodeId,
    len: usize,
) -> Result<LineageTag, PaginateError> {
    if tree.is_text(node) {
        return Err(PaginateError::NotTaggable(node));
    }
    if let Some(tag) = tree.lineage(node) {
        return Ok(tag.clone());
    }

    let siblings: Vec<NodeId> = match tree.parent(node) {
        Some(parent) => tree
            .children(parent)
            .iter()
            .copied()
            .filter(|&sibling| sibling != node)
            .collect(),
        None => Vec::new(),
    };

    let tag = loop {
        let tag = LineageTag::generate(len);
        if !siblings
            .iter()
            .any(|&sibling| tree.lineage(sibling) == Some(&tag))
        {
            break tag;
        }
    };

    tree.assign_lineage(node, tag.clone())?;
    Ok(tag)
}

/// Allocates an empty, detached container with the same name and lineage tag as
/// `source`. Leaves and text runs have no structural shell to clone.
pub(crate) fn continuation_shell(
    tree: &mut Tree,
    source: NodeId,
) -> Result<NodeId, PaginateError> {
    let (name, lineage) = match tree.kind(source) {
        NodeKind::Container { name, lineage, .. } => (name.clone(), lineage.clone()),
        _ => return Err(PaginateError::NotAContainer(source)),
    };

    let shell = tree.container(name);
    if let Some(tag) = lineage {
        tree.assign_lineage(shell, tag)?;
    }
    Ok(shell)
}
