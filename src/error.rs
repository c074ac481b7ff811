use crate::tree::NodeId;
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginateError {
    #[error("node #{} is not a container", .0.index())]
    /// A child operation was attempted on a leaf or a text run
    NotAContainer(NodeId),

    #[error("node #{} is a text run and cannot carry a lineage tag", .0.index())]
    /// Lineage tags only live on containers and leaves
    NotTaggable(NodeId),

    #[error("cannot move node #{} into its own subtree (under #{})", .node.index(), .parent.index())]
    /// Moving `node` under `parent` would detach it from the tree entirely
    WouldCycle { node: NodeId, parent: NodeId },

    #[error("node #{} has no parent", .0.index())]
    /// A sibling-relative operation was attempted on a node that is not attached
    Detached(NodeId),

    #[error("source and target page are the same node (#{})", .0.index())]
    /// Reflow needs two distinct pages
    SamePage(NodeId),

    #[error(
        "non-empty <{name}> (node #{}, {children} children, text {text:?}) left on a page that still overflows",
        .node.index()
    )]
    /// A node kept part of its content on the page, yet the overflow oracle still
    /// reports an overflow right after the move that should have settled it. The
    /// oracle contradicted itself and the pages must not be trusted after this.
    NonEmptyRemoval {
        node: NodeId,
        name: String,
        children: usize,
        text: String,
    },
}
