//! Cooperative scheduling for long reflows.
//!
//! A single forward reflow can need one move per word of overflow. Work is split into
//! windows of [ReflowOptions::batch_budget](crate::ReflowOptions::batch_budget) moves;
//! between windows the host gets its turn through a [FrameScheduler]. All reflow state
//! lives in the tree, so resuming after a yield is simply starting over on the
//! partially reflowed pages.

use crate::tree::{NodeId, Tree};
use std::cell::Cell;

/// Hands control back to the embedding runtime between batches of reflow work
pub trait FrameScheduler {
    /// Called after a batch has made progress and before the next one starts. The
    /// tree can be inspected (e.g. to render the intermediate state) but not changed.
    fn next_frame(&mut self, tree: &Tree);
}

impl<F> FrameScheduler for F
where
    F: FnMut(&Tree),
{
    fn next_frame(&mut self, tree: &Tree) {
        self(tree)
    }
}

/// A scheduler that never gives control away: batches run back to back
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl FrameScheduler for Immediate {
    fn next_frame(&mut self, _tree: &Tree) {}
}

/// Holds a reflower's "in progress" flag for the duration of one call
pub(crate) struct ReentrancyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReentrancyGuard<'a> {
    /// Raises the flag, or returns [None] if it is already raised
    pub(crate) fn acquire(flag: &'a Cell<bool>) -> Option<ReentrancyGuard<'a>> {
        if flag.replace(true) {
            None
        } else {
            Some(ReentrancyGuard { flag })
        }
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Snapshot of how much a page holds. Every committed move shrinks at least one of
/// these, so two equal snapshots a batch apart mean the batch achieved nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Progress {
    children: usize,
    nodes: usize,
    text_len: usize,
}

impl Progress {
    pub(crate) fn capture(tree: &Tree, page: NodeId) -> Progress {
        Progress {
            children: tree.child_count(page),
            nodes: tree.subtree_size(page),
            text_len: tree.text_content(page).len(),
        }
    }
}
