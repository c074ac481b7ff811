use crate::reflow::{FrameScheduler, ReflowOutcome, Reflower};
use crate::tree::{NodeId, Tree};
use crate::PaginateError;
use tracing::debug;

/// Measurement of laid-out pages, supplied by the host. Implementations must only
/// read the tree: reflow calls them repeatedly while it moves content around.
pub trait PageMeasure {
    /// Whether the content of `page` currently exceeds the page's capacity
    fn overflows(&self, tree: &Tree, page: NodeId) -> bool;

    /// Whether `node` must never be split across pages, on top of the element names
    /// the [Reflower] already treats as atomic
    fn is_atomic(&self, _tree: &Tree, _node: NodeId) -> bool {
        false
    }
}

/// Summary of a [Document::repaginate] run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaginationReport {
    /// Pages created to receive overflowing content
    pub pages_added: usize,
    /// Pages removed after all of their content was pulled back
    pub pages_removed: usize,
    /// Indices of pages that still overflow (their content cannot be split further)
    pub overflowing: Vec<usize>,
    /// Set when the reflower was already busy and repagination stopped early
    pub interrupted: bool,
}

#[derive(Debug)]
/// A document is a sequence of pages, each a container holding a disjoint part of
/// the content. Pages are the children of a single root node in the document's
/// [Tree].
pub struct Document {
    pub tree: Tree,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Document {
        let mut tree = Tree::new();
        let root = tree.container("document");
        Document { tree, root }
    }

    /// The node whose children are the pages
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All pages, in order
    pub fn pages(&self) -> &[NodeId] {
        self.tree.children(self.root)
    }

    pub fn page_count(&self) -> usize {
        self.tree.child_count(self.root)
    }

    /// Add an empty page to the end of the document, returning its id
    pub fn add_page(&mut self) -> Result<NodeId, PaginateError> {
        let page = self.tree.container("page");
        self.tree.append(self.root, page)?;
        Ok(page)
    }

    /// Add an empty page right after `previous`. If `previous` is not a page of this
    /// document, the page will be added to the end of the document.
    pub fn insert_page_after(&mut self, previous: NodeId) -> Result<NodeId, PaginateError> {
        if self.index_of_page(previous).is_none() {
            return self.add_page();
        }
        let page = self.tree.container("page");
        self.tree.insert_after(previous, page)?;
        Ok(page)
    }

    /// Detach `page` (and everything on it) from the document
    pub fn remove_page(&mut self, page: NodeId) {
        if self.index_of_page(page).is_some() {
            self.tree.detach(page);
        }
    }

    /// Get the 0-based index of a page given its ID. Note that adding or removing
    /// pages _will_ invalidate the returned page index
    pub fn index_of_page(&self, page: NodeId) -> Option<usize> {
        self.pages().iter().position(|&p| p == page)
    }

    /// Get the page at the given index, or [None] if `index >= self.page_count()`
    pub fn page_at(&self, index: usize) -> Option<NodeId> {
        self.pages().get(index).copied()
    }

    /// Repaginates the whole document, front to back.
    ///
    /// An overflowing page has its tail pushed onto the next page (which is created if
    /// needed). A page with room pulls content back from the next page until it is
    /// full, and any overshoot is pushed back again. Pages emptied by pulling are
    /// removed and their nodes recycled. Content is never dropped: a page whose sole
    /// remaining content cannot fit is left overflowing and reported.
    pub fn repaginate(
        &mut self,
        reflower: &Reflower,
        measure: &dyn PageMeasure,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<PaginationReport, PaginateError> {
        let mut report = PaginationReport::default();
        let atomic = |tree: &Tree, node: NodeId| measure.is_atomic(tree, node);

        let mut index = 0;
        while let Some(page) = self.page_at(index) {
            if measure.overflows(&self.tree, page) {
                let (next, added) = match self.page_at(index + 1) {
                    Some(next) => (next, false),
                    None => (self.insert_page_after(page)?, true),
                };
                let forward = reflower.reflow_forward(
                    &mut self.tree,
                    page,
                    next,
                    |tree: &Tree| measure.overflows(tree, page),
                    Some(&atomic),
                    scheduler,
                )?;
                if added {
                    if self.tree.is_empty(next) {
                        // nothing could move; don't leave an empty page behind
                        self.tree.recycle(next);
                    } else {
                        debug!(after = index, "added page for overflow");
                        report.pages_added += 1;
                    }
                }
                if forward.outcome == ReflowOutcome::Busy {
                    report.interrupted = true;
                    break;
                }
            } else if let Some(next) = self.page_at(index + 1) {
                let backward =
                    reflower.reflow_backward(&mut self.tree, page, next, |tree: &Tree| {
                        measure.overflows(tree, page)
                    })?;
                if backward.outcome == ReflowOutcome::Busy {
                    report.interrupted = true;
                    break;
                }
                if backward.moves > 0 && measure.overflows(&self.tree, page) {
                    reflower.reflow_forward(
                        &mut self.tree,
                        page,
                        next,
                        |tree: &Tree| measure.overflows(tree, page),
                        Some(&atomic),
                        scheduler,
                    )?;
                }
                if self.tree.is_empty(next) {
                    debug!(index = index + 1, "removing emptied page");
                    self.tree.recycle(next);
                    report.pages_removed += 1;
                    // the page after it may have more to give
                    continue;
                }
            }
            index += 1;
        }

        report.overflowing = self
            .pages()
            .iter()
            .enumerate()
            .filter(|&(_, &page)| measure.overflows(&self.tree, page))
            .map(|(i, _)| i)
            .collect();
        Ok(report)
    }
}
