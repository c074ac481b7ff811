//! Moving content between adjacent pages.
//!
//! Reflow never measures anything itself. The host supplies oracles that answer
//! "does this page still overflow?" and "is this page full?", and the engine moves
//! content around the [Tree](crate::Tree) until the answers change:
//!
//! - [Reflower::reflow_forward] pushes trailing content of an overflowing page onto
//!   the front of the next page, splitting text runs at word boundaries (or inside a
//!   word that cannot fit on its own) and cloning structural containers so that a
//!   paragraph or list can continue on the next page
//! - [Reflower::reflow_backward] pulls leading content of the next page back while
//!   there is room, merging split containers with their originals again
//!
//! Repaginating a whole document is a matter of calling these across successive
//! page pairs; [Document::repaginate](crate::Document::repaginate) does exactly that.
//!
//! # Example
//!
//! ```
//! use pageflow::Tree;
//! use pageflow::reflow::{Immediate, ReflowOutcome, Reflower};
//!
//! let mut tree = Tree::new();
//! let page = tree.container("page");
//! let next = tree.container("page");
//! let para = tree.container("p");
//! let text = tree.text("The quick brown fox");
//! tree.append(para, text).unwrap();
//! tree.append(page, para).unwrap();
//!
//! // this page has room for two words
//! let words = |tree: &Tree| tree.text_content(page).split_whitespace().count();
//! let reflower = Reflower::default();
//! let report = reflower
//!     .reflow_forward(&mut tree, page, next, |t: &Tree| words(t) > 2, None, &mut Immediate)
//!     .unwrap();
//!
//! assert_eq!(report.outcome, ReflowOutcome::Complete);
//! assert_eq!(tree.text_content(page), "The quick ");
//! assert_eq!(tree.text_content(next), "brown fox");
//! ```

mod backward;
mod forward;
mod scheduler;
mod split;

pub use scheduler::*;

use crate::tree::{NodeId, Tree};
use crate::{PaginateError, ReflowOptions};
use forward::{ForwardPass, Step};
use std::cell::Cell;
use tracing::{debug, warn};

/// How a reflow call ended
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReflowOutcome {
    /// The oracle is satisfied (or there was nothing left to move)
    #[default]
    Complete,
    /// Stopped early because the only thing left on the page cannot move without
    /// leaving the page empty. The page may still overflow.
    SoleChild,
    /// A whole batch went by without the page shrinking: the next text cut needs
    /// more tentative writes than a batch allows. The page may still overflow; a
    /// larger [ReflowOptions::batch_budget] lets the call finish.
    Stalled,
    /// Another reflow on the same [Reflower] was already in progress, so nothing
    /// was done
    Busy,
}

/// What a reflow call did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReflowReport {
    pub outcome: ReflowOutcome,
    /// Committed moves (whole nodes moved, text runs split)
    pub moves: usize,
    /// Number of times the host's oracle was consulted
    pub oracle_queries: usize,
    /// Number of times control was handed to the frame scheduler
    pub yields: usize,
}

impl ReflowReport {
    fn busy() -> ReflowReport {
        ReflowReport {
            outcome: ReflowOutcome::Busy,
            ..ReflowReport::default()
        }
    }
}

/// Runs forward and backward reflow for one document. A reflower refuses to start a
/// reflow while one is already running on it (e.g. when called again from inside its
/// own frame scheduler); independent reflowers never block each other.
#[derive(Debug, Default)]
pub struct Reflower {
    options: ReflowOptions,
    in_progress: Cell<bool>,
}

impl Reflower {
    pub fn new(options: ReflowOptions) -> Reflower {
        Reflower {
            options,
            in_progress: Cell::new(false),
        }
    }

    pub fn options(&self) -> &ReflowOptions {
        &self.options
    }

    /// Whether a reflow is currently running on this reflower
    pub fn is_busy(&self) -> bool {
        self.in_progress.get()
    }

    fn check_pages(
        &self,
        tree: &Tree,
        first: NodeId,
        second: NodeId,
    ) -> Result<(), PaginateError> {
        if first == second {
            return Err(PaginateError::SamePage(first));
        }
        for page in [first, second] {
            if !tree.is_container(page) {
                return Err(PaginateError::NotAContainer(page));
            }
        }
        Ok(())
    }

    /// Moves trailing content of `source` to the front of `target` until `overflow`
    /// returns `false`.
    ///
    /// Text runs are cut at the last word boundary that lets the page fit; a word
    /// that does not fit on an otherwise empty page is cut between characters.
    /// Containers are split by creating (or reusing) a continuation on `target` that
    /// shares the original's lineage tag. Leaves, empty containers, element names
    /// listed in [ReflowOptions::atomic_elements] and nodes flagged by `atomic` move
    /// as a whole. `source` always keeps at least one child: when only its first
    /// child is left and that cannot be split further the call stops with
    /// [ReflowOutcome::SoleChild].
    ///
    /// After every [ReflowOptions::batch_budget] tree writes (committed moves and
    /// tentative text cuts) the call hands control to `scheduler` and then resumes. If
    /// a batch made no progress at all the call gives up with
    /// [ReflowOutcome::Stalled]. When a candidate is left partly on the page, the
    /// oracle is asked once more; if it still reports an overflow the oracle is
    /// inconsistent and the call fails with [PaginateError::NonEmptyRemoval].
    pub fn reflow_forward<O>(
        &self,
        tree: &mut Tree,
        source: NodeId,
        target: NodeId,
        mut overflow: O,
        atomic: Option<&dyn Fn(&Tree, NodeId) -> bool>,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<ReflowReport, PaginateError>
    where
        O: FnMut(&Tree) -> bool,
    {
        let Some(_guard) = ReentrancyGuard::acquire(&self.in_progress) else {
            debug!(
                source = source.index(),
                "reflow already in progress; ignoring forward request"
            );
            return Ok(ReflowReport::busy());
        };
        self.check_pages(tree, source, target)?;

        let mut pass = ForwardPass::new(&self.options, &mut overflow, atomic);
        let mut yields = 0;
        let mut window = Progress::capture(tree, source);

        let outcome = loop {
            pass.start_window();
            match pass.run(tree, source, target, false)? {
                Step::Settled | Step::Drained => break ReflowOutcome::Complete,
                Step::SoleChild => {
                    debug!(
                        source = source.index(),
                        "only the first child is left and it cannot move; page keeps overflowing"
                    );
                    break ReflowOutcome::SoleChild;
                }
                Step::Exhausted => {
                    let now = Progress::capture(tree, source);
                    if now == window {
                        warn!(
                            source = source.index(),
                            budget = self.options.budget(),
                            "reflow made no progress within a batch; the next cut cannot fit in it"
                        );
                        break ReflowOutcome::Stalled;
                    }
                    window = now;
                    yields += 1;
                    debug!(source = source.index(), moves = pass.moves, "yielding to host");
                    scheduler.next_frame(tree);
                }
            }
        };
        tree.coalesce_text(target);

        Ok(ReflowReport {
            outcome,
            moves: pass.moves,
            oracle_queries: pass.queries,
            yields,
        })
    }

    /// Pulls leading content of `next` back to the end of `current` until `full`
    /// returns `true` or `next` is empty.
    ///
    /// When the first node of `next` is the continuation of a container on `current`
    /// (they share a lineage tag), its content is merged into the original one node
    /// at a time and the continuation disappears once emptied. Adjacent text runs are
    /// coalesced as they are merged. The check happens before each move, so the last
    /// move may overshoot; run [Reflower::reflow_forward] afterwards to settle.
    pub fn reflow_backward<C>(
        &self,
        tree: &mut Tree,
        current: NodeId,
        next: NodeId,
        mut full: C,
    ) -> Result<ReflowReport, PaginateError>
    where
        C: FnMut(&Tree) -> bool,
    {
        let Some(_guard) = ReentrancyGuard::acquire(&self.in_progress) else {
            debug!(
                current = current.index(),
                "reflow already in progress; ignoring backward request"
            );
            return Ok(ReflowReport::busy());
        };
        self.check_pages(tree, current, next)?;

        let mut report = ReflowReport::default();
        while tree.first_child(next).is_some() {
            report.oracle_queries += 1;
            if full(tree) {
                break;
            }
            backward::pull_first(tree, current, next)?;
            report.moves += 1;
        }
        Ok(report)
    }
}
