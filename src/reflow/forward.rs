use super::split::{char_breaks, largest_fitting, max_attempts, tokenize, word_breaks};
use crate::lineage::{continuation_shell, ensure_tag, find_continuation};
use crate::tree::{NodeId, Tree};
use crate::{PaginateError, ReflowOptions};
use tracing::trace;

/// Why a (possibly nested) forward pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The overflow oracle reported that the page fits
    Settled,
    /// The source ran out of children
    Drained,
    /// Moving anything more would leave the page without content
    SoleChild,
    /// The batch budget is spent
    Exhausted,
}

/// What happened to the text run at the end of a source
enum TextMove {
    /// A prefix stayed behind and the page now fits
    Split,
    /// The whole run moved to the target
    Whole,
    /// Nothing could move without emptying the page
    Refused,
    /// The cut needs more tentative writes than the batch has left
    Deferred,
}

/// One forward reflow, possibly spread across several batches
pub(crate) struct ForwardPass<'a> {
    options: &'a ReflowOptions,
    overflow: &'a mut dyn FnMut(&Tree) -> bool,
    atomic: Option<&'a dyn Fn(&Tree, NodeId) -> bool>,
    window: usize,
    /// The oracle has said "fits" since the last committed move
    verified: bool,
    pub moves: usize,
    pub queries: usize,
}

impl<'a> ForwardPass<'a> {
    pub(crate) fn new(
        options: &'a ReflowOptions,
        overflow: &'a mut dyn FnMut(&Tree) -> bool,
        atomic: Option<&'a dyn Fn(&Tree, NodeId) -> bool>,
    ) -> ForwardPass<'a> {
        ForwardPass {
            options,
            overflow,
            atomic,
            window: 0,
            verified: false,
            moves: 0,
            queries: 0,
        }
    }

    /// Starts a fresh batch
    pub(crate) fn start_window(&mut self) {
        self.window = 0;
    }

    fn overflows(&mut self, tree: &Tree) -> bool {
        self.queries += 1;
        (self.overflow)(tree)
    }

    fn record_move(&mut self) {
        self.moves += 1;
        self.window += 1;
        self.verified = false;
    }

    /// A candidate that keeps content on the page is only legal once the page fits
    fn verify(&mut self, tree: &Tree, candidate: NodeId) -> Result<Step, PaginateError> {
        if !self.verified && self.overflows(tree) {
            return Err(PaginateError::NonEmptyRemoval {
                node: candidate,
                name: tree.name(candidate).unwrap_or("#text").to_string(),
                children: tree.child_count(candidate),
                text: tree.text_content(candidate),
            });
        }
        self.verified = true;
        Ok(Step::Settled)
    }

    fn is_atomic(&self, tree: &Tree, node: NodeId) -> bool {
        tree.is_empty(node)
            || !tree.is_container(node)
            || tree
                .name(node)
                .is_some_and(|name| self.options.is_atomic_element(name))
            || self.atomic.is_some_and(|atomic| atomic(tree, node))
    }

    /// Moves trailing content of `source` to the front of `target` until the overflow
    /// oracle is satisfied. `may_empty` is set when something outside `source` keeps
    /// the page non-empty, so `source` itself may be drained completely.
    pub(crate) fn run(
        &mut self,
        tree: &mut Tree,
        source: NodeId,
        target: NodeId,
        may_empty: bool,
    ) -> Result<Step, PaginateError> {
        loop {
            let Some(candidate) = tree.last_child(source) else {
                return Ok(Step::Drained);
            };
            if !self.overflows(tree) {
                self.verified = true;
                return Ok(Step::Settled);
            }
            if self.window >= self.options.budget() {
                return Ok(Step::Exhausted);
            }

            let may_empty = may_empty || tree.child_count(source) > 1;

            if tree.is_text(candidate) {
                match self.move_text(tree, candidate, target, may_empty)? {
                    TextMove::Split => return self.verify(tree, candidate),
                    TextMove::Whole => continue,
                    TextMove::Refused => return Ok(Step::SoleChild),
                    TextMove::Deferred => return Ok(Step::Exhausted),
                }
            }

            if self.is_atomic(tree, candidate) {
                if !may_empty {
                    return Ok(Step::SoleChild);
                }
                if tree.is_empty(candidate)
                    && find_continuation(tree, target, tree.lineage(candidate)).is_some()
                {
                    // an empty shell whose continuation already exists holds nothing to move
                    tree.recycle(candidate);
                } else {
                    tree.prepend(target, candidate)?;
                    trace!(node = candidate.index(), name = ?tree.name(candidate), "moved whole");
                }
                self.record_move();
                continue;
            }

            let tag = ensure_tag(tree, candidate, self.options.tag_length)?;
            let clone = match find_continuation(tree, target, Some(&tag)) {
                Some(clone) => clone,
                None => {
                    let shell = continuation_shell(tree, candidate)?;
                    tree.prepend(target, shell)?;
                    trace!(node = candidate.index(), tag = %tag, "created continuation");
                    shell
                }
            };

            let step = self.run(tree, candidate, clone, may_empty)?;
            tree.coalesce_text(clone);
            if tree.is_empty(clone) {
                tree.recycle(clone);
            }

            if tree.is_empty(candidate) {
                tree.recycle(candidate);
                match step {
                    Step::Settled | Step::Drained => continue,
                    Step::SoleChild | Step::Exhausted => return Ok(step),
                }
            }

            match step {
                Step::Settled | Step::Drained => return self.verify(tree, candidate),
                Step::SoleChild | Step::Exhausted => return Ok(step),
            }
        }
    }

    /// Splits the text run `run` so that as much of it as possible stays on the page,
    /// moving the rest into a new run at the front of `target`. Candidate cuts are
    /// tried by binary search, tentatively applying each one before asking the
    /// oracle. Every tentative write counts against the batch, and a cut whose worst
    /// case does not fit in what is left of the batch waits for the next one.
    fn move_text(
        &mut self,
        tree: &mut Tree,
        run: NodeId,
        target: NodeId,
        may_empty: bool,
    ) -> Result<TextMove, PaginateError> {
        let full = tree.text_of(run).unwrap_or_default().to_string();
        let tokens = tokenize(&full);
        let words = word_breaks(&tokens);
        let chars = if may_empty {
            Vec::new()
        } else {
            char_breaks(&full, &tokens)
        };

        let needed = max_attempts(words.len()) + max_attempts(chars.len()) + 1;
        if self.window + needed > self.options.budget() {
            trace!(node = run.index(), needed, window = self.window, "deferring text cut");
            return Ok(TextMove::Deferred);
        }

        let remainder = tree.text(String::new());
        tree.prepend(target, remainder)?;

        let mut chosen = self.try_cuts(tree, run, remainder, &full, &words);
        if chosen.is_none() && !chars.is_empty() {
            // the first word alone is too much for the page: cut inside it
            chosen = self.try_cuts(tree, run, remainder, &full, &chars);
        }

        match chosen {
            Some(cut) => {
                tree.set_text(run, &full[..cut]);
                tree.set_text(remainder, &full[cut..]);
                self.record_move();
                trace!(node = run.index(), cut, "split text run");
                Ok(TextMove::Split)
            }
            None => {
                tree.recycle(remainder);
                tree.set_text(run, full);
                if !may_empty {
                    return Ok(TextMove::Refused);
                }
                tree.prepend(target, run)?;
                self.record_move();
                trace!(node = run.index(), "moved whole text run");
                Ok(TextMove::Whole)
            }
        }
    }

    /// Tentatively applies each cut under test (prefix on `run`, rest on `remainder`) and
    /// returns the largest one under which the page fits
    fn try_cuts(
        &mut self,
        tree: &mut Tree,
        run: NodeId,
        remainder: NodeId,
        full: &str,
        cuts: &[usize],
    ) -> Option<usize> {
        largest_fitting(cuts, |cut| {
            tree.set_text(run, &full[..cut]);
            tree.set_text(remainder, &full[cut..]);
            self.window += 1;
            !self.overflows(tree)
        })
    }
}
