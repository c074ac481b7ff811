use crate::lineage::find_continuation;
use crate::tree::{NodeId, Tree};
use crate::PaginateError;
use tracing::trace;

/// Moves the first node of `next` to the end of `current`. When that node is the
/// continuation of a container at the end of `current`, its own first child is
/// merged into the original instead (recursively), and the continuation is dropped
/// once it has been emptied.
pub(crate) fn pull_first(
    tree: &mut Tree,
    current: NodeId,
    next: NodeId,
) -> Result<(), PaginateError> {
    let Some(elt) = tree.first_child(next) else {
        return Ok(());
    };

    let original = find_continuation(tree, current, tree.lineage(elt))
        .filter(|&original| tree.is_container(original) && tree.is_container(elt));

    match original {
        Some(original) if !tree.is_empty(elt) => {
            pull_first(tree, original, elt)?;
            if tree.is_empty(elt) {
                tree.recycle(elt);
                trace!(node = elt.index(), into = original.index(), "continuation consumed");
            }
        }
        Some(original) => {
            // nothing left to reabsorb, and the original already carries the tag
            tree.recycle(elt);
            trace!(node = elt.index(), into = original.index(), "dropped empty continuation");
        }
        None => {
            tree.append(current, elt)?;
            tree.coalesce_text(current);
            trace!(node = elt.index(), into = current.index(), "pulled back");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::ensure_tag;

    #[test]
    fn plain_nodes_are_appended() {
        let mut tree = Tree::new();
        let current = tree.container("page");
        let next = tree.container("page");
        let p = tree.container("p");
        let img = tree.leaf("img", "");
        tree.append(current, p).unwrap();
        tree.append(next, img).unwrap();

        pull_first(&mut tree, current, next).unwrap();
        assert_eq!(tree.children(current), &[p, img]);
        assert!(tree.is_empty(next));
    }

    #[test]
    fn continuations_merge_one_child_at_a_time() {
        let mut tree = Tree::new();
        let current = tree.container("page");
        let next = tree.container("page");
        let ul = tree.container("ul");
        let li1 = tree.leaf("li", "one ");
        tree.append(ul, li1).unwrap();
        tree.append(current, ul).unwrap();
        ensure_tag(&mut tree, ul, 8).unwrap();

        let ul2 = crate::lineage::continuation_shell(&mut tree, ul).unwrap();
        let li2 = tree.leaf("li", "two ");
        let li3 = tree.leaf("li", "three");
        tree.append_all(ul2, [li2, li3]).unwrap();
        tree.append(next, ul2).unwrap();

        pull_first(&mut tree, current, next).unwrap();
        assert_eq!(tree.children(ul), &[li1, li2]);
        assert_eq!(tree.children(next), &[ul2]);

        pull_first(&mut tree, current, next).unwrap();
        assert_eq!(tree.children(ul), &[li1, li2, li3]);
        assert!(tree.is_empty(next));
        assert_eq!(tree.parent(ul2), None);
    }

    #[test]
    fn merged_text_is_coalesced() {
        let mut tree = Tree::new();
        let current = tree.container("page");
        let next = tree.container("page");
        let a = tree.text("The quick ");
        let b = tree.text("brown fox");
        tree.append(current, a).unwrap();
        tree.append(next, b).unwrap();

        pull_first(&mut tree, current, next).unwrap();
        assert_eq!(tree.children(current), &[a]);
        assert_eq!(tree.text_of(a), Some("The quick brown fox"));
    }
}
