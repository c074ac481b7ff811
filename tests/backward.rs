mod common;

use common::*;
use pageflow::reflow::{Immediate, ReflowOutcome, Reflower};
use pageflow::{NodeId, NodeKind, Tree};

/// Structural rendering of a subtree: names, leaf contents and text, but no ids or
/// lineage tags
fn shape(tree: &Tree, node: NodeId) -> String {
    match tree.kind(node) {
        NodeKind::Text(text) => format!("{text:?}"),
        NodeKind::Leaf { name, content, .. } => format!("[{name}:{content}]"),
        NodeKind::Container { name, children, .. } => {
            let inner: Vec<String> = children.iter().map(|&c| shape(tree, c)).collect();
            format!("<{name}>{}</{name}>", inner.join(""))
        }
    }
}

fn sample(tree: &mut Tree) -> NodeId {
    let page = tree.container("page");
    let title = tree.leaf("h1", "Title words here");
    let intro = block(tree, "p", "Lorem ipsum dolor sit amet");
    let table = tree.container("table");
    let r1 = tree.leaf("tr", "r1 c1");
    let r2 = tree.leaf("tr", "r2 c2");
    tree.append_all(table, [r1, r2]).unwrap();
    let section = tree.container("section");
    let ul = tree.container("ul");
    let li1 = block(tree, "li", "alpha beta");
    let li2 = block(tree, "li", "gamma delta epsilon");
    tree.append_all(ul, [li1, li2]).unwrap();
    let outro = block(tree, "p", "final paragraph text");
    tree.append_all(section, [ul, outro]).unwrap();
    tree.append_all(page, [title, intro, table, section]).unwrap();
    page
}

#[test]
fn merge_restores_a_split_paragraph() {
    let mut tree = Tree::new();
    let (page, next) = pages(&mut tree);
    let div = block(&mut tree, "div", "The quick brown fox");
    tree.append(page, div).unwrap();
    let reflower = Reflower::default();

    reflower
        .reflow_forward(
            &mut tree,
            page,
            next,
            |t: &Tree| words(t, page) > 2,
            None,
            &mut Immediate,
        )
        .unwrap();
    assert_eq!(tree.text_content(next), "brown fox");

    let report = reflower
        .reflow_backward(&mut tree, page, next, |t: &Tree| words(t, page) >= 4)
        .unwrap();

    assert_eq!(report.outcome, ReflowOutcome::Complete);
    assert!(tree.is_empty(next));
    assert_eq!(tree.children(page), &[div]);
    assert_eq!(tree.child_count(div), 1);
    assert_eq!(tree.text_content(div), "The quick brown fox");
}

#[test]
fn stops_as_soon_as_the_page_is_full() {
    let mut tree = Tree::new();
    let (page, next) = pages(&mut tree);
    let kept = block(&mut tree, "p", "one");
    tree.append(page, kept).unwrap();
    let waiting: Vec<NodeId> = ["two", "three", "four"]
        .into_iter()
        .map(|word| tree.leaf("p", word))
        .collect();
    tree.append_all(next, waiting.iter().copied()).unwrap();

    let report = Reflower::default()
        .reflow_backward(&mut tree, page, next, |t: &Tree| words(t, page) >= 2)
        .unwrap();

    assert_eq!(report.moves, 1);
    assert_eq!(report.oracle_queries, 2);
    assert_eq!(tree.children(page), &[kept, waiting[0]]);
    assert_eq!(tree.children(next), &waiting[1..]);
}

#[test]
fn full_page_pulls_nothing() {
    let mut tree = Tree::new();
    let (page, next) = pages(&mut tree);
    let waiting = block(&mut tree, "p", "more");
    tree.append(next, waiting).unwrap();

    let report = Reflower::default()
        .reflow_backward(&mut tree, page, next, |_: &Tree| true)
        .unwrap();

    assert_eq!(report.moves, 0);
    assert!(tree.is_empty(page));
    assert_eq!(tree.children(next), &[waiting]);
}

#[test]
fn untagged_lookalikes_are_not_merged() {
    let mut tree = Tree::new();
    let (page, next) = pages(&mut tree);
    let first = block(&mut tree, "ul", "a");
    let second = block(&mut tree, "ul", "b");
    tree.append(page, first).unwrap();
    tree.append(next, second).unwrap();

    Reflower::default()
        .reflow_backward(&mut tree, page, next, |_: &Tree| false)
        .unwrap();

    assert_eq!(tree.children(page), &[first, second]);
    assert_eq!(tree.text_content(first), "a");
}

#[test]
fn forward_then_backward_restores_the_page() {
    let mut reference = Tree::new();
    let page = sample(&mut reference);
    let total = words(&reference, page);

    for limit in 0..=total {
        let mut tree = Tree::new();
        let page = sample(&mut tree);
        let next = tree.container("page");
        let before = shape(&tree, page);
        let reflower = Reflower::default();

        reflower
            .reflow_forward(
                &mut tree,
                page,
                next,
                |t: &Tree| words(t, page) > limit,
                None,
                &mut Immediate,
            )
            .unwrap();
        assert_eq!(words(&tree, page) + words(&tree, next), total);

        reflower
            .reflow_backward(&mut tree, page, next, |t: &Tree| words(t, page) >= total)
            .unwrap();

        assert!(tree.is_empty(next), "limit {limit}: {}", shape(&tree, next));
        assert_eq!(shape(&tree, page), before, "limit {limit}");
        assert!(lineage_is_unique(&tree, page));
    }
}

#[test]
fn partial_merge_keeps_both_pages_consistent() {
    let mut reference = Tree::new();
    let page = sample(&mut reference);
    let total = words(&reference, page);

    for limit in 1..total {
        for room in limit..=total {
            let mut tree = Tree::new();
            let page = sample(&mut tree);
            let next = tree.container("page");
            let original = tree.text_content(page);
            let reflower = Reflower::default();

            reflower
                .reflow_forward(
                    &mut tree,
                    page,
                    next,
                    |t: &Tree| words(t, page) > limit,
                    None,
                    &mut Immediate,
                )
                .unwrap();
            reflower
                .reflow_backward(&mut tree, page, next, |t: &Tree| words(t, page) >= room)
                .unwrap();

            assert_eq!(both(&tree, page, next), original, "limit {limit}, room {room}");
            assert!(lineage_is_unique(&tree, page));
            assert!(lineage_is_unique(&tree, next));
        }
    }
}

#[test]
fn busy_reflower_ignores_backward_requests() {
    let reflower = Reflower::new(pageflow::ReflowOptions::default().with_batch_budget(1));

    let mut other = Tree::new();
    let (a, b) = pages(&mut other);
    let waiting = other.leaf("p", "waiting");
    other.append(b, waiting).unwrap();

    let mut tree = Tree::new();
    let (page, next) = pages(&mut tree);
    for word in ["one", "two", "three"] {
        let leaf = tree.leaf("p", word);
        tree.append(page, leaf).unwrap();
    }

    let mut nested = Vec::new();
    let mut scheduler = |_: &Tree| {
        let report = reflower
            .reflow_backward(&mut other, a, b, |_: &Tree| false)
            .unwrap();
        nested.push(report);
    };
    reflower
        .reflow_forward(
            &mut tree,
            page,
            next,
            |t: &Tree| words(t, page) > 1,
            None,
            &mut scheduler,
        )
        .unwrap();

    assert!(!nested.is_empty());
    assert!(nested
        .iter()
        .all(|report| report.outcome == ReflowOutcome::Busy && report.moves == 0));
    assert_eq!(other.children(b), &[waiting]);

    // once the outer call is done the same reflower works again
    let report = reflower
        .reflow_backward(&mut other, a, b, |_: &Tree| false)
        .unwrap();
    assert_eq!(report.outcome, ReflowOutcome::Complete);
    assert_eq!(other.children(a), &[waiting]);
}
