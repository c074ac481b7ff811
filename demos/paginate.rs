use pageflow::reflow::{Immediate, Reflower};
use pageflow::{Document, NodeId, NodeKind, PageMeasure, ReflowOptions, Tree};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// A fixed-width terminal page: every block starts on a new line and text is wrapped
/// greedily at `width` characters
struct Terminal {
    width: usize,
    lines: usize,
}

impl Terminal {
    fn wrapped(&self, text: &str) -> usize {
        let mut lines = 0;
        let mut used = 0;
        for word in text.split_whitespace() {
            let len = word.chars().count();
            if used == 0 {
                lines += 1;
                used = len;
            } else if used + 1 + len > self.width {
                lines += 1;
                used = len;
            } else {
                used += 1 + len;
            }
        }
        lines
    }

    fn height(&self, tree: &Tree, node: NodeId) -> usize {
        match tree.kind(node) {
            NodeKind::Text(text) => self.wrapped(text),
            NodeKind::Leaf { content, .. } => self.wrapped(content).max(1),
            NodeKind::Container { children, .. } => {
                let text: String = children
                    .iter()
                    .filter_map(|&child| tree.text_of(child))
                    .collect();
                let blocks: usize = children
                    .iter()
                    .filter(|&&child| !tree.is_text(child))
                    .map(|&child| self.height(tree, child))
                    .sum();
                self.wrapped(&text) + blocks
            }
        }
    }

    fn render(&self, tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match tree.kind(node) {
            NodeKind::Text(text) => {
                let mut line = String::new();
                for word in text.split_whitespace() {
                    if !line.is_empty() && line.len() + 1 + word.len() > self.width {
                        out.push_str(&format!("{indent}{line}\n"));
                        line.clear();
                    }
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(word);
                }
                if !line.is_empty() {
                    out.push_str(&format!("{indent}{line}\n"));
                }
            }
            NodeKind::Leaf { name, content, .. } => {
                out.push_str(&format!("{indent}[{name}] {content}\n"));
            }
            NodeKind::Container { children, .. } => {
                for &child in children {
                    self.render(tree, child, depth + 1, out);
                }
            }
        }
    }
}

impl PageMeasure for Terminal {
    fn overflows(&self, tree: &Tree, page: NodeId) -> bool {
        self.height(tree, page) > self.lines
    }
}

fn paragraph(tree: &mut Tree, name: &str, text: String) -> NodeId {
    let node = tree.container(name);
    let run = tree.text(text);
    tree.append(node, run).expect("fresh container");
    node
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut doc = Document::new();
    let page = doc.add_page().expect("can add a page");

    let title = doc.tree.leaf("h1", "Lorem Ipsum");
    doc.tree.append(page, title).expect("page is a container");
    for words in [40, 120, 25] {
        let p = paragraph(&mut doc.tree, "p", lipsum::lipsum(words));
        doc.tree.append(page, p).expect("page is a container");
    }
    let list = doc.tree.container("ul");
    for words in [8, 14, 6, 20] {
        let item = paragraph(&mut doc.tree, "li", lipsum::lipsum_words(words));
        doc.tree.append(list, item).expect("list is a container");
    }
    doc.tree.append(page, list).expect("page is a container");

    let reflower = Reflower::new(ReflowOptions::default().with_batch_budget(16));
    let mut frames = 0;
    let mut scheduler = |_: &Tree| frames += 1;

    for lines in [12, 30] {
        let terminal = Terminal { width: 48, lines };
        let report = doc
            .repaginate(&reflower, &terminal, &mut scheduler)
            .expect("can repaginate");
        println!(
            "=== {lines} lines per page: {} pages (+{} / -{}) ===",
            doc.page_count(),
            report.pages_added,
            report.pages_removed
        );
        for (index, &page) in doc.pages().iter().enumerate() {
            let mut out = String::new();
            terminal.render(&doc.tree, page, 0, &mut out);
            println!("--- page {} ({} lines) ---", index + 1, terminal.height(&doc.tree, page));
            print!("{out}");
        }
        for index in report.overflowing {
            println!("page {} still overflows", index + 1);
        }
    }

    // a single reflow call, without the document driver
    let mut tree = Tree::new();
    let first = tree.container("page");
    let second = tree.container("page");
    let p = paragraph(&mut tree, "p", lipsum::lipsum(30));
    tree.append(first, p).expect("page is a container");
    let terminal = Terminal { width: 48, lines: 3 };
    let report = reflower
        .reflow_forward(
            &mut tree,
            first,
            second,
            |tree: &Tree| terminal.overflows(tree, first),
            None,
            &mut Immediate,
        )
        .expect("can reflow");
    println!("=== single reflow: {report:?}, {frames} frames yielded earlier ===");
}
