//! The node tree that reflow mutates.
//!
//! A [Tree] owns every node in an arena. Pages, structural containers, leaves and text
//! runs all live side by side and refer to each other through [NodeId]s, which stay
//! valid for as long as the node is in use. Detaching a node does not free it; it simply
//! stops being reachable from its old parent until it is appended somewhere else.
//!
//! Nodes that reflow throws away (emptied containers, consumed continuations, text
//! runs merged into a neighbour, emptied pages removed by
//! [Document::repaginate](crate::Document::repaginate)) are recycled: their slots are
//! handed out again by later allocations, so the arena does not grow when the same
//! content is reflowed over and over. Ids of recycled nodes must not be used again.

use crate::lineage::LineageTag;
use crate::PaginateError;
use id_arena::{Arena, Id};

/// Handle to a node stored in a [Tree]
pub type NodeId = Id<Node>;

/// What a node is, along with the data specific to that kind
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// An ordered sequence of children, exclusively owned by this node
    Container {
        name: String,
        lineage: Option<LineageTag>,
        children: Vec<NodeId>,
    },
    /// Opaque atomic content (an image, a table row, ...) that is never split
    Leaf {
        name: String,
        lineage: Option<LineageTag>,
        content: String,
    },
    /// A run of characters
    Text(String),
}

/// A slot in a [Tree]. Nodes are only reachable through their [NodeId] and the
/// [Tree] accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Default)]
/// Arena-backed storage for every node of a document
pub struct Tree {
    nodes: Arena<Node>,
    free: Vec<NodeId>,
}

impl Tree {
    pub fn new() -> Tree {
        Tree::default()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node { parent: None, kind };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => self.nodes.alloc(node),
        }
    }

    /// Number of slots the arena has handed out so far. Recycled slots are reused
    /// before the arena grows, so this only increases when the tree holds more nodes
    /// than ever before.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    /// Detaches `id` and returns it, with its whole subtree, to the pool of free
    /// slots
    pub(crate) fn recycle(&mut self, id: NodeId) {
        self.detach(id);
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            if let NodeKind::Container { children, .. } = &mut self.nodes[node].kind {
                pending.append(children);
            }
            self.nodes[node] = Node {
                parent: None,
                kind: NodeKind::Text(String::new()),
            };
            self.free.push(node);
        }
    }

    /// Allocate a detached, empty container named `name` (`"div"`, `"p"`, `"table"` ...)
    pub fn container<S: Into<String>>(&mut self, name: S) -> NodeId {
        self.alloc(NodeKind::Container {
            name: name.into(),
            lineage: None,
            children: Vec::new(),
        })
    }

    /// Allocate a detached leaf. `content` is opaque to reflow, but is reported by
    /// [Tree::text_content] so that hosts can account for it.
    pub fn leaf<S: Into<String>, C: Into<String>>(&mut self, name: S, content: C) -> NodeId {
        self.alloc(NodeKind::Leaf {
            name: name.into(),
            lineage: None,
            content: content.into(),
        })
    }

    /// Allocate a detached text run
    pub fn text<S: Into<String>>(&mut self, text: S) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Container { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Text(_))
    }

    /// Element name of a container or leaf; [None] for text runs
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Container { name, .. } | NodeKind::Leaf { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn lineage(&self, id: NodeId) -> Option<&LineageTag> {
        match &self.nodes[id].kind {
            NodeKind::Container { lineage, .. } | NodeKind::Leaf { lineage, .. } => {
                lineage.as_ref()
            }
            NodeKind::Text(_) => None,
        }
    }

    /// Sets the lineage tag of a node that does not have one yet. Tags are immutable
    /// once assigned, so this returns `false` (and changes nothing) if one is present.
    pub(crate) fn assign_lineage(
        &mut self,
        id: NodeId,
        tag: LineageTag,
    ) -> Result<bool, PaginateError> {
        match &mut self.nodes[id].kind {
            NodeKind::Container { lineage, .. } | NodeKind::Leaf { lineage, .. } => {
                if lineage.is_some() {
                    Ok(false)
                } else {
                    *lineage = Some(tag);
                    Ok(true)
                }
            }
            NodeKind::Text(_) => Err(PaginateError::NotTaggable(id)),
        }
    }

    /// The characters of a text run; [None] for anything else
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replaces the characters of a text run. Does nothing for other node kinds.
    pub fn set_text<S: Into<String>>(&mut self, id: NodeId, text: S) {
        if let NodeKind::Text(current) = &mut self.nodes[id].kind {
            *current = text.into();
        }
    }

    /// The direct children of a container, in order. Leaves and text runs have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].kind {
            NodeKind::Container { children, .. } => children,
            _ => &[],
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// A container without children or a text run without characters. Leaves are
    /// never empty.
    pub fn is_empty(&self, id: NodeId) -> bool {
        match &self.nodes[id].kind {
            NodeKind::Container { children, .. } => children.is_empty(),
            NodeKind::Leaf { .. } => false,
            NodeKind::Text(text) => text.is_empty(),
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    fn children_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, PaginateError> {
        match &mut self.nodes[id].kind {
            NodeKind::Container { children, .. } => Ok(children),
            _ => Err(PaginateError::NotAContainer(id)),
        }
    }

    /// Removes `id` from its parent's children. The node (and its subtree) stays
    /// allocated and can be re-attached later. Detaching a root is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id].parent.take() else {
            return;
        };
        if let Ok(siblings) = self.children_mut(parent) {
            siblings.retain(|&child| child != id);
        }
    }

    fn insert(
        &mut self,
        parent: NodeId,
        index: Option<usize>,
        child: NodeId,
    ) -> Result<(), PaginateError> {
        if !self.is_container(parent) {
            return Err(PaginateError::NotAContainer(parent));
        }
        if self.is_ancestor_of(child, parent) {
            return Err(PaginateError::WouldCycle {
                node: child,
                parent,
            });
        }

        self.detach(child);
        let siblings = self.children_mut(parent)?;
        match index {
            Some(index) => siblings.insert(index.min(siblings.len()), child),
            None => siblings.push(child),
        }
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Moves `child` to the end of `parent`'s children, detaching it from wherever it
    /// currently lives
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), PaginateError> {
        self.insert(parent, None, child)
    }

    /// Moves `child` to the front of `parent`'s children, detaching it from wherever
    /// it currently lives
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<(), PaginateError> {
        self.insert(parent, Some(0), child)
    }

    /// Moves `child` so that it directly follows `sibling` under `sibling`'s parent
    pub fn insert_after(&mut self, sibling: NodeId, child: NodeId) -> Result<(), PaginateError> {
        let parent = self.nodes[sibling]
            .parent
            .ok_or(PaginateError::Detached(sibling))?;
        if child == sibling {
            return Ok(());
        }
        if self.is_ancestor_of(child, parent) {
            return Err(PaginateError::WouldCycle {
                node: child,
                parent,
            });
        }

        self.detach(child);
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == sibling)
            .map_or(0, |i| i + 1);
        self.insert(parent, Some(index), child)
    }

    /// Appends every node in `children` to `parent`, in order
    pub fn append_all<I>(&mut self, parent: NodeId, children: I) -> Result<(), PaginateError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        for child in children {
            self.append(parent, child)?;
        }
        Ok(())
    }

    /// Merges runs of adjacent text children of `container` into the first run of
    /// each group and drops text runs that are empty. Merged and dropped runs are
    /// recycled. Only direct children are touched.
    pub fn coalesce_text(&mut self, container: NodeId) {
        let children = self.children(container).to_vec();
        let mut anchor: Option<NodeId> = None;

        for child in children {
            let NodeKind::Text(text) = &self.nodes[child].kind else {
                anchor = None;
                continue;
            };

            if text.is_empty() {
                self.recycle(child);
                continue;
            }

            match anchor {
                Some(into) => {
                    let text = text.clone();
                    if let NodeKind::Text(merged) = &mut self.nodes[into].kind {
                        merged.push_str(&text);
                    }
                    self.recycle(child);
                }
                None => anchor = Some(child),
            }
        }
    }

    /// Concatenated text of every text run and leaf under `id`, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Leaf { content, .. } => out.push_str(content),
            NodeKind::Container { children, .. } => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Number of nodes in the subtree rooted at `id`, `id` included
    pub fn subtree_size(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&child| self.subtree_size(child))
            .sum::<usize>()
    }
}
