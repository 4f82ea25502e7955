//! Arena-backed tree for math expressions.
//!
//! Nodes live in a [`Tree`] and are addressed by [`NodeId`]. Every node
//! records the id of its structural parent, so rewrite passes can walk up
//! from any node and splice the tree in place (see the surgery primitives
//! [`Tree::delete`] and [`Tree::replace`]).
//!
//! Ids are never reused. A node removed by a mutation simply becomes
//! unreachable from the root; the arena is dropped with the tree once the
//! expression has been serialized.

mod surgery;

pub use surgery::TreeError;

use std::fmt;

use crate::span::Span;

/// Stable address of a node inside one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which structural symbol introduced a [`Node::Script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptMarker {
    /// `^`
    Superscript,
    /// `_`
    Subscript,
}

impl ScriptMarker {
    /// The symbol as written in the source.
    pub fn symbol(self) -> char {
        match self {
            ScriptMarker::Superscript => '^',
            ScriptMarker::Subscript => '_',
        }
    }
}

/// A node of a math expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw text.
    Literal(String),

    /// Placeholder that renders to nothing.
    Empty,

    /// One cell of a concatenation chain.
    ///
    /// `head` is never a sequence; `tail`, when present, always is.
    Sequence { head: NodeId, tail: Option<NodeId> },

    /// `{...}` or, when `bracketed`, `[...]` around a sequence.
    Group { inner: NodeId, bracketed: bool },

    /// `^x` or `_x`, binding exactly one atomic operand: a one character
    /// literal, a group, a command or an escape.
    Script { marker: ScriptMarker, operand: NodeId },

    /// `\name` followed by its adjacent groups.
    Command { name: String, parameters: Vec<NodeId> },

    /// A resolved `\begin{name}...\end{name}` region.
    Block {
        name: String,
        parameters: Vec<NodeId>,
        body: NodeId,
    },
}

impl Node {
    /// Returns `true` for [`Node::Sequence`].
    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence { .. })
    }

    /// The text of a [`Node::Literal`].
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Node::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// The name of a [`Node::Command`] or [`Node::Block`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Command { name, .. } | Node::Block { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The parameter groups of a [`Node::Command`] or [`Node::Block`].
    pub fn parameters(&self) -> &[NodeId] {
        match self {
            Node::Command { parameters, .. } | Node::Block { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// Direct children in document order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Literal(_) | Node::Empty => Vec::new(),
            Node::Sequence { head, tail } => std::iter::once(*head).chain(*tail).collect(),
            Node::Group { inner, .. } => vec![*inner],
            Node::Script { operand, .. } => vec![*operand],
            Node::Command { parameters, .. } => parameters.clone(),
            Node::Block {
                parameters, body, ..
            } => parameters.iter().copied().chain([*body]).collect(),
        }
    }

    /// Short name of the node kind, used in messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Node::Literal(_) => "literal",
            Node::Empty => "empty",
            Node::Sequence { .. } => "sequence",
            Node::Group { .. } => "group",
            Node::Script {
                marker: ScriptMarker::Superscript,
                ..
            } => "superscript",
            Node::Script {
                marker: ScriptMarker::Subscript,
                ..
            } => "subscript",
            Node::Command { .. } => "command",
            Node::Block { .. } => "block",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    span: Span,
}

/// A math expression tree.
///
/// The root is always a [`Node::Sequence`] for trees produced by
/// [`parse`](crate::parse); trees obtained with [`Tree::extract`] are rooted
/// at whatever node was extracted.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create the tree of an empty expression: one cell holding [`Node::Empty`].
    pub fn new() -> Self {
        let mut tree = Self::detached();
        let root = tree.chain(Vec::new(), Span::default());
        tree.root = root;
        tree
    }

    /// An arena without a valid root yet; callers must call `set_root`.
    pub(crate) fn detached() -> Self {
        Self {
            slots: Vec::new(),
            root: NodeId(0),
        }
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
        self.slots[root.0].parent = None;
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated in this tree, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.slots[id.0].node
    }

    /// The node behind `id`, or `None` for an id of another tree.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    /// The structural parent of `id`, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// The source span `id` was parsed from.
    pub fn span(&self, id: NodeId) -> Span {
        self.slots[id.0].span
    }

    /// Allocate a node and adopt its children.
    ///
    /// The children must not be attached anywhere else; their parent is
    /// overwritten.
    pub fn alloc(&mut self, node: Node, span: Span) -> NodeId {
        let id = NodeId(self.slots.len());
        let children = node.children();
        self.slots.push(Slot {
            node,
            parent: None,
            span,
        });
        for child in children {
            self.set_parent(child, Some(id));
        }
        id
    }

    /// Allocate a [`Node::Literal`].
    pub fn literal(&mut self, text: impl Into<String>, span: Span) -> NodeId {
        self.alloc(Node::Literal(text.into()), span)
    }

    /// Build a sequence chain over `heads`, in order.
    ///
    /// An empty list gives a single cell holding [`Node::Empty`] with the
    /// `fallback` span.
    pub fn chain(&mut self, mut heads: Vec<NodeId>, fallback: Span) -> NodeId {
        let last = match heads.pop() {
            Some(head) => head,
            None => self.alloc(Node::Empty, fallback),
        };

        let span = self.span(last);
        let mut cell = self.alloc(Node::Sequence { head: last, tail: None }, span);
        for head in heads.into_iter().rev() {
            let span = self.span(head).union(self.span(cell));
            cell = self.alloc(
                Node::Sequence {
                    head,
                    tail: Some(cell),
                },
                span,
            );
        }
        cell
    }

    /// The head of a sequence cell.
    pub fn head(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id) {
            Node::Sequence { head, .. } => Some(*head),
            _ => None,
        }
    }

    /// The tail of a sequence cell.
    pub fn tail(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id) {
            Node::Sequence { tail, .. } => *tail,
            _ => None,
        }
    }

    /// The `index`-th parameter of a command or block.
    pub fn parameter(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).parameters().get(index).copied()
    }

    /// Iterate over the cells of the chain starting at `id`.
    ///
    /// Yields `(cell, head)` pairs. Yields nothing when `id` is not a
    /// sequence.
    pub fn cells(&self, id: NodeId) -> Cells<'_> {
        Cells {
            tree: self,
            next: Some(id),
        }
    }

    /// The last cell of the chain starting at `id`.
    pub fn last_cell(&self, id: NodeId) -> NodeId {
        self.cells(id).last().map_or(id, |(cell, _)| cell)
    }

    /// The sequence cell holding `id` in its place in the chain.
    ///
    /// A sequence is its own cell. Any other node has an owning cell only
    /// when it is the head of a sequence (and not, for instance, the operand
    /// of a script or the parameter of a command).
    pub fn owning_cell(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).is_sequence() {
            return Some(id);
        }
        let parent = self.parent(id)?;
        (self.head(parent) == Some(id)).then_some(parent)
    }

    /// When the chain at `id` holds exactly one element, return it.
    ///
    /// This is how a parameter "reduces" to a single node: `{\t}` reduces to
    /// the command `\t`, `{3}` to the literal `3`.
    pub fn single_head(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id) {
            Node::Sequence { head, tail: None } => Some(*head),
            _ => None,
        }
    }

    /// Mutable access to the text of a literal.
    pub fn literal_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.slots[id.0].node {
            Node::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Rename a command or block. Returns `false` for other nodes.
    pub fn rename(&mut self, id: NodeId, new_name: impl Into<String>) -> bool {
        match &mut self.slots[id.0].node {
            Node::Command { name, .. } | Node::Block { name, .. } => {
                *name = new_name.into();
                true
            }
            _ => false,
        }
    }

    /// Copy the subtree rooted at `id` into a new tree of its own.
    pub fn extract(&self, id: NodeId) -> Tree {
        let mut tree = Tree::detached();
        let root = copy_into(self, id, &mut tree, None);
        tree.set_root(root);
        tree
    }

    /// Copy the whole of `source` into this arena.
    ///
    /// Returns the detached copy of the source root. When `span` is given,
    /// every copied node takes it instead of its original span.
    pub fn graft(&mut self, source: &Tree, span: Option<Span>) -> NodeId {
        copy_into(source, source.root(), self, span)
    }

    /// Deep-copy the subtree rooted at `id` inside this arena.
    ///
    /// The copy is detached and shares no node with the original.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let snapshot = self.extract(id);
        self.graft(&snapshot, None)
    }

    pub(crate) fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        self.slots[child.0].parent = parent;
    }

    /// Overwrite a cell and adopt its new head and tail.
    pub(crate) fn set_cell(&mut self, cell: NodeId, head: NodeId, tail: Option<NodeId>) {
        self.slots[cell.0].node = Node::Sequence { head, tail };
        self.set_parent(head, Some(cell));
        if let Some(tail) = tail {
            self.set_parent(tail, Some(cell));
        }
    }

    /// Replace the tail of a cell, adopting the new one.
    pub(crate) fn set_tail(&mut self, cell: NodeId, new_tail: Option<NodeId>) {
        if let Node::Sequence { tail, .. } = &mut self.slots[cell.0].node {
            *tail = new_tail;
        }
        if let Some(new_tail) = new_tail {
            self.set_parent(new_tail, Some(cell));
        }
    }
}

/// Iterator over the cells of a chain, see [`Tree::cells`].
pub struct Cells<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Cells<'_> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next?;
        match self.tree.node(cell) {
            Node::Sequence { head, tail } => {
                self.next = *tail;
                Some((cell, *head))
            }
            _ => {
                self.next = None;
                None
            }
        }
    }
}

/// Structural clone of `source[id]` into `target`.
fn copy_into(source: &Tree, id: NodeId, target: &mut Tree, span: Option<Span>) -> NodeId {
    let span_of = |id: NodeId| span.unwrap_or_else(|| source.span(id));

    match source.node(id) {
        Node::Literal(text) => target.alloc(Node::Literal(text.clone()), span_of(id)),
        Node::Empty => target.alloc(Node::Empty, span_of(id)),
        Node::Sequence { .. } => {
            // Chains can be long; copy them cell by cell instead of recursing
            // down the tails.
            let cells: Vec<(NodeId, NodeId)> = source.cells(id).collect();
            let mut tail: Option<NodeId> = None;
            let mut copied = id;
            for &(cell, head) in cells.iter().rev() {
                let head = copy_into(source, head, target, span);
                copied = target.alloc(Node::Sequence { head, tail }, span_of(cell));
                tail = Some(copied);
            }
            copied
        }
        Node::Group { inner, bracketed } => {
            let inner = copy_into(source, *inner, target, span);
            target.alloc(
                Node::Group {
                    inner,
                    bracketed: *bracketed,
                },
                span_of(id),
            )
        }
        Node::Script { marker, operand } => {
            let operand = copy_into(source, *operand, target, span);
            target.alloc(
                Node::Script {
                    marker: *marker,
                    operand,
                },
                span_of(id),
            )
        }
        Node::Command { name, parameters } => {
            let parameters = parameters
                .iter()
                .map(|&parameter| copy_into(source, parameter, target, span))
                .collect();
            target.alloc(
                Node::Command {
                    name: name.clone(),
                    parameters,
                },
                span_of(id),
            )
        }
        Node::Block {
            name,
            parameters,
            body,
        } => {
            let parameters = parameters
                .iter()
                .map(|&parameter| copy_into(source, parameter, target, span))
                .collect();
            let body = copy_into(source, *body, target, span);
            target.alloc(
                Node::Block {
                    name: name.clone(),
                    parameters,
                    body,
                },
                span_of(id),
            )
        }
    }
}
