//! In-place tree surgery.
//!
//! Rewrite passes use these primitives while they walk the tree, so each
//! operation keeps the chain shape intact: a sequence cell is never left
//! without a head, and a deletion at the end of a chain leaves an
//! [`Node::Empty`] behind instead of unlinking the cell.

use thiserror::Error;

use super::{Node, NodeId, Tree};
use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Misuse of a surgery primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cannot replace a {found} node with a {replacement} node")]
    KindMismatch {
        found: &'static str,
        replacement: &'static str,
    },

    #[error("{kind} node {node} is not an element of a sequence")]
    NotInSequence { node: NodeId, kind: &'static str },

    #[error("node {0} has no parent to attach a replacement to")]
    Detached(NodeId),

    #[error("node {0} is still attached to the tree")]
    Attached(NodeId),
}

impl TreeError {
    /// Report the misuse as a diagnostic at `span`.
    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        Diagnostic::error(self.to_string())
            .with_code(ErrorCode::E400)
            .with_label(span, "while rewriting this")
    }
}

impl Tree {
    /// Remove `id` from its chain.
    ///
    /// `id` is either a sequence cell or the head of one. The following cell
    /// (if any) is pulled into the removed position; at the end of a chain the
    /// cell keeps an [`Node::Empty`] head. Returns the cell that now occupies
    /// the removed position, which is the same id as the owning cell.
    pub fn delete(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let cell = self
            .owning_cell(id)
            .ok_or_else(|| self.not_in_sequence(id))?;

        if let Some(old_head) = self.head(cell) {
            self.set_parent(old_head, None);
        }

        match self.tail(cell) {
            Some(next) => {
                let head = self.head(next).ok_or_else(|| self.not_in_sequence(next))?;
                let tail = self.tail(next);
                self.set_cell(cell, head, tail);
                self.set_parent(next, None);
            }
            None => {
                let span = self.span(cell);
                let empty = self.alloc(Node::Empty, span.take(0));
                self.set_cell(cell, empty, None);
            }
        }

        Ok(cell)
    }

    /// Put `replacement` in the place of `node`.
    ///
    /// Two shapes are supported:
    ///
    /// - both are sequences: the replacement chain takes the position of the
    ///   `node` cell and whatever followed `node` is appended after the last
    ///   cell of the replacement; `node` keeps its id and now holds the first
    ///   replacement element
    /// - neither is a sequence: the parent's reference to `node` is redirected
    ///   to `replacement`
    ///
    /// The replacement must be detached (as returned by [`Tree::alloc`],
    /// [`Tree::chain`], [`Tree::graft`] or [`Tree::deep_copy`]).
    pub fn replace(&mut self, node: NodeId, replacement: NodeId) -> Result<(), TreeError> {
        if self.parent(replacement).is_some() || replacement == self.root {
            return Err(TreeError::Attached(replacement));
        }

        let found = self.node(node).describe();
        let new = self.node(replacement).describe();
        match (
            self.node(node).is_sequence(),
            self.node(replacement).is_sequence(),
        ) {
            (true, true) => {
                let continuation = self.tail(node);
                if let Some(old_head) = self.head(node) {
                    self.set_parent(old_head, None);
                }

                let last = self.last_cell(replacement);
                let head = self
                    .head(replacement)
                    .ok_or_else(|| self.not_in_sequence(replacement))?;
                let tail = self.tail(replacement);
                self.set_cell(node, head, tail);

                // The first replacement cell has been folded into `node`.
                let join = if last == replacement { node } else { last };
                if continuation.is_some() {
                    self.set_tail(join, continuation);
                }
                Ok(())
            }
            (false, false) => {
                let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
                self.redirect_child(parent, node, replacement);
                self.set_parent(replacement, Some(parent));
                self.set_parent(node, None);
                Ok(())
            }
            _ => Err(TreeError::KindMismatch {
                found,
                replacement: new,
            }),
        }
    }

    /// Insert the detached, non-sequence `node` as a new cell right after
    /// `cell`. Returns the new cell.
    pub fn insert_after(&mut self, cell: NodeId, node: NodeId) -> Result<NodeId, TreeError> {
        self.check_insertable(cell, node)?;

        let tail = self.tail(cell);
        let span = self.span(node);
        let inserted = self.alloc(Node::Sequence { head: node, tail }, span);
        self.set_tail(cell, Some(inserted));
        Ok(inserted)
    }

    /// Insert the detached, non-sequence `node` in front of the element held
    /// by `cell`.
    ///
    /// `cell` keeps its id and holds `node` afterwards; the previous element
    /// moves to a new cell, which is returned.
    pub fn insert_before(&mut self, cell: NodeId, node: NodeId) -> Result<NodeId, TreeError> {
        self.check_insertable(cell, node)?;

        let head = self.head(cell).ok_or_else(|| self.not_in_sequence(cell))?;
        let tail = self.tail(cell);
        let span = self.span(cell);
        let moved = self.alloc(Node::Sequence { head, tail }, span);
        self.set_cell(cell, node, Some(moved));
        Ok(moved)
    }

    fn check_insertable(&self, cell: NodeId, node: NodeId) -> Result<(), TreeError> {
        if !self.node(cell).is_sequence() {
            return Err(self.not_in_sequence(cell));
        }
        if self.node(node).is_sequence() {
            return Err(TreeError::KindMismatch {
                found: self.node(cell).describe(),
                replacement: self.node(node).describe(),
            });
        }
        if self.parent(node).is_some() {
            return Err(TreeError::Attached(node));
        }
        Ok(())
    }

    fn not_in_sequence(&self, node: NodeId) -> TreeError {
        TreeError::NotInSequence {
            node,
            kind: self.node(node).describe(),
        }
    }

    fn redirect_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
            }
        };

        match &mut self.slots[parent.index()].node {
            Node::Sequence { head, .. } => swap(head),
            Node::Group { inner, .. } => swap(inner),
            Node::Script { operand, .. } => swap(operand),
            Node::Command { parameters, .. } => parameters.iter_mut().for_each(swap),
            Node::Block {
                parameters, body, ..
            } => {
                parameters.iter_mut().for_each(swap);
                swap(body);
            }
            Node::Literal(_) | Node::Empty => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, serialize};

    fn nth_head(tree: &Tree, n: usize) -> NodeId {
        tree.cells(tree.root()).nth(n).map(|(_, head)| head).unwrap()
    }

    #[test]
    fn test_delete_pulls_next_cell_forward() {
        let mut tree = parse("a\\x b").unwrap();
        let command = nth_head(&tree, 1);

        let cell = tree.delete(command).unwrap();

        assert_eq!(serialize(&tree), "a b");
        assert_eq!(tree.node(tree.head(cell).unwrap()), &Node::Literal(" b".into()));
        assert_eq!(tree.parent(command), None);
    }

    #[test]
    fn test_delete_last_element_leaves_empty() {
        let mut tree = parse("a\\x").unwrap();
        let command = nth_head(&tree, 1);

        let cell = tree.delete(command).unwrap();

        assert_eq!(serialize(&tree), "a");
        assert_eq!(tree.node(tree.head(cell).unwrap()), &Node::Empty);
        assert_eq!(tree.tail(cell), None);
    }

    #[test]
    fn test_delete_script_operand_is_rejected() {
        let mut tree = parse("x^\\y").unwrap();
        let Node::Script { operand, .. } = tree.node(nth_head(&tree, 1)).clone() else {
            panic!("expected a script");
        };

        let err = tree.delete(operand).unwrap_err();
        assert!(matches!(err, TreeError::NotInSequence { kind: "command", .. }));
        assert_eq!(serialize(&tree), "x^\\y");
    }

    #[test]
    fn test_replace_sequence_splices_chain() {
        let mut tree = parse("a\\x b").unwrap();
        let (cell, _) = tree.cells(tree.root()).nth(1).unwrap();

        let other = parse("1{2}3").unwrap();
        let replacement = tree.graft(&other, None);
        tree.replace(cell, replacement).unwrap();

        assert_eq!(serialize(&tree), "a1{2}3 b");
        crate::tree::tests::assert_parents_consistent(&tree);
    }

    #[test]
    fn test_replace_single_cell_keeps_continuation() {
        let mut tree = parse("\\x y").unwrap();
        let root = tree.root();
        let replacement = {
            let literal = tree.literal("z", Span::default());
            tree.chain(vec![literal], Span::default())
        };

        tree.replace(root, replacement).unwrap();

        assert_eq!(serialize(&tree), "z y");
        crate::tree::tests::assert_parents_consistent(&tree);
    }

    #[test]
    fn test_replace_non_sequence_under_parent() {
        let mut tree = parse("x^\\y").unwrap();
        let Node::Script { operand, .. } = tree.node(nth_head(&tree, 1)).clone() else {
            panic!("expected a script");
        };
        let replacement = tree.literal("2", Span::default());

        tree.replace(operand, replacement).unwrap();

        assert_eq!(serialize(&tree), "x^2");
        crate::tree::tests::assert_parents_consistent(&tree);
    }

    #[test]
    fn test_replace_kind_mismatch() {
        let mut tree = parse("a").unwrap();
        let root = tree.root();
        let literal = tree.literal("b", Span::default());

        let err = tree.replace(root, literal).unwrap_err();
        assert_eq!(
            err,
            TreeError::KindMismatch {
                found: "sequence",
                replacement: "literal"
            }
        );
        assert_eq!(
            err.into_diagnostic(Span::new(0..1)).code(),
            Some(ErrorCode::E400)
        );
    }

    #[test]
    fn test_replace_requires_detached_replacement() {
        let mut tree = parse("a{b}").unwrap();
        let root = tree.root();
        let attached = tree.head(root).unwrap();
        let group = nth_head(&tree, 1);

        assert_eq!(
            tree.replace(group, attached),
            Err(TreeError::Attached(attached))
        );
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut tree = parse("b").unwrap();
        let root = tree.root();

        let before = tree.literal("a", Span::default());
        let moved = tree.insert_before(root, before).unwrap();
        let after = tree.literal("c", Span::default());
        tree.insert_after(moved, after).unwrap();

        assert_eq!(serialize(&tree), "abc");
        assert_eq!(tree.head(root), Some(before));
        crate::tree::tests::assert_parents_consistent(&tree);
    }
}
