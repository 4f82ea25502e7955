//! Depth-first traversal of a [`Tree`].
//!
//! [`Visit`] walks a shared tree, [`VisitMut`] walks a tree that the visitor
//! may rewrite while it is being walked. Each trait has one method per node
//! kind; the default implementations descend into children through the
//! matching `walk_*` function, so a visitor overrides only the kinds it
//! cares about and calls `walk_*` itself to keep descending.
//!
//! Children are visited in document order. Sequences are walked cell by cell
//! with a loop, so long chains do not grow the call stack.
//!
//! # Mutation during a walk
//!
//! [`walk_sequence_mut`] checks the current cell again after visiting its
//! head. When the visitor replaced or deleted the head (see
//! [`Tree::replace`] and [`Tree::delete`]), the element now at that position
//! is visited before moving on. The same holds for the operand of a script
//! and the parameter lists of commands and blocks, which are re-read on
//! every step.

use crate::tree::{Node, NodeId, Tree};

/// Read-only tree visitor.
pub trait Visit {
    /// Error that aborts the walk.
    type Error;

    /// Visit any node, dispatching on its kind.
    fn visit(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        dispatch(self, tree, id)
    }

    fn visit_literal(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        let _ = (tree, id);
        Ok(())
    }

    fn visit_empty(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        let _ = (tree, id);
        Ok(())
    }

    fn visit_sequence(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_sequence(self, tree, id)
    }

    fn visit_group(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_group(self, tree, id)
    }

    fn visit_script(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_script(self, tree, id)
    }

    fn visit_command(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_command(self, tree, id)
    }

    fn visit_block(&mut self, tree: &Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_block(self, tree, id)
    }
}

/// Call the `visit_*` method matching the kind of `id`.
pub fn dispatch<V: Visit + ?Sized>(visitor: &mut V, tree: &Tree, id: NodeId) -> Result<(), V::Error> {
    match tree.node(id) {
        Node::Literal(_) => visitor.visit_literal(tree, id),
        Node::Empty => visitor.visit_empty(tree, id),
        Node::Sequence { .. } => visitor.visit_sequence(tree, id),
        Node::Group { .. } => visitor.visit_group(tree, id),
        Node::Script { .. } => visitor.visit_script(tree, id),
        Node::Command { .. } => visitor.visit_command(tree, id),
        Node::Block { .. } => visitor.visit_block(tree, id),
    }
}

/// Visit the head of every cell of the chain starting at `id`.
pub fn walk_sequence<V: Visit + ?Sized>(
    visitor: &mut V,
    tree: &Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    for (_, head) in tree.cells(id) {
        visitor.visit(tree, head)?;
    }
    Ok(())
}

pub fn walk_group<V: Visit + ?Sized>(visitor: &mut V, tree: &Tree, id: NodeId) -> Result<(), V::Error> {
    if let Node::Group { inner, .. } = tree.node(id) {
        visitor.visit(tree, *inner)?;
    }
    Ok(())
}

pub fn walk_script<V: Visit + ?Sized>(visitor: &mut V, tree: &Tree, id: NodeId) -> Result<(), V::Error> {
    if let Node::Script { operand, .. } = tree.node(id) {
        visitor.visit(tree, *operand)?;
    }
    Ok(())
}

pub fn walk_command<V: Visit + ?Sized>(
    visitor: &mut V,
    tree: &Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    for &parameter in tree.node(id).parameters() {
        visitor.visit(tree, parameter)?;
    }
    Ok(())
}

/// Visit the parameters of a block, then its body.
pub fn walk_block<V: Visit + ?Sized>(visitor: &mut V, tree: &Tree, id: NodeId) -> Result<(), V::Error> {
    if let Node::Block {
        parameters, body, ..
    } = tree.node(id)
    {
        for &parameter in parameters {
            visitor.visit(tree, parameter)?;
        }
        visitor.visit(tree, *body)?;
    }
    Ok(())
}

/// Tree visitor that may rewrite the tree as it goes.
pub trait VisitMut {
    /// Error that aborts the walk.
    type Error;

    /// Visit any node, dispatching on its kind.
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        dispatch_mut(self, tree, id)
    }

    fn visit_literal(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        let _ = (tree, id);
        Ok(())
    }

    fn visit_empty(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        let _ = (tree, id);
        Ok(())
    }

    fn visit_sequence(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_sequence_mut(self, tree, id)
    }

    fn visit_group(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_group_mut(self, tree, id)
    }

    fn visit_script(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_script_mut(self, tree, id)
    }

    fn visit_command(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_command_mut(self, tree, id)
    }

    fn visit_block(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
        walk_block_mut(self, tree, id)
    }
}

/// Call the `visit_*` method matching the kind of `id`.
pub fn dispatch_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    match tree.node(id) {
        Node::Literal(_) => visitor.visit_literal(tree, id),
        Node::Empty => visitor.visit_empty(tree, id),
        Node::Sequence { .. } => visitor.visit_sequence(tree, id),
        Node::Group { .. } => visitor.visit_group(tree, id),
        Node::Script { .. } => visitor.visit_script(tree, id),
        Node::Command { .. } => visitor.visit_command(tree, id),
        Node::Block { .. } => visitor.visit_block(tree, id),
    }
}

/// Visit every element of the chain starting at `id`.
///
/// After each visit the cell is inspected again: when its head changed, the
/// new head is visited as well before the walk moves to the next cell.
pub fn walk_sequence_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    let mut cell = id;
    while let Some(head) = tree.head(cell) {
        visitor.visit(tree, head)?;
        if tree.head(cell) != Some(head) {
            continue;
        }
        match tree.tail(cell) {
            Some(next) => cell = next,
            None => break,
        }
    }
    Ok(())
}

pub fn walk_group_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    if let Node::Group { inner, .. } = tree.node(id) {
        let inner = *inner;
        visitor.visit(tree, inner)?;
    }
    Ok(())
}

/// Visit the operand of a script, again whenever the visitor swapped it.
pub fn walk_script_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    let operand_of = |tree: &Tree| match tree.node(id) {
        Node::Script { operand, .. } => Some(*operand),
        _ => None,
    };

    while let Some(operand) = operand_of(tree) {
        visitor.visit(tree, operand)?;
        if operand_of(tree) == Some(operand) {
            break;
        }
    }
    Ok(())
}

pub fn walk_command_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    let mut index = 0;
    while let Some(parameter) = tree.parameter(id, index) {
        visitor.visit(tree, parameter)?;
        index += 1;
    }
    Ok(())
}

/// Visit the parameters of a block, then its body.
pub fn walk_block_mut<V: VisitMut + ?Sized>(
    visitor: &mut V,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), V::Error> {
    walk_command_mut(visitor, tree, id)?;
    if let Node::Block { body, .. } = tree.node(id) {
        let body = *body;
        visitor.visit(tree, body)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, parse_math, serialize, span::Span};

    /// Records the kind of every visited node.
    #[derive(Default)]
    struct KindRecorder {
        kinds: Vec<&'static str>,
    }

    impl Visit for KindRecorder {
        type Error = ();

        fn visit(&mut self, tree: &Tree, id: NodeId) -> Result<(), ()> {
            self.kinds.push(tree.node(id).describe());
            dispatch(self, tree, id)
        }
    }

    #[test]
    fn test_visit_document_order() {
        let tree = parse_math("a^{b}\\begin{m}[o]x\\end{m}").unwrap();
        let mut recorder = KindRecorder::default();
        recorder.visit(&tree, tree.root()).unwrap();

        assert_eq!(
            recorder.kinds,
            vec![
                "sequence",
                "literal",
                "superscript",
                "group",
                "sequence",
                "literal",
                "block",
                "group",
                "sequence",
                "literal",
                "sequence",
                "literal",
            ]
        );
    }

    /// Stops at the first command it meets.
    struct FirstCommand;

    impl Visit for FirstCommand {
        type Error = String;

        fn visit_command(&mut self, tree: &Tree, id: NodeId) -> Result<(), String> {
            Err(tree.node(id).name().unwrap_or_default().to_string())
        }
    }

    #[test]
    fn test_visit_error_aborts_walk() {
        let tree = parse("x{\\alpha}\\beta").unwrap();
        assert_eq!(FirstCommand.visit(&tree, tree.root()), Err("alpha".to_string()));
    }

    /// Replaces `\a` with `\b` and counts how often each name is seen.
    #[derive(Default)]
    struct Renamer {
        seen: Vec<String>,
    }

    impl VisitMut for Renamer {
        type Error = crate::TreeError;

        fn visit_command(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
            let name = tree.node(id).name().unwrap_or_default().to_string();
            self.seen.push(name.clone());
            if name == "a" {
                let replacement = tree.alloc(
                    Node::Command {
                        name: "b".into(),
                        parameters: Vec::new(),
                    },
                    Span::default(),
                );
                tree.replace(id, replacement)?;
                return Ok(());
            }
            walk_command_mut(self, tree, id)
        }
    }

    #[test]
    fn test_visit_mut_revisits_replaced_position() {
        let mut tree = parse("\\a x^\\a").unwrap();
        let mut renamer = Renamer::default();
        let root = tree.root();
        renamer.visit(&mut tree, root).unwrap();

        assert_eq!(serialize(&tree), "\\b x^\\b");
        assert_eq!(renamer.seen, vec!["a", "b", "a", "b"]);
    }

    /// Deletes every literal.
    struct DropLiterals;

    impl VisitMut for DropLiterals {
        type Error = crate::TreeError;

        fn visit_literal(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Self::Error> {
            if tree.owning_cell(id).is_some() {
                tree.delete(id)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_visit_mut_after_delete() {
        let mut tree = parse("a\\x b{c}d").unwrap();
        let root = tree.root();
        DropLiterals.visit(&mut tree, root).unwrap();

        assert_eq!(serialize(&tree), "\\x{}");
    }
}
