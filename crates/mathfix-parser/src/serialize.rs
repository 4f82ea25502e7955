//! Turning a tree back into LaTeX text.
//!
//! Serialization is the exact inverse of parsing for every tree the parser
//! produces: `serialize(&parse(s)?) == s`. Blocks are written back with
//! their `\begin{name}` and `\end{name}` markers.

use std::fmt::{self, Write};

use crate::{
    tree::{Node, NodeId, Tree},
    visit::{Visit, walk_command, walk_sequence},
};

struct Serializer<'w, W: Write> {
    out: &'w mut W,
}

impl<W: Write> Visit for Serializer<'_, W> {
    type Error = fmt::Error;

    fn visit_literal(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        if let Node::Literal(text) = tree.node(id) {
            self.out.write_str(text)?;
        }
        Ok(())
    }

    fn visit_sequence(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        walk_sequence(self, tree, id)
    }

    fn visit_group(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        if let Node::Group { inner, bracketed } = tree.node(id) {
            let (open, close) = if *bracketed { ('[', ']') } else { ('{', '}') };
            self.out.write_char(open)?;
            self.visit(tree, *inner)?;
            self.out.write_char(close)?;
        }
        Ok(())
    }

    fn visit_script(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        if let Node::Script { marker, operand } = tree.node(id) {
            self.out.write_char(marker.symbol())?;
            self.visit(tree, *operand)?;
        }
        Ok(())
    }

    fn visit_command(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        if let Node::Command { name, .. } = tree.node(id) {
            write!(self.out, "\\{name}")?;
        }
        walk_command(self, tree, id)
    }

    fn visit_block(&mut self, tree: &Tree, id: NodeId) -> fmt::Result {
        if let Node::Block {
            name,
            parameters,
            body,
        } = tree.node(id)
        {
            write!(self.out, "\\begin{{{name}}}")?;
            for &parameter in parameters {
                self.visit(tree, parameter)?;
            }
            self.visit(tree, *body)?;
            write!(self.out, "\\end{{{name}}}")?;
        }
        Ok(())
    }
}

/// Write the subtree rooted at `id` to `out`.
pub fn write_node<W: Write>(tree: &Tree, id: NodeId, out: &mut W) -> fmt::Result {
    Serializer { out }.visit(tree, id)
}

/// Serialize a whole tree.
pub fn serialize(tree: &Tree) -> String {
    tree.to_string()
}

/// Serialize the subtree rooted at `id`.
pub fn serialize_node(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_node(tree, id, &mut out);
    out
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, self.root(), f)
    }
}
