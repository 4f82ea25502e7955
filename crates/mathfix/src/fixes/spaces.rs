//! Whitespace trimming around math expressions.
//!
//! Leading and trailing whitespace is stripped from the top-level chain.
//! An expression holding a block environment is then put on lines of its
//! own by adding a newline at both ends.

use mathfix_parser::{Diagnostic, Node, NodeId, Span, Tree, TreeError, Visit};

use super::{Fix, UnitContext};

/// Strips the edges of every expression and optionally pads blocks.
#[derive(Debug, Clone, Copy)]
pub struct TrimSpaces {
    pad_blocks: bool,
}

impl Default for TrimSpaces {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TrimSpaces {
    pub fn new(pad_blocks: bool) -> Self {
        Self { pad_blocks }
    }

    pub fn pad_blocks(&self) -> bool {
        self.pad_blocks
    }
}

impl Fix for TrimSpaces {
    fn name(&self) -> &'static str {
        "trim-spaces"
    }

    fn fix(&self, tree: &mut Tree, _context: &mut UnitContext) -> Result<(), Diagnostic> {
        let root = tree.root();
        let span = tree.span(root);

        trim_start(tree, root)
            .and_then(|()| trim_end(tree, root))
            .and_then(|()| {
                if self.pad_blocks && contains_block(tree, root) {
                    pad(tree, root)
                } else {
                    Ok(())
                }
            })
            .map_err(|err| err.into_diagnostic(span))
    }
}

fn trim_start(tree: &mut Tree, root: NodeId) -> Result<(), TreeError> {
    while let Some(head) = tree.head(root) {
        let has_tail = tree.tail(root).is_some();
        match tree.node(head) {
            Node::Empty if has_tail => {}
            Node::Literal(text) if text.starts_with(char::is_whitespace) => {
                let trimmed = text.trim_start().to_string();
                if !trimmed.is_empty() {
                    set_literal(tree, head, trimmed);
                    return Ok(());
                }
                if !has_tail {
                    tree.delete(root)?;
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
        tree.delete(root)?;
    }
    Ok(())
}

fn trim_end(tree: &mut Tree, root: NodeId) -> Result<(), TreeError> {
    let cells: Vec<(NodeId, NodeId)> = tree.cells(root).collect();

    for (cell, head) in cells.into_iter().rev() {
        match tree.node(head) {
            Node::Empty => {}
            Node::Literal(text) if text.ends_with(char::is_whitespace) => {
                let trimmed = text.trim_end().to_string();
                if !trimmed.is_empty() {
                    set_literal(tree, head, trimmed);
                    return Ok(());
                }
                tree.delete(cell)?;
            }
            _ => return Ok(()),
        }
    }
    Ok(())
}

fn pad(tree: &mut Tree, root: NodeId) -> Result<(), TreeError> {
    let edge = Span::new(tree.span(root).start()..tree.span(root).start());
    match tree.head(root).map(|head| (head, tree.node(head))) {
        Some((head, Node::Literal(text))) => {
            let padded = format!("\n{text}");
            set_literal(tree, head, padded);
        }
        Some((head, Node::Empty)) => {
            let newline = tree.literal("\n", edge);
            tree.replace(head, newline)?;
        }
        _ => {
            let newline = tree.literal("\n", edge);
            tree.insert_before(root, newline)?;
        }
    }

    let last = tree.last_cell(root);
    let edge = Span::new(tree.span(root).end()..tree.span(root).end());
    match tree.head(last).map(|head| (head, tree.node(head))) {
        Some((head, Node::Literal(text))) => {
            let padded = format!("{text}\n");
            set_literal(tree, head, padded);
        }
        Some((head, Node::Empty)) => {
            let newline = tree.literal("\n", edge);
            tree.replace(head, newline)?;
        }
        _ => {
            let newline = tree.literal("\n", edge);
            tree.insert_after(last, newline)?;
        }
    }
    Ok(())
}

fn set_literal(tree: &mut Tree, literal: NodeId, text: String) {
    if let Some(slot) = tree.literal_mut(literal) {
        *slot = text;
    }
}

/// Stops at the first block.
struct BlockFinder;

impl Visit for BlockFinder {
    type Error = ();

    fn visit_block(&mut self, _tree: &Tree, _id: NodeId) -> Result<(), ()> {
        Err(())
    }
}

fn contains_block(tree: &Tree, root: NodeId) -> bool {
    BlockFinder.visit(tree, root).is_err()
}
