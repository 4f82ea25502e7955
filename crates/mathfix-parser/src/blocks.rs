//! Pairing of `\begin{name}` and `\end{name}` commands into [`Node::Block`]s.
//!
//! The parser knows nothing about blocks: `\begin{name}` and `\end{name}` come
//! out as ordinary commands. [`resolve_blocks`] collects them in document
//! order together with their nesting depth, pairs them with a stack, and
//! splices every pair into a single block node:
//!
//! ```text
//! a \begin{m}[p] x y \end{m} b    →    a [Block m [p] (x y)] b
//! ```
//!
//! A pair must close in the same chain it was opened in; `\begin{m}` inside a
//! group cannot be closed by an `\end{m}` outside of it.

use log::debug;

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
    tree::{Node, NodeId, Tree},
    visit::{Visit, walk_command, walk_group},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Begin,
    End,
}

/// A `\begin` or `\end` command found in the tree.
#[derive(Debug, Clone)]
struct Marker {
    kind: MarkerKind,
    name: String,
    command: NodeId,
    depth: usize,
}

/// Collects block markers, tracking how many group and parameter boundaries
/// lie between each marker and the root.
#[derive(Default)]
struct MarkerCollector {
    depth: usize,
    markers: Vec<Marker>,
}

impl Visit for MarkerCollector {
    type Error = Diagnostic;

    fn visit_group(&mut self, tree: &Tree, id: NodeId) -> Result<(), Diagnostic> {
        self.depth += 1;
        let result = walk_group(self, tree, id);
        self.depth -= 1;
        result
    }

    fn visit_command(&mut self, tree: &Tree, id: NodeId) -> Result<(), Diagnostic> {
        let kind = match tree.node(id).name() {
            Some("begin") => Some(MarkerKind::Begin),
            Some("end") => Some(MarkerKind::End),
            _ => None,
        };
        if let Some(kind) = kind {
            let name = block_name(tree, id)?;
            self.markers.push(Marker {
                kind,
                name,
                command: id,
                depth: self.depth,
            });
        }

        self.depth += 1;
        let result = walk_command(self, tree, id);
        self.depth -= 1;
        result
    }
}

/// Read the block name from the first parameter of a marker command.
fn block_name(tree: &Tree, command: NodeId) -> Result<String, Diagnostic> {
    let marker = tree.node(command).name().unwrap_or_default();
    let invalid = |message: String| {
        Diagnostic::error(message)
            .with_code(ErrorCode::E200)
            .with_label(tree.span(command), "invalid block marker")
            .with_help(format!("write `\\{marker}{{name}}` with a name made of letters and `*`"))
    };

    let Some(parameter) = tree.parameter(command, 0) else {
        return Err(invalid(format!("`\\{marker}` without a block name")));
    };

    let name = match tree.node(parameter) {
        Node::Group {
            inner,
            bracketed: false,
        } => tree
            .single_head(*inner)
            .and_then(|head| tree.node(head).as_literal()),
        _ => None,
    };

    match name {
        Some(name) if is_block_name(name) => Ok(name.to_string()),
        _ => Err(invalid(format!(
            "`{}` is not a valid block name",
            crate::serialize_node(tree, parameter)
        ))),
    }
}

fn is_block_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '*')
}

/// Pair `\begin{name}`/`\end{name}` commands and replace each pair, and
/// everything between them, with a [`Node::Block`].
///
/// Must run before any rewrite pass that relies on block nodes. On error the
/// tree may be partially resolved and should be discarded.
pub fn resolve_blocks(tree: &mut Tree) -> Result<(), ParseError> {
    let mut collector = MarkerCollector::default();
    collector.visit(tree, tree.root())?;

    let mut open: Vec<Marker> = Vec::new();
    for marker in collector.markers {
        match marker.kind {
            MarkerKind::Begin => open.push(marker),
            MarkerKind::End => {
                let Some(begin) = open.pop() else {
                    return Err(Diagnostic::error(format!(
                        "`\\end{{{}}}` without a matching `\\begin`",
                        marker.name
                    ))
                    .with_code(ErrorCode::E204)
                    .with_label(tree.span(marker.command), "nothing to close")
                    .into());
                };
                check_pair(tree, &begin, &marker)?;
                splice(tree, &begin, &marker)?;
                debug!(name = begin.name.as_str(), depth = begin.depth; "Resolved block");
            }
        }
    }

    if !open.is_empty() {
        let names = open
            .iter()
            .map(|marker| format!("`{}`", marker.name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut diagnostic = Diagnostic::error(format!("unclosed block {names}"))
            .with_code(ErrorCode::E203)
            .with_help("add the matching `\\end{...}`");
        for marker in &open {
            diagnostic = diagnostic.with_label(tree.span(marker.command), "opened here");
        }
        return Err(diagnostic.into());
    }

    Ok(())
}

fn check_pair(tree: &Tree, begin: &Marker, end: &Marker) -> Result<(), Diagnostic> {
    if begin.name != end.name {
        return Err(Diagnostic::error(format!(
            "block `{}` closed by `\\end{{{}}}`",
            begin.name, end.name
        ))
        .with_code(ErrorCode::E201)
        .with_label(tree.span(end.command), format!("expected `\\end{{{}}}`", begin.name))
        .with_secondary_label(tree.span(begin.command), "block opened here"));
    }

    if begin.depth != end.depth || !same_chain(tree, begin.command, end.command) {
        return Err(Diagnostic::error(format!(
            "block `{}` is not closed in the context it was opened in",
            begin.name
        ))
        .with_code(ErrorCode::E202)
        .with_label(tree.span(end.command), "closed here")
        .with_secondary_label(tree.span(begin.command), "opened here")
        .with_help("`\\begin` and `\\end` must be in the same group"));
    }

    Ok(())
}

/// Whether `end` follows `begin` in the same sequence chain.
fn same_chain(tree: &Tree, begin: NodeId, end: NodeId) -> bool {
    let (Some(begin_cell), Some(end_cell)) = (tree.owning_cell(begin), tree.owning_cell(end))
    else {
        return false;
    };
    tree.cells(begin_cell).any(|(cell, _)| cell == end_cell)
}

/// Replace the cells from `begin` through `end` with a single block.
fn splice(tree: &mut Tree, begin: &Marker, end: &Marker) -> Result<(), Diagnostic> {
    let cells = tree
        .owning_cell(begin.command)
        .zip(tree.owning_cell(end.command));
    let Some((begin_cell, end_cell)) = cells else {
        return Err(Diagnostic::error("block markers must be elements of a sequence")
            .with_code(ErrorCode::E202)
            .with_label(tree.span(begin.command), "block opened here"));
    };

    let span = tree.span(begin.command).union(tree.span(end.command));
    let begin_parameters = tree.node(begin.command).parameters().to_vec();
    let end_parameters = tree.node(end.command).parameters().to_vec();

    let body = match tree.tail(begin_cell) {
        Some(first) if first != end_cell => {
            let before_end = tree
                .cells(first)
                .find(|&(cell, _)| tree.tail(cell) == Some(end_cell))
                .map(|(cell, _)| cell);
            if let Some(before_end) = before_end {
                tree.set_tail(before_end, None);
            }
            tree.set_parent(first, None);
            first
        }
        _ => {
            let at = Span::new(tree.span(begin.command).end()..tree.span(begin.command).end());
            tree.chain(Vec::new(), at)
        }
    };

    let continuation = tree.tail(end_cell);
    let block = tree.alloc(
        Node::Block {
            name: begin.name.clone(),
            parameters: begin_parameters.iter().skip(1).copied().collect(),
            body,
        },
        span,
    );
    tree.set_parent(begin.command, None);
    tree.set_parent(end.command, None);
    tree.set_cell(begin_cell, block, continuation);

    // Groups after the name of `\end` stay in the text, after the block.
    let mut after = begin_cell;
    for &extra in end_parameters.iter().skip(1) {
        tree.set_parent(extra, None);
        after = tree
            .insert_after(after, extra)
            .map_err(|err| err.into_diagnostic(span))?;
    }

    Ok(())
}
