//! # Mathfix Parser
//!
//! Lossless parser and tree model for LaTeX math expressions. This crate
//! provides the pipeline from the text of one math expression to a mutable
//! tree and back:
//!
//! 1. **Tokenize** - split the text into text runs and structural symbols
//! 2. **Parse** - build a [`Tree`] of literals, groups, scripts and commands
//! 3. **Resolve blocks** - pair `\begin{name}`/`\end{name}` into block nodes
//! 4. **Rewrite** - passes walk the tree with [`VisitMut`] and splice it with
//!    the surgery primitives on [`Tree`]
//! 5. **Serialize** - write the tree back as text
//!
//! Parsing followed by serialization reproduces the input exactly.
//!
//! ## Usage
//!
//! ```
//! # use mathfix_parser::{parse_math, serialize, Node, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let tree = parse_math(r"\begin{align} x^2 &= \frac{a}{b} \end{align}")?;
//!
//!     let root = tree.root();
//!     assert!(matches!(tree.node(tree.head(root).unwrap()), Node::Block { .. }));
//!     assert_eq!(serialize(&tree), r"\begin{align} x^2 &= \frac{a}{b} \end{align}");
//!     Ok(())
//! }
//! ```

mod blocks;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod serialize;
mod span;
pub mod tokens;
mod tree;
pub mod visit;

pub use blocks::resolve_blocks;
pub use error::{Diagnostic, ErrorCode, ParseError};
pub use lexer::tokenize;
pub use parser::SYMBOL_COMMANDS;
pub use serialize::{serialize, serialize_node, write_node};
pub use span::Span;
pub use tree::{Cells, Node, NodeId, ScriptMarker, Tree, TreeError};
pub use visit::{Visit, VisitMut};

/// Parse the text of one math expression into a tree.
///
/// `\begin`/`\end` commands are left as ordinary commands; see
/// [`parse_math`] to also resolve them into blocks.
///
/// # Errors
///
/// Returns a [`ParseError`] for unbalanced groups, a backslash without a
/// command name, or a script without an operand. Spans in the diagnostics
/// are byte offsets into `source`.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let tokens = lexer::tokenize(source);
    let tree = parser::build_tree(&tokens)?;
    Ok(tree)
}

/// Parse the text of one math expression and resolve its blocks.
///
/// This is the form every rewrite pass expects.
pub fn parse_math(source: &str) -> Result<Tree, ParseError> {
    let mut tree = parse(source)?;
    resolve_blocks(&mut tree)?;
    Ok(tree)
}
