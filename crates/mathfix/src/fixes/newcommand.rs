//! Macro expansion for `\newcommand` definitions.
//!
//! A definition such as `\newcommand{\R}{\mathbb{R}}` is removed from the
//! expression and stored in a [`MacroContext`]; every later use of `\R` in
//! the same context is replaced by a copy of the stored body. Bodies may
//! refer to their arguments with `#1` to `#9`.
//!
//! Two definition shapes are recognized:
//!
//! - `\newcommand{\name}{body}` and `\newcommand{\name}[n]{body}`
//! - `\newcommand\name{body}` and `\newcommand\name[n]{body}`, where the
//!   groups are attached to `\name` by the parser
//!
//! Expansion happens in place while the tree is walked. The walk visits
//! whatever took the place of an expanded use, so uses produced by an
//! expansion (or by its arguments) are expanded in turn.

use std::convert::Infallible;

use indexmap::IndexMap;
use log::debug;

use mathfix_parser::{
    Diagnostic, ErrorCode, Node, NodeId, Span, Tree, TreeError, Visit, VisitMut,
    visit::{walk_command_mut, walk_script},
};

/// Name of the defining command.
pub const DEFINITION_COMMAND: &str = "newcommand";

/// Largest argument count a macro may declare.
pub const MAX_ARITY: usize = 9;

/// A stored macro.
#[derive(Debug, Clone)]
pub struct MacroDefinition {
    name: String,
    arity: usize,
    body: Tree,
}

impl MacroDefinition {
    /// The macro name, without the backslash.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments every use must supply.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The unexpanded body, rooted at a sequence.
    pub fn body(&self) -> &Tree {
        &self.body
    }
}

/// Macro definitions of one content unit.
///
/// Definitions made while fixing one expression are visible to every
/// expression fixed later with the same context.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    definitions: IndexMap<String, MacroDefinition>,
}

impl MacroContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition by macro name.
    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over the definitions in the order they were made.
    pub fn definitions(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.definitions.values()
    }

    fn define(&mut self, definition: MacroDefinition, span: Span) -> Result<(), Diagnostic> {
        if self.definitions.contains_key(&definition.name) {
            return Err(
                Diagnostic::error(format!("macro `\\{}` is defined twice", definition.name))
                    .with_code(ErrorCode::E305)
                    .with_label(span, "second definition")
                    .with_help("a macro can be defined only once per content unit"),
            );
        }

        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }
}

/// The macro expansion pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroExpander;

impl MacroExpander {
    pub fn new() -> Self {
        Self
    }

    /// Create an empty context for a new content unit.
    pub fn create_context(&self) -> MacroContext {
        MacroContext::new()
    }

    /// Record the definitions found in `tree` and expand every known macro.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic for a malformed or duplicate definition, a use
    /// with the wrong number of arguments, or a placeholder beyond the
    /// declared argument count. The tree is left partially rewritten.
    pub fn apply(&self, tree: &mut Tree, context: &mut MacroContext) -> Result<(), Diagnostic> {
        let root = tree.root();
        Applier { context }.visit(tree, root)
    }
}

struct Applier<'c> {
    context: &'c mut MacroContext,
}

impl VisitMut for Applier<'_> {
    type Error = Diagnostic;

    fn visit_command(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Diagnostic> {
        let Some(name) = tree.node(id).name() else {
            return Ok(());
        };

        if name == DEFINITION_COMMAND {
            return self.define(tree, id);
        }

        match self.context.get(name) {
            Some(definition) => expand(tree, id, definition),
            None => walk_command_mut(self, tree, id),
        }
    }
}

impl Applier<'_> {
    /// Store the definition at `id` and remove it from the tree.
    fn define(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), Diagnostic> {
        let span = tree.span(id);
        let cell = tree.owning_cell(id).ok_or_else(|| {
            Diagnostic::error("`\\newcommand` cannot be used here")
                .with_code(ErrorCode::E306)
                .with_label(span, "definition is not part of a sequence")
                .with_help("move the definition out of the superscript or subscript")
        })?;

        let parameters = tree.node(id).parameters().to_vec();
        let (definition, cells) = match parameters.split_first() {
            Some((name, rest)) => {
                let name = macro_name(tree, *name)?;
                (read_definition(tree, name, rest, span)?, 1)
            }
            None => {
                // `\newcommand\name...`: the groups belong to `\name`.
                let target = tree
                    .tail(cell)
                    .and_then(|next| tree.head(next))
                    .filter(|&head| matches!(tree.node(head), Node::Command { .. }))
                    .ok_or_else(|| {
                        Diagnostic::error("expected a macro name after `\\newcommand`")
                            .with_code(ErrorCode::E301)
                            .with_label(span, "no command follows")
                    })?;
                let name = checked_name(tree, target)?;
                let rest = tree.node(target).parameters().to_vec();
                let span = span.union(tree.span(target));
                (read_definition(tree, name, &rest, span)?, 2)
            }
        };

        debug!(name = definition.name(), arity = definition.arity(); "Defined macro");
        self.context.define(definition, span)?;

        for _ in 0..cells {
            tree.delete(cell).map_err(|err| err.into_diagnostic(span))?;
        }
        Ok(())
    }
}

/// The macro name held by the first parameter, as in `{\name}`.
fn macro_name(tree: &Tree, group: NodeId) -> Result<String, Diagnostic> {
    let command = match tree.node(group) {
        Node::Group {
            inner,
            bracketed: false,
        } => tree.single_head(*inner),
        _ => None,
    };

    match command {
        Some(command) if tree.node(command).parameters().is_empty() => checked_name(tree, command),
        _ => Err(
            Diagnostic::error("the first parameter of `\\newcommand` must be a single command")
                .with_code(ErrorCode::E301)
                .with_label(tree.span(group), "expected `{\\name}`"),
        ),
    }
}

fn checked_name(tree: &Tree, command: NodeId) -> Result<String, Diagnostic> {
    match tree.node(command).name() {
        Some(DEFINITION_COMMAND) => Err(Diagnostic::error("`\\newcommand` cannot be redefined")
            .with_code(ErrorCode::E301)
            .with_label(tree.span(command), "reserved name")),
        Some(name) => Ok(name.to_string()),
        None => Err(Diagnostic::error("expected a macro name")
            .with_code(ErrorCode::E301)
            .with_label(tree.span(command), "not a command")),
    }
}

/// Read the optional argument count and the body following the name.
fn read_definition(
    tree: &Tree,
    name: String,
    parameters: &[NodeId],
    span: Span,
) -> Result<MacroDefinition, Diagnostic> {
    let (arity, body) = match parameters {
        [body] => (0, *body),
        [arity, body] => (read_arity(tree, &name, *arity)?, *body),
        _ => {
            return Err(
                Diagnostic::error(format!("malformed definition of `\\{name}`"))
                    .with_code(ErrorCode::E300)
                    .with_label(span, format!("found {} groups after the name", parameters.len()))
                    .with_help("write `\\newcommand{\\name}[n]{body}`"),
            );
        }
    };

    let Node::Group {
        inner,
        bracketed: false,
    } = tree.node(body)
    else {
        return Err(
            Diagnostic::error(format!("malformed definition of `\\{name}`"))
                .with_code(ErrorCode::E300)
                .with_label(tree.span(body), "expected a `{...}` body"),
        );
    };

    Ok(MacroDefinition {
        name,
        arity,
        body: tree.extract(*inner),
    })
}

fn read_arity(tree: &Tree, name: &str, group: NodeId) -> Result<usize, Diagnostic> {
    let text = match tree.node(group) {
        Node::Group {
            inner,
            bracketed: true,
        } => tree
            .single_head(*inner)
            .and_then(|head| tree.node(head).as_literal()),
        _ => None,
    };

    text.and_then(|text| text.trim().parse::<usize>().ok())
        .filter(|arity| *arity <= MAX_ARITY)
        .ok_or_else(|| {
            Diagnostic::error(format!("invalid argument count for `\\{name}`"))
                .with_code(ErrorCode::E302)
                .with_label(tree.span(group), "expected `[n]` with n from 0 to 9")
        })
}

/// Replace the use at `id` with an expanded copy of `definition`.
fn expand(tree: &mut Tree, id: NodeId, definition: &MacroDefinition) -> Result<(), Diagnostic> {
    let span = tree.span(id);
    let arguments = tree.node(id).parameters().to_vec();
    if arguments.len() != definition.arity() {
        return Err(Diagnostic::error(format!(
            "macro `\\{}` takes {} argument(s) but {} were given",
            definition.name(),
            definition.arity(),
            arguments.len()
        ))
        .with_code(ErrorCode::E303)
        .with_label(span, "wrong number of arguments"));
    }

    let body = tree.graft(definition.body(), Some(span));
    substitute(tree, body, &arguments, definition)?;

    debug!(name = definition.name(), arguments = arguments.len(); "Expanded macro");

    let result = match tree.owning_cell(id) {
        Some(cell) if is_empty_chain(tree, body) => tree.delete(cell).map(|_| ()),
        Some(cell) => tree.replace(cell, body),
        None => {
            let replacement = match tree
                .single_head(body)
                .filter(|&head| is_atomic(tree.node(head)))
            {
                Some(head) => tree.deep_copy(head),
                None => tree.alloc(
                    Node::Group {
                        inner: body,
                        bracketed: false,
                    },
                    span,
                ),
            };
            tree.replace(id, replacement)
        }
    };
    result.map_err(|err| err.into_diagnostic(span))
}

/// Splice copies of the arguments over the placeholders in `body`.
fn substitute(
    tree: &mut Tree,
    body: NodeId,
    arguments: &[NodeId],
    definition: &MacroDefinition,
) -> Result<(), Diagnostic> {
    let mut collector = PlaceholderCollector::default();
    let Ok(()) = collector.visit(tree, body);

    for script in collector.scripts {
        substitute_operand(tree, script, arguments, definition)?;
    }

    for literal in collector.literals {
        let span = tree.span(literal);
        let text = tree.node(literal).as_literal().unwrap_or_default().to_string();

        let mut heads = Vec::new();
        for piece in split_placeholders(&text) {
            match piece {
                Piece::Text(text) => heads.push(tree.literal(text, span)),
                Piece::Argument(index) => {
                    let argument = argument_at(arguments, index, definition, span)?;
                    heads.extend(argument_copy(tree, argument));
                }
            }
        }

        // Literals holding a placeholder are at least two characters long,
        // so they are never a script operand.
        let chain = tree.chain(heads, span);
        tree.owning_cell(literal)
            .ok_or_else(|| TreeError::NotInSequence {
                node: literal,
                kind: "literal",
            })
            .and_then(|cell| tree.replace(cell, chain))
            .map_err(|err| err.into_diagnostic(span))?;
    }
    Ok(())
}

/// Substitute a placeholder written as a script operand, as in `x^#1`.
///
/// The parser takes only the `#` as the operand; the digit starts the
/// literal in the next cell. A `#` not followed by a digit from 1 to 9 is
/// left as text.
fn substitute_operand(
    tree: &mut Tree,
    script: NodeId,
    arguments: &[NodeId],
    definition: &MacroDefinition,
) -> Result<(), Diagnostic> {
    let span = tree.span(script);
    let Some(operand) = tree.node(script).children().first().copied() else {
        return Ok(());
    };
    let Some(next) = tree.owning_cell(script).and_then(|cell| tree.tail(cell)) else {
        return Ok(());
    };
    let Some(digits) = tree.head(next) else {
        return Ok(());
    };
    let index = match tree
        .node(digits)
        .as_literal()
        .and_then(|text| text.chars().next())
        .and_then(|first| first.to_digit(10))
    {
        Some(index @ 1..=9) => index as usize,
        _ => return Ok(()),
    };
    let argument = argument_at(arguments, index, definition, span.union(tree.span(digits)))?;

    let copies = argument_copy(tree, argument);
    let atomic = match copies.as_slice() {
        [head] => Some(*head).filter(|&head| is_atomic(tree.node(head))),
        _ => None,
    };
    let replacement = match atomic {
        Some(head) => tree.deep_copy(head),
        None => {
            let inner = tree.chain(copies, span);
            tree.alloc(
                Node::Group {
                    inner,
                    bracketed: false,
                },
                span,
            )
        }
    };
    tree.replace(operand, replacement)
        .map_err(|err| err.into_diagnostic(span))?;

    let emptied = match tree.literal_mut(digits) {
        Some(text) => {
            text.remove(0);
            text.is_empty()
        }
        None => false,
    };
    if emptied {
        tree.delete(next).map_err(|err| err.into_diagnostic(span))?;
    }
    Ok(())
}

/// The argument a `#index` placeholder refers to.
fn argument_at(
    arguments: &[NodeId],
    index: usize,
    definition: &MacroDefinition,
    span: Span,
) -> Result<NodeId, Diagnostic> {
    index
        .checked_sub(1)
        .filter(|_| index <= definition.arity())
        .and_then(|position| arguments.get(position))
        .copied()
        .ok_or_else(|| {
            Diagnostic::error(format!(
                "placeholder `#{index}` in `\\{}` is out of range",
                definition.name()
            ))
            .with_code(ErrorCode::E304)
            .with_label(
                span,
                format!("the macro takes {} argument(s)", definition.arity()),
            )
        })
}

/// Detached copies of the elements inside an argument group.
fn argument_copy(tree: &mut Tree, argument: NodeId) -> Vec<NodeId> {
    let inner = match tree.node(argument) {
        Node::Group { inner, .. } => *inner,
        _ => argument,
    };
    let copy = tree.deep_copy(inner);
    tree.cells(copy)
        .map(|(_, head)| head)
        .filter(|&head| !matches!(tree.node(head), Node::Empty))
        .collect()
}

fn is_empty_chain(tree: &Tree, chain: NodeId) -> bool {
    tree.single_head(chain)
        .is_some_and(|head| matches!(tree.node(head), Node::Empty))
}

/// Whether `node` can stand alone as the operand of `^` or `_`.
fn is_atomic(node: &Node) -> bool {
    match node {
        Node::Group { .. } | Node::Command { .. } => true,
        Node::Literal(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(_), None, _) => true,
                (Some('\\'), Some(_), None) => true,
                _ => false,
            }
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Argument(usize),
}

fn placeholder_at(bytes: &[u8], index: usize) -> Option<usize> {
    match (bytes.get(index), bytes.get(index + 1)) {
        (Some(b'#'), Some(digit @ b'1'..=b'9')) => Some(usize::from(digit - b'0')),
        _ => None,
    }
}

/// Split `text` around its `#1`..`#9` markers.
fn split_placeholders(text: &str) -> Vec<Piece<'_>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        match placeholder_at(bytes, index) {
            Some(argument) => {
                if start < index {
                    pieces.push(Piece::Text(&text[start..index]));
                }
                pieces.push(Piece::Argument(argument));
                index += 2;
                start = index;
            }
            None => index += 1,
        }
    }
    if start < bytes.len() {
        pieces.push(Piece::Text(&text[start..]));
    }
    pieces
}

fn has_placeholder(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).any(|index| placeholder_at(bytes, index).is_some())
}

/// Collects the literals of a body that contain placeholders, and the
/// scripts whose operand is a bare `#`.
#[derive(Default)]
struct PlaceholderCollector {
    literals: Vec<NodeId>,
    scripts: Vec<NodeId>,
}

impl Visit for PlaceholderCollector {
    type Error = Infallible;

    fn visit_script(&mut self, tree: &Tree, id: NodeId) -> Result<(), Infallible> {
        let operand = tree.node(id).children().first().copied();
        if operand.is_some_and(|operand| tree.node(operand).as_literal() == Some("#")) {
            self.scripts.push(id);
        }
        walk_script(self, tree, id)
    }

    fn visit_literal(&mut self, tree: &Tree, id: NodeId) -> Result<(), Infallible> {
        if tree.node(id).as_literal().is_some_and(has_placeholder) {
            self.literals.push(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mathfix_parser::{parse_math, serialize};

    use super::*;

    fn expand_in(source: &str, context: &mut MacroContext) -> Result<String, Diagnostic> {
        let mut tree = parse_math(source).expect("test input should parse");
        MacroExpander::new().apply(&mut tree, context)?;
        Ok(serialize(&tree))
    }

    fn expand_ok(source: &str) -> String {
        let mut context = MacroContext::new();
        match expand_in(source, &mut context) {
            Ok(text) => text,
            Err(err) => panic!("Expected expansion of {source:?} to succeed, but got: {err}"),
        }
    }

    fn expand_fails(source: &str) -> ErrorCode {
        let mut context = MacroContext::new();
        match expand_in(source, &mut context) {
            Ok(text) => panic!("Expected expansion of {source:?} to fail, but got {text:?}"),
            Err(err) => err.code().expect("macro diagnostics carry a code"),
        }
    }

    #[test]
    fn test_substitution_copies_argument_twice() {
        assert_eq!(expand_ok(r"\newcommand{\t}[1]{\a{<#1>}{#1}}\t{x}"), r"\a{<x>}{x}");
    }

    #[test]
    fn test_substituted_arguments_are_independent() {
        let mut tree = parse_math(r"\newcommand{\t}[1]{#1#1}\t{x}").unwrap();
        MacroExpander::new()
            .apply(&mut tree, &mut MacroContext::new())
            .unwrap();

        let heads: Vec<NodeId> = tree.cells(tree.root()).map(|(_, head)| head).collect();
        assert_eq!(heads.len(), 2);
        assert_ne!(heads[0], heads[1]);
        assert_eq!(serialize(&tree), "xx");
    }

    #[test]
    fn test_nested_use_in_argument() {
        assert_eq!(
            expand_ok(r"\newcommand{\a}[1]{\u{#1}}\newcommand{\b}[1]{\v{#1}}\a{\b{y}}"),
            r"\u{\v{y}}"
        );
    }

    #[test]
    fn test_tex_style_definition() {
        assert_eq!(expand_ok(r"\newcommand\test{\infty}\test"), r"\infty");
        assert_eq!(expand_ok(r"\newcommand\p[1]{(#1)}\p{a}"), "(a)");
    }

    #[test]
    fn test_expansion_produces_other_uses() {
        assert_eq!(expand_ok(r"\newcommand{\a}{\b+\b}\newcommand{\b}{z}\a"), "z+z");
    }

    #[test]
    fn test_use_inside_text_and_groups() {
        assert_eq!(
            expand_ok(r"\newcommand{\R}{\mathbb{R}} x \in \R^n, \frac{1}{\R}"),
            r" x \in \mathbb{R}^n, \frac{1}{\mathbb{R}}"
        );
    }

    #[test]
    fn test_use_inside_block() {
        assert_eq!(
            expand_ok(r"\newcommand{\t}{x}\begin{align}\t &= 1\end{align}"),
            r"\begin{align}x &= 1\end{align}"
        );
    }

    #[test]
    fn test_script_operand_keeps_atomic_result() {
        assert_eq!(expand_ok(r"\newcommand{\t}{a}x^\t"), "x^a");
        assert_eq!(expand_ok(r"\newcommand{\t}[1]{\hat{#1}}x^\t{y}"), r"x^\hat{y}");
    }

    #[test]
    fn test_placeholder_as_script_operand() {
        assert_eq!(expand_ok(r"\newcommand{\sq}[1]{x^#1}\sq{2}"), "x^2");
        assert_eq!(expand_ok(r"\newcommand{\sq}[1]{x^#1}\sq{ab}"), "x^{ab}");
        assert_eq!(
            expand_ok(r"\newcommand{\e}[2]{e_#2^#1 + #1}\e{n}{\alpha}"),
            r"e_\alpha^n + n"
        );
        // Digits after the placeholder stay in place
        assert_eq!(expand_ok(r"\newcommand{\p}[1]{x^#12}\p{a}"), "x^a2");
    }

    #[test]
    fn test_bare_hash_operand_is_text() {
        assert_eq!(expand_ok(r"\newcommand{\t}{x^#0}\t"), "x^#0");
        assert_eq!(expand_ok(r"\newcommand{\t}{x^# y}\t"), "x^# y");
    }

    #[test]
    fn test_script_placeholder_out_of_range_fails() {
        assert_eq!(expand_fails(r"\newcommand{\s}[1]{x^#2}\s{a}"), ErrorCode::E304);
    }

    #[test]
    fn test_script_operand_wraps_longer_result() {
        assert_eq!(expand_ok(r"\newcommand{\t}{ab}x^\t"), "x^{ab}");
        assert_eq!(expand_ok(r"\newcommand{\t}{}x_\t"), "x_{}");
    }

    #[test]
    fn test_empty_expansion_removes_use() {
        assert_eq!(expand_ok(r"\newcommand{\e}{}a\e b"), "a b");
    }

    #[test]
    fn test_placeholder_zero_is_text() {
        assert_eq!(expand_ok(r"\newcommand{\t}[1]{#0#1}\t{x}"), "#0x");
    }

    #[test]
    fn test_argument_order() {
        assert_eq!(expand_ok(r"\newcommand{\f}[2]{#2-#1}\f{a}{b}"), "b-a");
    }

    #[test]
    fn test_unknown_commands_are_kept() {
        assert_eq!(expand_ok(r"\alpha + \beta{x}"), r"\alpha + \beta{x}");
    }

    #[test]
    fn test_wrong_argument_count_fails() {
        assert_eq!(
            expand_fails(r"\newcommand{\test}[1]{#1}\test{x}{y}"),
            ErrorCode::E303
        );
        assert_eq!(expand_fails(r"\newcommand{\test}[1]{#1}\test"), ErrorCode::E303);
    }

    #[test]
    fn test_malformed_definitions_fail() {
        assert_eq!(expand_fails(r"\newcommand{\t}"), ErrorCode::E300);
        assert_eq!(expand_fails(r"\newcommand{\t}[1]"), ErrorCode::E300);
        assert_eq!(expand_fails(r"\newcommand{\t}[1]{a}{b}"), ErrorCode::E300);
        assert_eq!(expand_fails(r"\newcommand{t}{x}"), ErrorCode::E301);
        assert_eq!(expand_fails(r"\newcommand{\t\u}{x}"), ErrorCode::E301);
        assert_eq!(expand_fails(r"\newcommand"), ErrorCode::E301);
        assert_eq!(expand_fails(r"\newcommand{\t}{1}{x}"), ErrorCode::E302);
        assert_eq!(expand_fails(r"\newcommand{\t}[a]{x}"), ErrorCode::E302);
        assert_eq!(expand_fails(r"\newcommand{\t}[10]{x}"), ErrorCode::E302);
    }

    #[test]
    fn test_placeholder_out_of_range_fails() {
        assert_eq!(expand_fails(r"\newcommand{\t}[1]{#2}\t{x}"), ErrorCode::E304);
    }

    #[test]
    fn test_duplicate_definition_fails() {
        assert_eq!(
            expand_fails(r"\newcommand{\t}{a}\newcommand{\t}{b}"),
            ErrorCode::E305
        );
    }

    #[test]
    fn test_definition_as_script_operand_fails() {
        assert_eq!(expand_fails(r"x^\newcommand{\t}{a}"), ErrorCode::E306);
    }

    #[test]
    fn test_context_persists_between_expressions() {
        let expander = MacroExpander::new();
        let mut context = expander.create_context();

        assert_eq!(expand_in(r"\newcommand{\R}{\mathbb{R}}", &mut context).unwrap(), "");
        assert_eq!(expand_in(r"x \in \R", &mut context).unwrap(), r"x \in \mathbb{R}");
        assert_eq!(context.len(), 1);

        let err = expand_in(r"\newcommand{\R}{R}", &mut context).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E305));
    }

    #[test]
    fn test_fresh_contexts_are_independent() {
        let expander = MacroExpander::new();
        let mut first = expander.create_context();
        let mut second = expander.create_context();

        assert_eq!(expand_in(r"\newcommand{\t}{a}\t", &mut first).unwrap(), "a");
        assert_eq!(expand_in(r"\newcommand{\t}{b}\t", &mut second).unwrap(), "b");
        assert_eq!(first.get("t").map(MacroDefinition::arity), Some(0));
    }

    #[test]
    fn test_definition_body_is_stored_unexpanded() {
        let mut context = MacroContext::new();
        expand_in(r"\newcommand{\a}{x}\newcommand{\b}{\a}", &mut context).unwrap();

        let body = context.get("b").unwrap().body();
        assert_eq!(serialize(body), r"\a");
        let names: Vec<&str> = context.definitions().map(MacroDefinition::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_split_placeholders() {
        assert_eq!(
            split_placeholders("<#1>#2#0"),
            vec![
                Piece::Text("<"),
                Piece::Argument(1),
                Piece::Text(">"),
                Piece::Argument(2),
                Piece::Text("#0"),
            ]
        );
        assert_eq!(split_placeholders("#"), vec![Piece::Text("#")]);
        assert!(!has_placeholder("#a #0"));
    }
}
