//! Parser for math expression tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! syntax elements defined in [`parser_types`](super::parser_types), then lays
//! them out in a [`Tree`]. The public entry point is [`build_tree`].
//!
//! The parser looks at one token at a time. A text run may be consumed only
//! partially: a script takes the first character of the run as its operand,
//! and a command takes the longest alphabetic prefix as its name. The
//! rest of the run stays in place as the current token.

use log::trace;

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    parser_types::Element,
    span::Span,
    tokens::{PositionedToken, Token},
    tree::{Node, NodeId, ScriptMarker, Tree},
};

/// Command names made of one punctuation character. They take no parameters.
pub const SYMBOL_COMMANDS: [char; 11] = [',', '!', '>', ';', ':', '|', ' ', '#', '%', '&', '$'];

struct Parser<'src> {
    tokens: Vec<PositionedToken<'src>>,
    position: usize,
}

impl<'src> Parser<'src> {
    fn new(tokens: &[PositionedToken<'src>]) -> Self {
        let mut tokens = tokens.to_vec();
        if tokens.last().is_none_or(|last| last.token != Token::Eof) {
            let end = tokens.last().map_or(0, |last| last.span.end());
            tokens.push(PositionedToken::new(Token::Eof, Span::new(end..end)));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> PositionedToken<'src> {
        self.tokens[self.position]
    }

    /// Move to the next token. The end-of-input token is never passed.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consume the first `len` bytes of the current text run.
    ///
    /// The remainder, if any, becomes the current token.
    fn consume_prefix(&mut self, len: usize) -> (&'src str, Span) {
        let current = self.current();
        let Token::Text(text) = current.token else {
            return ("", current.span.take(0));
        };

        let (prefix, rest) = text.split_at(len.min(text.len()));
        if rest.is_empty() {
            self.advance();
        } else {
            self.tokens[self.position] =
                PositionedToken::new(Token::Text(rest), current.span.skip(prefix.len()));
        }
        (prefix, current.span.take(prefix.len()))
    }

    /// Parse elements up to `closer` or the end of input, without consuming
    /// either.
    fn elements(&mut self, closer: Token<'static>) -> Result<Vec<Element<'src>>> {
        let mut elements = Vec::new();
        loop {
            let current = self.current();
            if current.token == closer || current.token == Token::Eof {
                return Ok(elements);
            }
            elements.push(self.element()?);
        }
    }

    fn element(&mut self) -> Result<Element<'src>> {
        let current = self.current();
        match current.token {
            Token::Text(text) => {
                self.advance();
                Ok(Element::Text {
                    text,
                    span: current.span,
                })
            }
            Token::LeftBrace => self.group(),
            Token::LeftBracket | Token::RightBracket => {
                // Not opening a parameter: the bracket is plain text.
                self.advance();
                Ok(Element::Text {
                    text: current.token.symbol().unwrap_or_default(),
                    span: current.span,
                })
            }
            Token::Subscript | Token::Superscript => self.script(),
            Token::Backslash => self.command_or_escaped(),
            Token::RightBrace => Err(Diagnostic::error("unexpected `}`")
                .with_code(ErrorCode::E100)
                .with_label(current.span, "no group to close here")
                .with_help("write `\\}` for a literal closing brace")),
            Token::Eof => Err(Diagnostic::error("unexpected end of input")
                .with_code(ErrorCode::E100)
                .with_label(current.span, "expected an element")),
        }
    }

    /// Parse a `{...}` or `[...]` group.
    fn group(&mut self) -> Result<Element<'src>> {
        let open = self.current();
        let (bracketed, closer) = match open.token {
            Token::LeftBrace => (false, Token::RightBrace),
            Token::LeftBracket => (true, Token::RightBracket),
            other => {
                return Err(Diagnostic::error(format!(
                    "expected `{{` or `[`, found {}",
                    other.describe()
                ))
                .with_code(ErrorCode::E100)
                .with_label(open.span, "expected a group"));
            }
        };
        self.advance();

        let elements = self.elements(closer)?;

        let close = self.current();
        if close.token != closer {
            return Err(Diagnostic::error("unterminated group")
                .with_code(ErrorCode::E101)
                .with_label(open.span, "group opened here")
                .with_secondary_label(close.span, "input ends here")
                .with_help(format!("add the closing {}", closer.describe())));
        }
        self.advance();

        Ok(Element::Group {
            elements,
            bracketed,
            span: open.span.union(close.span),
        })
    }

    /// Parse `^` or `_` and its single atomic operand.
    fn script(&mut self) -> Result<Element<'src>> {
        let marker_token = self.current();
        let marker = if marker_token.token == Token::Superscript {
            ScriptMarker::Superscript
        } else {
            ScriptMarker::Subscript
        };
        self.advance();

        let current = self.current();
        let operand = match current.token {
            Token::Text(text) => {
                let width = text.chars().next().map_or(0, char::len_utf8);
                let (character, span) = self.consume_prefix(width);
                Element::Text {
                    text: character,
                    span,
                }
            }
            Token::LeftBrace => self.group()?,
            Token::Backslash => self.command_or_escaped()?,
            other => {
                return Err(Diagnostic::error(format!(
                    "missing operand after `{}`",
                    marker.symbol()
                ))
                .with_code(ErrorCode::E103)
                .with_label(marker_token.span, "this script has no operand")
                .with_secondary_label(current.span, format!("found {}", other.describe()))
                .with_help(format!("wrap the operand in braces: `{}{{...}}`", marker.symbol())));
            }
        };

        let span = marker_token.span.union(operand.span());
        Ok(Element::Script {
            marker,
            operand: Box::new(operand),
            span,
        })
    }

    /// Parse what follows a backslash: an escaped structural symbol or a
    /// command with its parameter groups.
    fn command_or_escaped(&mut self) -> Result<Element<'src>> {
        let backslash = self.current();
        self.advance();
        let current = self.current();

        if let Some(symbol) = current.token.symbol() {
            self.advance();
            return Ok(Element::Escape {
                symbol,
                span: backslash.span.union(current.span),
            });
        }

        let Token::Text(text) = current.token else {
            return Err(Diagnostic::error("expected a command name after `\\`")
                .with_code(ErrorCode::E102)
                .with_label(backslash.span, "backslash at end of input")
                .with_help("write `\\\\` for a literal backslash"));
        };

        let first = text.chars().next().unwrap_or_default();
        if SYMBOL_COMMANDS.contains(&first) {
            let (name, name_span) = self.consume_prefix(first.len_utf8());
            return Ok(Element::Command {
                name,
                parameters: Vec::new(),
                span: backslash.span.union(name_span),
            });
        }

        let len = text
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(text.len());
        if len == 0 {
            let offending = current.span.take(first.len_utf8());
            return Err(Diagnostic::error("empty command name")
                .with_code(ErrorCode::E102)
                .with_label(backslash.span.union(offending), "no command name here")
                .with_help(
                    "command names are made of letters; a literal backslash is written `\\\\`",
                ));
        }
        let (name, name_span) = self.consume_prefix(len);

        let mut span = backslash.span.union(name_span);
        let mut parameters = Vec::new();
        while matches!(self.current().token, Token::LeftBrace | Token::LeftBracket) {
            let parameter = self.group()?;
            span = span.union(parameter.span());
            parameters.push(parameter);
        }

        Ok(Element::Command {
            name,
            parameters,
            span,
        })
    }
}

/// Parse a whole token stream into syntax elements.
fn parse_elements<'src>(tokens: &[PositionedToken<'src>]) -> Result<Vec<Element<'src>>> {
    let mut parser = Parser::new(tokens);
    // A top-level `}` is reported by `element`, so only the end of input can
    // stop this.
    parser.elements(Token::Eof)
}

/// Lay out `elements` as a chain, merging adjacent text into one literal.
fn build_sequence(tree: &mut Tree, elements: Vec<Element<'_>>, fallback: Span) -> NodeId {
    let mut heads = Vec::with_capacity(elements.len());
    let mut pending: Option<(String, Span)> = None;

    for element in elements {
        match element {
            Element::Text { text, span } => push_text(&mut pending, text, "", span),
            Element::Escape { symbol, span } => push_text(&mut pending, "\\", symbol, span),
            other => {
                if let Some((text, span)) = pending.take() {
                    heads.push(tree.literal(text, span));
                }
                heads.push(build_element(tree, other));
            }
        }
    }
    if let Some((text, span)) = pending.take() {
        heads.push(tree.literal(text, span));
    }

    tree.chain(heads, fallback)
}

fn push_text(pending: &mut Option<(String, Span)>, first: &str, second: &str, span: Span) {
    match pending {
        Some((text, pending_span)) => {
            text.push_str(first);
            text.push_str(second);
            *pending_span = pending_span.union(span);
        }
        None => *pending = Some((format!("{first}{second}"), span)),
    }
}

fn build_element(tree: &mut Tree, element: Element<'_>) -> NodeId {
    match element {
        Element::Text { text, span } => tree.literal(text, span),
        Element::Escape { symbol, span } => tree.literal(format!("\\{symbol}"), span),
        Element::Group {
            elements,
            bracketed,
            span,
        } => {
            let inner = build_sequence(tree, elements, span.skip(1).take(0));
            tree.alloc(Node::Group { inner, bracketed }, span)
        }
        Element::Script {
            marker,
            operand,
            span,
        } => {
            let operand = build_element(tree, *operand);
            tree.alloc(Node::Script { marker, operand }, span)
        }
        Element::Command {
            name,
            parameters,
            span,
        } => {
            let parameters = parameters
                .into_iter()
                .map(|parameter| build_element(tree, parameter))
                .collect();
            tree.alloc(
                Node::Command {
                    name: name.to_string(),
                    parameters,
                },
                span,
            )
        }
    }
}

/// Build a tree from tokens
pub fn build_tree(tokens: &[PositionedToken<'_>]) -> Result<Tree> {
    let elements = parse_elements(tokens)?;
    trace!(elements = elements.len(); "Parsed top-level elements");

    let mut tree = Tree::detached();
    let root = build_sequence(&mut tree, elements, Span::new(0..0));
    tree.set_root(root);
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn elements(input: &str) -> Vec<Element<'_>> {
        parse_elements(&tokenize(input)).expect("input should parse")
    }

    fn error(input: &str) -> Diagnostic {
        parse_elements(&tokenize(input)).expect_err("input should not parse")
    }

    #[test]
    fn test_consume_prefix_splits_run() {
        let tokens = tokenize("abc}");
        let mut parser = Parser::new(&tokens);

        assert_eq!(parser.consume_prefix(1), ("a", Span::new(0..1)));
        assert_eq!(parser.current().token, Token::Text("bc"));
        assert_eq!(parser.current().span, Span::new(1..3));

        assert_eq!(parser.consume_prefix(2), ("bc", Span::new(1..3)));
        assert_eq!(parser.current().token, Token::RightBrace);
    }

    #[test]
    fn test_parser_appends_missing_eof() {
        let tokens = vec![PositionedToken::new(Token::Text("x"), Span::new(0..1))];
        let parser = Parser::new(&tokens);

        assert_eq!(parser.tokens.len(), 2);
        assert_eq!(parser.tokens[1].span, Span::new(1..1));
    }

    #[test]
    fn test_script_takes_first_character() {
        let parsed = elements("x^ab");

        assert_eq!(parsed.len(), 3);
        let Element::Script { operand, span, .. } = &parsed[1] else {
            panic!("expected a script, got {:?}", parsed[1]);
        };
        assert_eq!(
            **operand,
            Element::Text {
                text: "a",
                span: Span::new(2..3)
            }
        );
        assert_eq!(*span, Span::new(1..3));
        assert_eq!(
            parsed[2],
            Element::Text {
                text: "b",
                span: Span::new(3..4)
            }
        );
    }

    #[test]
    fn test_script_operand_is_multibyte_character() {
        let parsed = elements("x_éa");

        let Element::Script { operand, .. } = &parsed[1] else {
            panic!("expected a script");
        };
        assert_eq!(
            **operand,
            Element::Text {
                text: "é",
                span: Span::new(2..4)
            }
        );
    }

    #[test]
    fn test_command_name_is_alphabetic_prefix() {
        let parsed = elements("\\alpha2{x}");

        assert_eq!(parsed.len(), 3);
        assert!(matches!(
            parsed[0],
            Element::Command {
                name: "alpha",
                ref parameters,
                ..
            } if parameters.is_empty()
        ));
    }

    #[test]
    fn test_command_name_may_be_non_ascii() {
        let parsed = elements("\\αβ2 \\größe{x}");

        assert!(matches!(parsed[0], Element::Command { name: "αβ", .. }));
        assert_eq!(parsed[0].span(), Span::new(0..5));
        assert!(matches!(
            parsed[2],
            Element::Command {
                name: "größe",
                ref parameters,
                ..
            } if parameters.len() == 1
        ));
    }

    #[test]
    fn test_command_takes_adjacent_groups() {
        let parsed = elements("\\sqrt[3]{x} y");

        let Element::Command {
            name,
            parameters,
            span,
        } = &parsed[0]
        else {
            panic!("expected a command");
        };
        assert_eq!(*name, "sqrt");
        assert_eq!(parameters.len(), 2);
        assert!(matches!(parameters[0], Element::Group { bracketed: true, .. }));
        assert!(matches!(parameters[1], Element::Group { bracketed: false, .. }));
        assert_eq!(*span, Span::new(0..11));
    }

    #[test]
    fn test_symbol_command_takes_no_parameters() {
        let parsed = elements("\\,{x}");

        assert!(matches!(
            parsed[0],
            Element::Command {
                name: ",",
                ref parameters,
                ..
            } if parameters.is_empty()
        ));
        assert!(matches!(parsed[1], Element::Group { .. }));
    }

    #[test]
    fn test_escapes() {
        let parsed = elements("\\{\\\\\\_");

        assert_eq!(
            parsed,
            vec![
                Element::Escape {
                    symbol: "{",
                    span: Span::new(0..2)
                },
                Element::Escape {
                    symbol: "\\",
                    span: Span::new(2..4)
                },
                Element::Escape {
                    symbol: "_",
                    span: Span::new(4..6)
                },
            ]
        );
    }

    #[test]
    fn test_free_brackets_are_text() {
        let parsed = elements("[a]");

        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().all(Element::is_textual));
    }

    #[test]
    fn test_unexpected_closing_brace() {
        let err = error("a}");

        assert_eq!(err.code(), Some(ErrorCode::E100));
        assert_eq!(err.labels()[0].span(), Span::new(1..2));
    }

    #[test]
    fn test_closing_brace_inside_brackets() {
        let err = error("\\sqrt[a}");
        assert_eq!(err.code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_unterminated_group() {
        let err = error("x{y[z]");

        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert_eq!(err.labels()[0].span(), Span::new(1..2));
    }

    #[test]
    fn test_empty_command_name() {
        assert_eq!(error("\\1").code(), Some(ErrorCode::E102));
        assert_eq!(error("a\\").code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_missing_script_operand() {
        for input in ["x^", "x^}", "x_[1]", "x^^2"] {
            assert_eq!(error(input).code(), Some(ErrorCode::E103), "input {input:?}");
        }
    }

    #[test]
    fn test_build_tree_merges_text() {
        let tree = build_tree(&tokenize("a[b]\\{c")).unwrap();

        let heads: Vec<&Node> = tree.cells(tree.root()).map(|(_, head)| tree.node(head)).collect();
        assert_eq!(heads, vec![&Node::Literal("a[b]\\{c".into())]);
        assert_eq!(tree.span(tree.root()), Span::new(0..7));
    }

    #[test]
    fn test_build_tree_empty_group() {
        let tree = build_tree(&tokenize("{}")).unwrap();

        let group = tree.head(tree.root()).unwrap();
        let Node::Group { inner, bracketed } = tree.node(group) else {
            panic!("expected a group");
        };
        assert!(!bracketed);
        assert_eq!(tree.node(tree.head(*inner).unwrap()), &Node::Empty);
        assert_eq!(tree.span(*inner), Span::new(1..1));
    }
}
