//! Lexical analyzer for math expressions.
//!
//! The lexer splits the text of a math expression into text runs and
//! single-character structural tokens (see [`STRUCTURAL`]). Any input
//! decomposes this way, so lexing never fails.
//!
//! Text runs are not split here: the parser consumes a prefix of a run when
//! it needs a command name or a one character script operand.
//!
//! The public entry point is [`tokenize`].

use winnow::{
    Parser as _,
    combinator::alt,
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_till},
};

use crate::{
    span::Span,
    tokens::{PositionedToken, STRUCTURAL, Token},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

/// Parse one structural character.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    one_of(STRUCTURAL)
        .verify_map(Token::from_symbol)
        .parse_next(input)
}

/// Parse a run of text up to the next structural character.
fn text_run<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_till(1.., STRUCTURAL).map(Token::Text).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((symbol, text_run)).parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Split a math expression into tokens.
///
/// The returned stream always ends with exactly one [`Token::Eof`].
pub fn tokenize(input: &str) -> Vec<PositionedToken<'_>> {
    let mut located = LocatingSlice::new(input);
    let mut tokens = Vec::new();

    while located.eof_offset() > 0 {
        match positioned_token(&mut located) {
            Ok(token) => tokens.push(token),
            Err(_) => {
                // Both alternatives together accept any non-empty input; keep
                // whatever is left as text rather than dropping it.
                let start = located.current_token_start();
                let rest = located.next_slice(located.eof_offset());
                tokens.push(PositionedToken::new(
                    Token::Text(rest),
                    Span::new(start..start + rest.len()),
                ));
            }
        }
    }

    tokens.push(PositionedToken::new(
        Token::Eof,
        Span::new(input.len()..input.len()),
    ));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![Token::Eof]);
    }

    #[test]
    fn test_text_only() {
        assert_eq!(kinds("a + b"), vec![Token::Text("a + b"), Token::Eof]);
    }

    #[test]
    fn test_structural_symbols() {
        assert_eq!(
            kinds("\\{}[]_^"),
            vec![
                Token::Backslash,
                Token::LeftBrace,
                Token::RightBrace,
                Token::LeftBracket,
                Token::RightBracket,
                Token::Subscript,
                Token::Superscript,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_command_with_parameter() {
        assert_eq!(
            kinds("\\frac{a}{b} + c"),
            vec![
                Token::Backslash,
                Token::Text("frac"),
                Token::LeftBrace,
                Token::Text("a"),
                Token::RightBrace,
                Token::LeftBrace,
                Token::Text("b"),
                Token::RightBrace,
                Token::Text(" + c"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_runs_are_maximal() {
        assert_eq!(
            kinds("\\alpha2 x^ab"),
            vec![
                Token::Backslash,
                Token::Text("alpha2 x"),
                Token::Superscript,
                Token::Text("ab"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("é^{x}");

        assert_eq!(tokens[0].token, Token::Text("é"));
        assert_eq!(tokens[0].span, Span::new(0..2));
        assert_eq!(tokens[1].span, Span::new(2..3));
        assert_eq!(tokens[2].span, Span::new(3..4));
        assert_eq!(tokens[5].token, Token::Eof);
        assert_eq!(tokens[5].span, Span::new(6..6));
    }

    #[test]
    fn test_tokens_cover_input() {
        let input = "x_1^{2} \\alpha[3]";
        let rebuilt: String = tokenize(input).iter().map(|t| t.to_string()).collect();

        assert_eq!(rebuilt, input);
    }
}
