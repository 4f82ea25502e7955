//! Tokens produced by the [`lexer`](super::lexer).

use std::fmt;

use crate::span::Span;

/// Characters that always form a token of their own.
pub const STRUCTURAL: [char; 7] = ['\\', '{', '}', '[', ']', '_', '^'];

/// Token types for math expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// A maximal run of text without any structural character.
    Text(&'src str),

    Backslash,    // \
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Subscript,    // _
    Superscript,  // ^

    /// End of input, always the last token of a stream.
    Eof,
}

impl Token<'_> {
    /// Map a structural character to its token.
    pub fn from_symbol(c: char) -> Option<Token<'static>> {
        let token = match c {
            '\\' => Token::Backslash,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '_' => Token::Subscript,
            '^' => Token::Superscript,
            _ => return None,
        };
        Some(token)
    }

    /// The source text of a structural token.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Token::Backslash => Some("\\"),
            Token::LeftBrace => Some("{"),
            Token::RightBrace => Some("}"),
            Token::LeftBracket => Some("["),
            Token::RightBracket => Some("]"),
            Token::Subscript => Some("_"),
            Token::Superscript => Some("^"),
            Token::Text(_) | Token::Eof => None,
        }
    }

    /// Human readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Text(_) => "text",
            Token::Backslash => "`\\`",
            Token::LeftBrace => "`{`",
            Token::RightBrace => "`}`",
            Token::LeftBracket => "`[`",
            Token::RightBracket => "`]`",
            Token::Subscript => "`_`",
            Token::Superscript => "`^`",
            Token::Eof => "end of input",
        }
    }
}

/// A token with its position in the expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(text) => write!(f, "{text}"),
            Token::Eof => Ok(()),
            symbol => write!(f, "{}", symbol.symbol().unwrap_or_default()),
        }
    }
}
