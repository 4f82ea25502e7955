//! Syntax elements produced by the [`parser`](super::parser) before they are
//! laid out in a [`Tree`](crate::Tree).

use crate::{span::Span, tree::ScriptMarker};

/// One element of a math expression as it appears in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element<'src> {
    /// Plain text, including brackets that do not open a parameter.
    Text { text: &'src str, span: Span },

    /// A backslash followed by a structural symbol, such as `\{`.
    Escape { symbol: &'src str, span: Span },

    /// `{...}` or `[...]`.
    Group {
        elements: Vec<Element<'src>>,
        bracketed: bool,
        span: Span,
    },

    Script {
        marker: ScriptMarker,
        operand: Box<Element<'src>>,
        span: Span,
    },

    Command {
        name: &'src str,
        parameters: Vec<Element<'src>>,
        span: Span,
    },
}

impl Element<'_> {
    pub fn span(&self) -> Span {
        match self {
            Element::Text { span, .. }
            | Element::Escape { span, .. }
            | Element::Group { span, .. }
            | Element::Script { span, .. }
            | Element::Command { span, .. } => *span,
        }
    }

    /// Returns `true` for elements that end up in a literal.
    pub fn is_textual(&self) -> bool {
        matches!(self, Element::Text { .. } | Element::Escape { .. })
    }
}
