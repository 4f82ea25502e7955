//! Math region scanner.
//!
//! Splits a text document into plain text and the math regions embedded in
//! it: `$...$` for inline math and `$$...$$` for display math. A dollar
//! preceded by a backslash is text. A `$` that is never closed is text as
//! well, but a region opened with one delimiter and closed with the other
//! is an error.

use std::fmt;

use log::trace;
use winnow::{
    Parser as _,
    combinator::{alt, repeat},
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, take_till},
};

use mathfix_parser::{Diagnostic, ErrorCode, Span};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

/// How a math region is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `$...$`
    Inline,
    /// `$$...$$`
    Display,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Inline => "$",
            Delimiter::Display => "$$",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside of math, kept as is.
    Text(&'a str),

    /// A math region. `span` covers `content` only, without delimiters.
    Math {
        delimiter: Delimiter,
        content: &'a str,
        span: Span,
    },
}

impl Segment<'_> {
    /// Write the segment back in its original form.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Segment::Text(text) => out.push_str(text),
            Segment::Math {
                delimiter, content, ..
            } => {
                out.push_str(delimiter.as_str());
                out.push_str(content);
                out.push_str(delimiter.as_str());
            }
        }
    }
}

/// Parse a `$$` or `$` delimiter.
fn delimiter(input: &mut Input<'_>) -> IResult<Delimiter> {
    alt(("$$".value(Delimiter::Display), "$".value(Delimiter::Inline))).parse_next(input)
}

/// Parse a backslash and the character it escapes.
fn escaped(input: &mut Input<'_>) -> IResult<()> {
    ('\\', any).void().parse_next(input)
}

/// Parse the inside of a math region, up to the next unescaped `$`.
fn math_content<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    repeat::<_, _, (), _, _>(0.., alt((escaped, none_of(['$', '\\']).void())))
        .take()
        .parse_next(input)
}

type Region<'a> = (
    (Delimiter, std::ops::Range<usize>),
    (&'a str, std::ops::Range<usize>),
    (Delimiter, std::ops::Range<usize>),
);

/// Parse a whole region, delimiters included.
fn math_region<'a>(input: &mut Input<'a>) -> IResult<Region<'a>> {
    (
        delimiter.with_span(),
        math_content.with_span(),
        delimiter.with_span(),
    )
        .parse_next(input)
}

/// Skip one piece of text: an escape, a run without `$` or `\`, or a
/// single character.
fn text_piece(input: &mut Input<'_>) -> IResult<()> {
    alt((escaped, take_till(1.., ['$', '\\']).void(), any.void())).parse_next(input)
}

/// Split `document` into text and math segments.
///
/// Concatenating the segments with [`Segment::write_to`] gives back the
/// document.
///
/// # Errors
///
/// Returns an `E500` diagnostic when a region opened with `$` is closed
/// with `$$` or the other way around.
pub fn scan(document: &str) -> Result<Vec<Segment<'_>>, Diagnostic> {
    let mut input = LocatingSlice::new(document);
    let mut segments = Vec::new();
    let mut text_start = 0;

    while input.eof_offset() > 0 {
        let region_start = input.current_token_start();
        let checkpoint = input.checkpoint();

        match math_region.parse_next(&mut input) {
            Ok(((open, open_span), (content, span), (close, close_span))) => {
                if open != close {
                    return Err(Diagnostic::error("math delimiters do not match")
                        .with_code(ErrorCode::E500)
                        .with_label(Span::new(close_span), format!("closed with `{close}`"))
                        .with_secondary_label(
                            Span::new(open_span),
                            format!("opened with `{open}`"),
                        )
                        .with_help(format!("close the region with `{open}`")));
                }

                if text_start < region_start {
                    segments.push(Segment::Text(&document[text_start..region_start]));
                }
                trace!(delimiter = open.as_str(), start = span.start; "Found math region");
                segments.push(Segment::Math {
                    delimiter: open,
                    content,
                    span: Span::new(span),
                });
                text_start = input.current_token_start();
            }
            Err(_) => {
                input.reset(&checkpoint);
                if text_piece(&mut input).is_err() {
                    break;
                }
            }
        }
    }

    if text_start < document.len() {
        segments.push(Segment::Text(&document[text_start..]));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math(delimiter: Delimiter, content: &str, start: usize) -> Segment<'_> {
        Segment::Math {
            delimiter,
            content,
            span: Span::new(start..start + content.len()),
        }
    }

    fn reassemble(segments: &[Segment<'_>]) -> String {
        let mut out = String::new();
        for segment in segments {
            segment.write_to(&mut out);
        }
        out
    }

    #[test]
    fn test_document_without_math() {
        assert_eq!(scan("just text").unwrap(), vec![Segment::Text("just text")]);
        assert_eq!(scan("").unwrap(), vec![]);
    }

    #[test]
    fn test_inline_and_display_regions() {
        let document = "a $x^2$ b $$\\frac{1}{2}$$ c";
        let segments = scan(document).unwrap();

        assert_eq!(
            segments,
            vec![
                Segment::Text("a "),
                math(Delimiter::Inline, "x^2", 3),
                Segment::Text(" b "),
                math(Delimiter::Display, "\\frac{1}{2}", 12),
                Segment::Text(" c"),
            ]
        );
        assert_eq!(reassemble(&segments), document);
    }

    #[test]
    fn test_escaped_dollar_is_text() {
        let segments = scan(r"costs \$5 and $x\$y$").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text(r"costs \$5 and "),
                math(Delimiter::Inline, r"x\$y", 15),
            ]
        );
    }

    #[test]
    fn test_unclosed_dollar_is_text() {
        let document = "price: $5 only";
        assert_eq!(scan(document).unwrap(), vec![Segment::Text(document)]);
    }

    #[test]
    fn test_consecutive_regions() {
        let segments = scan("$a$ $$b$$").unwrap();
        assert_eq!(
            segments,
            vec![
                math(Delimiter::Inline, "a", 1),
                Segment::Text(" "),
                math(Delimiter::Display, "b", 6),
            ]
        );
    }

    #[test]
    fn test_regions_span_lines() {
        let segments = scan("$$\n\\begin{align}\nx\n\\end{align}\n$$").unwrap();
        assert_eq!(segments.len(), 1);
        assert!(matches!(
            segments[0],
            Segment::Math {
                delimiter: Delimiter::Display,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatched_delimiters_fail() {
        let err = scan("text $$x$ more").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E500));
        assert_eq!(err.labels()[0].span(), Span::new(8..9));
        assert_eq!(err.labels()[1].span(), Span::new(5..7));

        assert!(scan("$x$$").is_err());
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        // ===================
        // Strategies
        // ===================

        /// Strategy for arbitrary documents over a small alphabet that
        /// includes the delimiter and the escape character.
        fn document_strategy() -> impl Strategy<Value = String> {
            r"[ab $\\\n]{0,40}"
        }

        // ===================
        // Property Test Functions
        // ===================

        /// Scanning loses nothing: the segments give back the document.
        fn check_reassembles(document: &str) -> Result<(), TestCaseError> {
            if let Ok(segments) = scan(document) {
                prop_assert_eq!(reassemble(&segments), document);
                for segment in &segments {
                    if let Segment::Math { content, span, .. } = segment {
                        prop_assert_eq!(&document[span.range()], *content);
                    }
                }
            }
            Ok(())
        }

        /// Text without a dollar is a single text segment.
        fn check_plain_text(document: &str) -> Result<(), TestCaseError> {
            let segments = scan(document).map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(segments, vec![Segment::Text(document)]);
            Ok(())
        }

        proptest! {
            #[test]
            fn reassembles(document in document_strategy()) {
                check_reassembles(&document)?;
            }

            #[test]
            fn plain_text(document in "[a-z \\\\\n]{1,40}") {
                check_plain_text(&document)?;
            }
        }
    }
}
