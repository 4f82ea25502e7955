//! Error codes for the math diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Parser errors
//! - `E2xx` - Block resolution errors
//! - `E3xx` - Macro expansion errors
//! - `E4xx` - Tree surgery errors
//! - `E5xx` - Document scanning errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position,
    /// such as a stray `}` or a backslash followed by nothing usable.
    E100,

    /// Unterminated group.
    ///
    /// The input ended while a `{` or `[` was still open.
    E101,

    /// Empty command name.
    ///
    /// A backslash was followed by text that does not start with a letter
    /// or a known symbol command.
    E102,

    /// Missing script operand.
    ///
    /// A `^` or `_` was not followed by a character, a group or a command.
    E103,

    // =========================================================================
    // Block Errors (E2xx)
    // =========================================================================
    /// Invalid block name.
    ///
    /// The first parameter of `\begin` or `\end` is not a plain name made of
    /// letters and `*`.
    E200,

    /// Block name mismatch.
    ///
    /// An `\end` closes a different block than the innermost open one.
    E201,

    /// Block context mismatch.
    ///
    /// An `\end` is not at the same nesting level (or in the same sequence)
    /// as its `\begin`.
    E202,

    /// Unclosed block.
    ///
    /// A `\begin` has no matching `\end`.
    E203,

    /// Unopened block.
    ///
    /// An `\end` appears while no block is open.
    E204,

    // =========================================================================
    // Macro Errors (E3xx)
    // =========================================================================
    /// Malformed macro definition.
    ///
    /// `\newcommand` does not have the shape `{\name}[n]{body}`.
    E300,

    /// Invalid macro name.
    ///
    /// The name parameter of `\newcommand` is not a single command.
    E301,

    /// Invalid argument count.
    ///
    /// The optional argument count is not a bracketed number between 0 and 9.
    E302,

    /// Wrong number of arguments.
    ///
    /// A macro was used with a different number of arguments than declared.
    E303,

    /// Placeholder out of range.
    ///
    /// A `#n` placeholder refers to an argument beyond the declared count.
    E304,

    /// Duplicate macro definition.
    ///
    /// The same macro was defined twice in one processing context.
    E305,

    /// Misplaced macro definition.
    ///
    /// A definition appears where it cannot be removed from the expression,
    /// for instance as the operand of `^` or `_`.
    E306,

    // =========================================================================
    // Tree Surgery Errors (E4xx)
    // =========================================================================
    /// Invalid tree surgery.
    ///
    /// A rewrite tried to splice a sequence in place of a single node (or the
    /// reverse), or to delete a node that is not part of a sequence.
    E400,

    // =========================================================================
    // Document Errors (E5xx)
    // =========================================================================
    /// Mismatched math delimiters.
    ///
    /// A math region opened with `$` was closed with `$$`, or the reverse.
    E500,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Block errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            // Macro errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            // Tree surgery errors
            ErrorCode::E400 => "E400",
            // Document errors
            ErrorCode::E500 => "E500",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unterminated group",
            ErrorCode::E102 => "empty command name",
            ErrorCode::E103 => "missing script operand",
            // Block errors
            ErrorCode::E200 => "invalid block name",
            ErrorCode::E201 => "block name mismatch",
            ErrorCode::E202 => "block context mismatch",
            ErrorCode::E203 => "unclosed block",
            ErrorCode::E204 => "unopened block",
            // Macro errors
            ErrorCode::E300 => "malformed macro definition",
            ErrorCode::E301 => "invalid macro name",
            ErrorCode::E302 => "invalid argument count",
            ErrorCode::E303 => "wrong number of arguments",
            ErrorCode::E304 => "placeholder out of range",
            ErrorCode::E305 => "duplicate macro definition",
            ErrorCode::E306 => "misplaced macro definition",
            // Tree surgery errors
            ErrorCode::E400 => "invalid tree surgery",
            // Document errors
            ErrorCode::E500 => "mismatched math delimiters",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
