//! The core diagnostic type for the math error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A rich diagnostic message with source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled source spans
/// - Optional help text with suggestions
///
/// Spans are byte offsets into the text the diagnostic was produced from.
/// For a math expression that is the text between the `$` delimiters;
/// [`Diagnostic::shifted`] moves them into the coordinates of the enclosing
/// document.
///
/// # Example
///
/// ```text
/// error[E201]: block `b` is closed by `\end{a}`
///   --> chapter1/intro.md:3:28
///    |
///  3 | $$\begin{a}\begin{b}x\end{a}\end{b}$$
///    |                     -------- expected `\end{b}`
///    |           ---------- `b` opened here
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use mathfix_parser::error::{Diagnostic, ErrorCode};
    /// # use mathfix_parser::Span;
    ///
    /// let span = Span::new(0..10);
    /// let diag = Diagnostic::error("macro `\\t` expects 1 argument, got 2")
    ///     .with_code(ErrorCode::E303)
    ///     .with_label(span, "used here")
    ///     .with_help("remove the extra group");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Move every label by `offset` bytes.
    ///
    /// Used to relocate a diagnostic produced for one math expression into
    /// the document that contains it.
    pub fn shifted(mut self, offset: usize) -> Self {
        for label in &mut self.labels {
            *label = label.shifted(offset);
        }
        self
    }

    /// Downgrade to a warning, keeping the code, labels and help.
    ///
    /// Used when an expression that failed is kept unchanged instead of
    /// aborting the run.
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E100]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
