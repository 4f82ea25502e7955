//! Error and diagnostic system for the math parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Diagnostics are wrapped in [`ParseError`] when
//! returned from the parsing lifecycle (parsing and block resolution).
//!
//! Rewrite passes report failures as a bare [`Diagnostic`]; the caller decides
//! how to attach the file path and source text.
//!
//! # Example
//!
//! ```
//! # use mathfix_parser::error::{Diagnostic, ErrorCode};
//! # use mathfix_parser::Span;
//!
//! let span = Span::new(10..22);
//! let original_span = Span::new(0..9);
//!
//! let diag = Diagnostic::error("macro `\\t` is defined twice")
//!     .with_code(ErrorCode::E305)
//!     .with_label(span, "duplicate definition")
//!     .with_secondary_label(original_span, "first defined here")
//!     .with_help("rename one of the macros");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
