//! Error types for mathfix operations.
//!
//! This module provides the main error type [`MathfixError`] which wraps
//! the failures that can occur while fixing content.

use std::{io, path::PathBuf};

use thiserror::Error;

use mathfix_parser::error::ParseError;

/// The main error type for mathfix operations.
///
/// # Diagnostic Variants
///
/// The `Fix` variant carries the diagnostics of a failing math expression
/// together with the file they point into. Their spans are byte offsets
/// into `src`, the whole text of the file at `path`.
#[derive(Debug, Error)]
pub enum MathfixError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{}: {err}", path.display())]
    Fix {
        path: PathBuf,
        err: ParseError,
        src: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MathfixError {
    /// Create a new `Fix` error for the file at `path` with text `src`.
    pub fn new_fix_error(path: impl Into<PathBuf>, err: ParseError, src: impl Into<String>) -> Self {
        Self::Fix {
            path: path.into(),
            err,
            src: src.into(),
        }
    }
}
