//! Configuration types for fixing math content.
//!
//! This module provides configuration structures that select the rewrite
//! passes and describe which files make up the content. All types implement
//! [`serde::Deserialize`] for loading from external sources; every field is
//! optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining fix and content settings.
//! - [`FixConfig`] - Controls which passes run and how they behave.
//! - [`ContentConfig`] - Controls which files are read and what happens on errors.
//!
//! # Example
//!
//! ```
//! # use mathfix::config::{AppConfig, ErrorPolicy};
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.fixes().expand_macros());
//! assert_eq!(config.content().on_error(), ErrorPolicy::Abort);
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::fixes::default_renames;

/// Top-level application configuration combining fix and content settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Fix configuration section.
    #[serde(default)]
    fixes: FixConfig,

    /// Content configuration section.
    #[serde(default)]
    content: ContentConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified fix and content configurations.
    pub fn new(fixes: FixConfig, content: ContentConfig) -> Self {
        Self { fixes, content }
    }

    /// Returns the fix configuration.
    pub fn fixes(&self) -> &FixConfig {
        &self.fixes
    }

    /// Returns the content configuration.
    pub fn content(&self) -> &ContentConfig {
        &self.content
    }
}

/// Selection and settings of the rewrite passes.
///
/// Passes run in a fixed order: macro expansion, environment renaming,
/// whitespace trimming.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Expand `\newcommand` macros.
    expand_macros: bool,

    /// Rename environments according to `rename`.
    rename_environments: bool,

    /// Strip whitespace at both ends of each expression.
    trim_spaces: bool,

    /// Put expressions holding an environment on lines of their own.
    pad_blocks: bool,

    /// Environment renames, old name to new name.
    rename: IndexMap<String, String>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            expand_macros: true,
            rename_environments: true,
            trim_spaces: true,
            pad_blocks: true,
            rename: default_renames(),
        }
    }
}

impl FixConfig {
    pub fn expand_macros(&self) -> bool {
        self.expand_macros
    }

    pub fn rename_environments(&self) -> bool {
        self.rename_environments
    }

    pub fn trim_spaces(&self) -> bool {
        self.trim_spaces
    }

    pub fn pad_blocks(&self) -> bool {
        self.pad_blocks
    }

    /// Returns the environment renames, in configuration order.
    pub fn renames(&self) -> &IndexMap<String, String> {
        &self.rename
    }
}

/// What to do when a math expression cannot be fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop and report the error.
    #[default]
    Abort,

    /// Leave the expression untouched and log a warning.
    Skip,
}

/// Which files make up the content.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// File extensions to fix, without the dot.
    extensions: Vec<String>,

    /// Policy for expressions that fail to parse or expand.
    on_error: ErrorPolicy,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "txt".to_string()],
            on_error: ErrorPolicy::default(),
        }
    }
}

impl ContentConfig {
    /// Creates a new [`ContentConfig`].
    pub fn new(extensions: Vec<String>, on_error: ErrorPolicy) -> Self {
        Self {
            extensions,
            on_error,
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn on_error(&self) -> ErrorPolicy {
        self.on_error
    }
}
