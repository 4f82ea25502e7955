//! Content units: the directories and files a [`Fixer`](crate::Fixer) works on.
//!
//! A directory is one unit. Its text files are fixed in name order and
//! share one [`UnitContext`](crate::fixes::UnitContext); each subdirectory
//! is a child unit with a context of its own.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use mathfix_parser::Diagnostic;

use crate::error::MathfixError;

/// A directory of text files and its subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    path: PathBuf,
    files: Vec<PathBuf>,
    children: Vec<ContentUnit>,
}

impl ContentUnit {
    /// Load the unit rooted at `dir`.
    ///
    /// Files are kept when their extension is one of `extensions`. Entries
    /// whose name starts with a dot are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MathfixError::Io`] when a directory cannot be read.
    pub fn load(dir: impl AsRef<Path>, extensions: &[String]) -> Result<Self, MathfixError> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        let mut subdirs = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if is_hidden(&path) {
                continue;
            }
            if path.is_dir() {
                subdirs.push(path);
            } else if has_extension(&path, extensions) {
                files.push(path);
            }
        }
        files.sort();
        subdirs.sort();

        let children = subdirs
            .into_iter()
            .map(|subdir| Self::load(subdir, extensions))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            path = dir.display().to_string(),
            files = files.len(),
            children = children.len();
            "Loaded content unit"
        );

        Ok(Self {
            path: dir.to_path_buf(),
            files,
            children,
        })
    }

    /// A unit made of one file.
    pub fn from_file(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let path = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            path,
            files: vec![file],
            children: Vec::new(),
        }
    }

    /// The directory of this unit.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files of this unit, in processing order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn children(&self) -> &[ContentUnit] {
        &self.children
    }

    /// Number of files in this unit and all of its descendants.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(Self::file_count).sum::<usize>()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extensions.iter().any(|wanted| wanted == extension))
}

/// The outcome of fixing one file.
///
/// Under the `skip` error policy an expression that failed is kept as it
/// was; its diagnostics are carried here as warnings.
#[derive(Debug, Clone)]
pub struct FixedFile {
    path: PathBuf,
    original: String,
    fixed: String,
    skipped: Vec<Diagnostic>,
}

impl FixedFile {
    pub fn new(path: impl Into<PathBuf>, original: String, fixed: String) -> Self {
        Self {
            path: path.into(),
            original,
            fixed,
            skipped: Vec::new(),
        }
    }

    /// Attach the warnings of the expressions left unchanged.
    pub fn with_skipped(mut self, skipped: Vec<Diagnostic>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn fixed(&self) -> &str {
        &self.fixed
    }

    /// Whether fixing changed the text.
    pub fn is_changed(&self) -> bool {
        self.original != self.fixed
    }

    /// Warnings for the expressions left unchanged, with spans into
    /// [`FixedFile::original`].
    pub fn skipped(&self) -> &[Diagnostic] {
        &self.skipped
    }
}
