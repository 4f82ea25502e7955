//! Mathfix - rewrite passes for LaTeX math embedded in text content.
//!
//! Finds the `$...$` and `$$...$$` regions of text files, parses each one
//! into a tree, runs the enabled rewrite passes over it and writes the
//! result back between the original delimiters. Macro definitions made with
//! `\newcommand` are expanded across all files of a content unit.

pub mod config;
pub mod content;
pub mod fixes;
pub mod scan;

mod error;

pub use error::MathfixError;

use std::{fs, path::Path};

use log::{debug, info, trace, warn};

use mathfix_parser::{Diagnostic, ParseError, parse_math, serialize};

use config::{AppConfig, ErrorPolicy};
use content::{ContentUnit, FixedFile};
use fixes::{Fix, MacroExpander, RenameEnvironments, TrimSpaces, UnitContext};
use scan::Segment;

/// Runs the rewrite passes over math expressions, files and content units.
///
/// # Examples
///
/// ```rust
/// use mathfix::{Fixer, config::AppConfig};
///
/// let fixer = Fixer::new(AppConfig::default());
/// let mut context = fixer.create_context();
///
/// let fixed = fixer
///     .fix_expression(r"\newcommand{\R}{\mathbb{R}} x \in \R ", &mut context)
///     .expect("Failed to fix");
/// assert_eq!(fixed, r"x \in \mathbb{R}");
///
/// // Definitions stay available for later expressions of the same unit
/// let fixed = fixer.fix_expression(r"\R^n", &mut context).expect("Failed to fix");
/// assert_eq!(fixed, r"\mathbb{R}^n");
/// ```
pub struct Fixer {
    config: AppConfig,
    passes: Vec<Box<dyn Fix>>,
}

impl Default for Fixer {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Fixer {
    /// Create a fixer running the passes enabled in `config`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mathfix::{Fixer, config::AppConfig};
    ///
    /// let fixer = Fixer::new(AppConfig::default());
    /// assert_eq!(
    ///     fixer.pass_names(),
    ///     vec!["expand-macros", "rename-environments", "trim-spaces"]
    /// );
    /// ```
    pub fn new(config: AppConfig) -> Self {
        let fixes = config.fixes();
        let mut passes: Vec<Box<dyn Fix>> = Vec::new();

        if fixes.expand_macros() {
            passes.push(Box::new(MacroExpander::new()));
        }
        if fixes.rename_environments() {
            passes.push(Box::new(RenameEnvironments::new(fixes.renames().clone())));
        }
        if fixes.trim_spaces() {
            passes.push(Box::new(TrimSpaces::new(fixes.pad_blocks())));
        }

        Self { config, passes }
    }

    /// Append a pass that runs after the configured ones.
    pub fn with_fix(mut self, fix: impl Fix + 'static) -> Self {
        self.passes.push(Box::new(fix));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Names of the passes, in the order they run.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Create the context for a new content unit.
    pub fn create_context(&self) -> UnitContext {
        UnitContext::new()
    }

    /// Fix the text of one math expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the expression does not parse or a pass
    /// fails. Spans are relative to `source`.
    pub fn fix_expression(
        &self,
        source: &str,
        context: &mut UnitContext,
    ) -> Result<String, ParseError> {
        let mut tree = parse_math(source)?;

        for pass in &self.passes {
            trace!(pass = pass.name(); "Running pass");
            pass.fix(&mut tree, context)?;
        }

        Ok(serialize(&tree))
    }

    /// Fix every math region of a text document.
    ///
    /// `path` only names the document in errors and logs. Expressions
    /// skipped under [`ErrorPolicy::Skip`] are logged as warnings; use
    /// [`Fixer::fix_file`] to get them as diagnostics instead.
    ///
    /// # Errors
    ///
    /// Returns [`MathfixError::Fix`] when the document has mismatched math
    /// delimiters, or when an expression fails and the error policy is
    /// [`ErrorPolicy::Abort`].
    pub fn fix_text(
        &self,
        text: &str,
        path: &Path,
        context: &mut UnitContext,
    ) -> Result<String, MathfixError> {
        let mut skipped = Vec::new();
        let fixed = self.fix_regions(text, path, context, &mut skipped)?;
        for diag in &skipped {
            warn!(path = path.display().to_string(); "Skipped expression: {diag}");
        }
        Ok(fixed)
    }

    /// Read and fix one file of a content unit.
    ///
    /// # Errors
    ///
    /// Returns [`MathfixError::Io`] when the file cannot be read, and the
    /// errors of [`Fixer::fix_text`].
    pub fn fix_file(
        &self,
        path: &Path,
        context: &mut UnitContext,
    ) -> Result<FixedFile, MathfixError> {
        let original = fs::read_to_string(path)?;
        let mut skipped = Vec::new();
        let fixed = self.fix_regions(&original, path, context, &mut skipped)?;
        if !skipped.is_empty() {
            info!(
                path = path.display().to_string(),
                skipped = skipped.len();
                "Expressions left unchanged"
            );
        }
        Ok(FixedFile::new(path, original, fixed).with_skipped(skipped))
    }

    fn fix_regions(
        &self,
        text: &str,
        path: &Path,
        context: &mut UnitContext,
        skipped: &mut Vec<Diagnostic>,
    ) -> Result<String, MathfixError> {
        let segments = scan::scan(text)
            .map_err(|diag| MathfixError::new_fix_error(path, diag.into(), text))?;
        let policy = self.config.content().on_error();

        let mut out = String::with_capacity(text.len());
        for segment in segments {
            let Segment::Math {
                delimiter,
                content,
                span,
            } = segment
            else {
                segment.write_to(&mut out);
                continue;
            };

            trace!(offset = span.start(), delimiter = delimiter.as_str(); "Fixing expression");
            let snapshot = (policy == ErrorPolicy::Skip).then(|| context.clone());
            let fixed = match self.fix_expression(content, context) {
                Ok(fixed) => fixed,
                Err(err) => {
                    let err = err.shifted(span.start());
                    let Some(snapshot) = snapshot else {
                        return Err(MathfixError::new_fix_error(path, err, text));
                    };
                    // Macros defined by the failed expression go with it
                    *context = snapshot;
                    debug!(
                        path = path.display().to_string(),
                        offset = span.start();
                        "Skipping expression"
                    );
                    skipped.extend(
                        err.diagnostics()
                            .iter()
                            .cloned()
                            .map(Diagnostic::into_warning),
                    );
                    content.to_string()
                }
            };

            out.push_str(delimiter.as_str());
            out.push_str(&fixed);
            out.push_str(delimiter.as_str());
        }

        Ok(out)
    }

    /// Fix a content unit and its children.
    ///
    /// Each unit gets a fresh [`UnitContext`], shared by its files in
    /// order. Nothing is written; the caller decides where the results go.
    ///
    /// # Errors
    ///
    /// Returns [`MathfixError::Io`] when a file cannot be read, and the
    /// errors of [`Fixer::fix_text`].
    pub fn fix_unit(&self, unit: &ContentUnit) -> Result<Vec<FixedFile>, MathfixError> {
        let mut fixed = Vec::with_capacity(unit.file_count());
        self.fix_unit_into(unit, &mut fixed)?;
        Ok(fixed)
    }

    fn fix_unit_into(
        &self,
        unit: &ContentUnit,
        fixed: &mut Vec<FixedFile>,
    ) -> Result<(), MathfixError> {
        info!(
            path = unit.path().display().to_string(),
            files = unit.files().len();
            "Fixing content unit"
        );

        let mut context = self.create_context();
        for path in unit.files() {
            info!(path = path.display().to_string(); "Fixing file");
            fixed.push(self.fix_file(path, &mut context)?);
        }
        debug!(
            path = unit.path().display().to_string(),
            macros = context.macros().len();
            "Content unit fixed"
        );

        for child in unit.children() {
            self.fix_unit_into(child, fixed)?;
        }
        Ok(())
    }
}
