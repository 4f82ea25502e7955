//! CLI logic for the mathfix tool.
//!
//! This module contains the core CLI logic: loading the configuration,
//! fixing a file or a directory tree, writing the results and reporting
//! what was done.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use config::ConfigSource;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use mathfix::{
    Fixer, MathfixError,
    content::{ContentUnit, FixedFile},
};

use error_adapter::{Reportable, skipped_reportables};

/// What a run did.
#[derive(Debug)]
pub struct RunReport {
    source: ConfigSource,
    files: Vec<FixedFile>,
    written: Vec<PathBuf>,
}

impl RunReport {
    /// Where the configuration came from.
    pub fn config_source(&self) -> &ConfigSource {
        &self.source
    }

    /// Every content file, in unit order.
    pub fn files(&self) -> &[FixedFile] {
        &self.files
    }

    /// The files written, in the order they were written.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Number of expressions left unchanged under the `skip` policy.
    pub fn skipped_count(&self) -> usize {
        self.files.iter().map(|file| file.skipped().len()).sum()
    }

    /// Warnings for the skipped expressions, ready for rendering.
    pub fn warnings(&self) -> Vec<Reportable<'_>> {
        self.files.iter().flat_map(skipped_reportables).collect()
    }
}

/// Run the mathfix CLI application
///
/// A directory input is fixed as a tree of content units; a file input is
/// a unit of its own. Without an output the changed files are rewritten in
/// place. With one, a directory input is mirrored below the output
/// directory and a file input is written to the output path.
///
/// # Errors
///
/// Returns `MathfixError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Math expressions that cannot be fixed under the `abort` policy
pub fn run(args: &Args) -> Result<RunReport, MathfixError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Fixing content"
    );

    let (app_config, source) = config::load_config(args.config.as_ref())?.into_parts();

    let input = Path::new(&args.input);
    let unit = if input.is_dir() {
        ContentUnit::load(input, app_config.content().extensions())?
    } else {
        ContentUnit::from_file(input)
    };
    debug!(files = unit.file_count(); "Content loaded");

    let fixer = Fixer::new(app_config);
    debug!(passes:? = fixer.pass_names(); "Passes enabled");
    let files = fixer.fix_unit(&unit)?;

    let mut written = Vec::new();
    for file in &files {
        let Some(target) = target_path(input, args.output.as_deref(), file)? else {
            debug!(path = file.path().display().to_string(); "File unchanged");
            continue;
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, file.fixed())?;
        debug!(path = target.display().to_string(); "File written");
        written.push(target);
    }

    let report = RunReport {
        source,
        files,
        written,
    };
    info!(
        files = report.files().len(),
        written = report.written().len(),
        skipped = report.skipped_count();
        "Content fixed"
    );

    Ok(report)
}

/// Where the fixed text of `file` goes, `None` when nothing needs writing.
fn target_path(
    input: &Path,
    output: Option<&str>,
    file: &FixedFile,
) -> Result<Option<PathBuf>, MathfixError> {
    let Some(output) = output else {
        return Ok(file.is_changed().then(|| file.path().to_path_buf()));
    };
    let output = Path::new(output);

    if !input.is_dir() {
        return Ok(Some(output.to_path_buf()));
    }

    let relative = file.path().strip_prefix(input).map_err(|_| {
        io::Error::other(format!(
            "{} is not inside {}",
            file.path().display(),
            input.display()
        ))
    })?;
    Ok(Some(output.join(relative)))
}
