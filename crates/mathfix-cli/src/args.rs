//! Command-line argument definitions for the mathfix CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input and output locations,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the mathfix tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input file or content directory
    #[arg(help = "Path to the input file or directory")]
    pub input: String,

    /// Where to write the fixed content; the input is rewritten in place when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
