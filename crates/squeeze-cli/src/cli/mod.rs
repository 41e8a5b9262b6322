//! Command-line interface definition for squeeze.
//!
//! - `squeeze build` - concatenate, minify and gzip every bundle in `bundleconfig.json`
//! - `squeeze clean` - remove the files `build` produced
//! - `squeeze warm` - extract the script minifier runtime ahead of time

mod commands;
mod tests;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, CleanArgs, Command, RuntimeArgs, WarmArgs};
pub use validation::parse_jobs;

/// squeeze - change-aware bundling and minification for web assets
#[derive(Parser, Debug)]
#[command(
    name = "squeeze",
    version,
    about = "Bundle, minify and gzip web assets",
    long_about = "Squeeze reads bundle definitions from bundleconfig.json, concatenates each\n\
                  bundle's inputs, minifies JavaScript, CSS and HTML, and writes .min and .gz\n\
                  files only when their content actually changed."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows skipped files, minifier selection and the exact command line of
    /// the script minifier.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
