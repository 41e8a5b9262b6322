use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_jobs;

/// Available squeeze subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every bundle
    ///
    /// Concatenates inputs, minifies the result and writes `<name>.min.<ext>`
    /// (plus `.gz` when enabled). Unchanged files are left untouched.
    Build(BuildArgs),

    /// Remove generated .min, .gz and .map files
    Clean(CleanArgs),

    /// Prepare the script minifier runtime without building
    ///
    /// Extracts the node + uglify-js archive into the cache directory so the
    /// first build does not pay for it.
    Warm(WarmArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Bundle definition file [default: bundleconfig.json]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only build the bundle with this outputFileName (repeatable)
    ///
    /// Examples:
    ///   squeeze build --bundle wwwroot/css/site.css
    ///   squeeze build -b js/app.js -b js/vendor.js
    #[arg(short, long = "bundle", value_name = "OUTPUT")]
    pub bundles: Vec<PathBuf>,

    /// Number of bundles to process in parallel
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

/// Arguments for the clean command
#[derive(Args, Debug, Clone, Default)]
pub struct CleanArgs {
    /// Bundle definition file [default: bundleconfig.json]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the warm command
#[derive(Args, Debug, Clone, Default)]
pub struct WarmArgs {
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

/// Where the script minifier runtime comes from and where it is unpacked
#[derive(Args, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// Gzip-compressed tar archive containing node_modules/uglify-js (and optionally node)
    #[arg(long, value_name = "FILE")]
    pub runtime_archive: Option<PathBuf>,

    /// Directory the runtime is extracted into [default: <temp>/squeeze<version>]
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}
