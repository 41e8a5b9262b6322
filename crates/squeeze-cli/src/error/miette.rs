//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // Keeps the engine's code, severity and help text.
        CliError::Engine(e) => Report::new(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::BundlesFailed { failed, total } => miette::miette!(
            code = "BUNDLES_FAILED",
            help = "See the errors above; bundles that succeeded were written.",
            "{} of {} bundle(s) failed",
            failed,
            total
        ),
        _ => miette::miette!(code = "BUILD_ERROR", "{}", err),
    }
}

/// Convert ConfigError to miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidJson { path, source } => miette::miette!(
            code = "INVALID_CONFIG",
            help = "bundleconfig.json must be an array of { outputFileName, inputFiles, minify } objects",
            "Invalid JSON in {}: {}",
            path.display(),
            source
        ),
        _ => miette::miette!(code = "CONFIG_ERROR", "Configuration error: {}", err),
    }
}
