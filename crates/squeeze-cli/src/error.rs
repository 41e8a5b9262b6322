//! Error types for the squeeze CLI.
//!
//! - [`CliError`] is what commands return; domain errors convert into it.
//! - [`ConfigError`] covers `bundleconfig.json` and tool settings.
//! - [`BuildError`] covers bundle assembly and the final build verdict.
//! - Engine failures arrive as [`squeeze::Error`] and keep their diagnostic codes.

pub mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Errors from the minification engine
    #[error(transparent)]
    Engine(#[from] squeeze::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Errors loading `bundleconfig.json` or the tool settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}\n\nHint: Create a bundleconfig.json file or specify --config <path>", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid JSON in {}: {source}\n\nHint: bundleconfig.json must be an array of bundle objects", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Bundle assembly and build outcome errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An input listed in `inputFiles` does not exist
    #[error("Input file not found: {}\n\nReferenced by: {}\n\nHint: Check the 'inputFiles' paths, they are relative to bundleconfig.json", .input.display(), .bundle.display())]
    InputNotFound { input: PathBuf, bundle: PathBuf },

    /// An input exists but could not be read as text
    #[error("Failed to read input {}: {source}", .input.display())]
    InputUnreadable {
        input: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The unminified bundle output could not be written
    #[error("Failed to write bundle {}: {source}\n\nHint: Check output directory permissions", .output.display())]
    OutputWriteFailed {
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more bundles failed; details were already reported
    #[error("{failed} of {total} bundle(s) failed")]
    BundlesFailed { failed: usize, total: usize },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("bundleconfig.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("bundleconfig.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_input_not_found_names_both_files() {
        let err = BuildError::InputNotFound {
            input: PathBuf::from("/site/css/missing.css"),
            bundle: PathBuf::from("css/site.css"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/site/css/missing.css"));
        assert!(msg.contains("css/site.css"));
    }

    #[test]
    fn test_bundles_failed_message() {
        let err = BuildError::BundlesFailed { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "1 of 3 bundle(s) failed");
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: CliError = squeeze::Error::RuntimeSetup {
            dir: PathBuf::from("/tmp/squeeze0.2.0"),
            message: "no archive".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Engine(_)));
        assert!(err.to_string().starts_with("Runtime setup failed"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), BuildError> =
            Err(BuildError::BundlesFailed { failed: 2, total: 2 });
        let msg = result.context("Build aborted").unwrap_err().to_string();
        assert!(msg.starts_with("Build aborted: "));
    }
}
