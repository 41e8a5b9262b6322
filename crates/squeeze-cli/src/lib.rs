//! squeeze CLI - bundle, minify and gzip web assets.
//!
//! The binary is a thin host around the [`squeeze`] engine:
//!
//! - [`config`] - `bundleconfig.json` and tool settings
//! - [`commands`] - `build`, `clean` and `warm`
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing setup
//! - [`ui`] - status lines and summaries

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
