//! Command implementations for the squeeze CLI.
//!
//! - [`build`] - assemble, minify and gzip bundles
//! - [`clean`] - delete generated files
//! - [`warm`] - extract the script minifier runtime
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod clean;
pub(crate) mod utils;
pub mod warm;

pub use build::execute as build_execute;
pub use clean::execute as clean_execute;
pub use warm::execute as warm_execute;
