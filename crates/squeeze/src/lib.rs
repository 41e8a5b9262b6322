#![cfg_attr(docsrs, feature(doc_cfg))]

//! # squeeze
//!
//! Change-aware minification and write orchestration for asset bundles.
//!
//! A [`Bundle`] maps a list of input files to one output file. Squeeze picks a
//! minifier from the output extension (`.js`, `.css`, `.html`/`.htm`), writes the
//! `.min` file only when its content changed, optionally writes a gzip sibling,
//! and reports every file-system mutation through an [`EventBus`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use squeeze::{Bundle, EventBus, EventKind, Orchestrator, RuntimeCache};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let events = Arc::new(EventBus::new());
//! events.subscribe(EventKind::AfterWrite, |event| {
//!     println!("wrote {}", event.destination.display());
//!     Ok(())
//! });
//!
//! let runtime = Arc::new(RuntimeCache::in_temp_dir());
//! let orchestrator = Orchestrator::new(events, runtime);
//!
//! let bundle = Bundle::new("/srv/site", "css/site.css")
//!     .input("css/reset.css")
//!     .input("css/layout.css")
//!     .content(".a { color: red; }\n.b { margin: 0px; }")
//!     .gzip(true);
//!
//! let outcome = orchestrator.process(&bundle)?;
//! assert!(!outcome.has_errors());
//! # Ok(()) }
//! ```
//!
//! Script bundles are minified by an external `node` process running the
//! `uglify-js` CLI from a [`RuntimeCache`]; see [`minifier::ScriptMinifier`].

pub mod bundle;
pub mod diff;
pub mod events;
pub mod minifier;
pub mod orchestrator;
pub mod outcome;
pub mod output;
pub mod runtime;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use bundle::{AssetKind, Bundle, CssOptions, HtmlOptions, MinifySettings};
pub use events::{EventBus, EventKind, LifecycleEvent, SubscriptionId};
pub use minifier::{Minifier, MinifierDispatch, ScriptMinifier, StyleMarkupMinifier};
pub use orchestrator::{BatchReport, BundleResult, Orchestrator};
pub use outcome::{MinificationError, MinificationOutcome};
pub use output::{FileWriter, GzipWriter, gzip_path, min_file_name};
pub use runtime::{RuntimeArchive, RuntimeCache, RuntimeState};

use std::path::PathBuf;

/// Error types for squeeze operations.
///
/// Minification problems are not errors at this level: they are collected into
/// [`MinificationOutcome::errors`]. This type covers write-phase I/O, runtime
/// setup, process launch and observer failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing an output file (or creating its directory) failed.
    #[error("Failed to write '{}': {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external minifier runtime could not be prepared.
    #[error("Runtime setup failed in '{}': {message}", .dir.display())]
    RuntimeSetup { dir: PathBuf, message: String },

    /// The external minifier process could not be started.
    #[error("Failed to launch '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A lifecycle observer returned an error.
    #[error("Observer for '{event}' failed: {message}")]
    Observer { event: EventKind, message: String },
}

/// Result type alias for squeeze operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Io(_) => "IO_ERROR",
            Error::WriteFailure { .. } => "WRITE_FAILURE",
            Error::RuntimeSetup { .. } => "RUNTIME_SETUP",
            Error::Spawn { .. } => "SPAWN_FAILURE",
            Error::Observer { .. } => "OBSERVER_FAILED",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::WriteFailure { path, .. } => Some(Box::new(format!(
                "Failed to write '{}'. Check disk space and permissions.",
                path.display()
            ))),
            Error::RuntimeSetup { dir, .. } => Some(Box::new(format!(
                "Delete '{}' and run again, or point SQUEEZE_RUNTIME_ARCHIVE at a valid node + uglify-js archive.",
                dir.display()
            ))),
            Error::Spawn { program, .. } => Some(Box::new(format!(
                "Make sure '{}' exists and is executable.",
                program.display()
            ))),
            Error::Observer { event, .. } => Some(Box::new(format!(
                "A '{}' handler rejected the event; other bundles are unaffected.",
                event
            ))),
            _ => None,
        }
    }
}
