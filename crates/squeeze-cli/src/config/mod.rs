//! Configuration for the squeeze CLI.
//!
//! Two separate inputs:
//! - [`BundleConfig`]: the bundle definitions in `bundleconfig.json`.
//! - [`Settings`]: tool settings merged from defaults, `squeeze.json`,
//!   `SQUEEZE_*` environment variables and CLI flags (in that priority order).

mod bundles;
mod settings;

pub use bundles::{BundleConfig, BundleEntry, DEFAULT_CONFIG_FILE};
pub use settings::{SETTINGS_FILE, Settings, SettingsOverrides};
