//! `squeeze warm`: extract the script minifier runtime ahead of a build.

use crate::cli::WarmArgs;
use crate::commands::utils;
use crate::config::{Settings, SettingsOverrides};
use crate::error::Result;
use crate::ui;

/// Execute the warm command.
///
/// Extracts the runtime archive into the cache directory unless a complete
/// runtime is already there.
pub fn execute(args: WarmArgs) -> Result<()> {
    let cwd = utils::current_dir()?;
    let settings = Settings::load(&SettingsOverrides::from(&args), &cwd)?;
    let runtime = settings.runtime_cache();

    ui::info(&format!("Preparing runtime in {}", runtime.dir().display()));
    let dir = runtime.ensure_ready()?;

    if !runtime.minifier_script().is_file() {
        ui::warning(&format!(
            "uglify-js entry point not found at {}; script bundles will fail",
            runtime.minifier_script().display()
        ));
    }
    ui::success(&format!("Runtime ready: {}", dir.display()));
    Ok(())
}
