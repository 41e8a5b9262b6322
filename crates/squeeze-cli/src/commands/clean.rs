//! `squeeze clean`: remove what `squeeze build` generated.

use squeeze::{gzip_path, min_file_name};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::cli::CleanArgs;
use crate::commands::utils;
use crate::config::{BundleConfig, Settings, SettingsOverrides};
use crate::error::{Result, ResultExt};
use crate::ui;

/// Execute the clean command.
///
/// Deletes, per bundle, the minified file with its `.gz` and `.map` siblings
/// and the `.gz` of the bundle output. Missing files are ignored. Inputs and
/// the unminified bundle output are never touched.
pub fn execute(args: CleanArgs) -> Result<()> {
    let cwd = utils::current_dir()?;
    let settings = Settings::load(&SettingsOverrides::from(&args), &cwd)?;
    let config = BundleConfig::load(&settings.config)?;

    let mut removed = 0;
    for path in artifacts(&config) {
        match fs::remove_file(&path) {
            Ok(()) => {
                removed += 1;
                tracing::debug!("Removed {}", path.display());
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).context(format!("Failed to remove {}", path.display()));
            }
        }
    }

    ui::success(&format!("Removed {} file(s)", removed));
    Ok(())
}

/// Generated files for every bundle, without duplicates.
pub fn artifacts(config: &BundleConfig) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in &config.entries {
        let output = config.base_dir.join(&entry.output_file_name);
        let min_file = min_file_name(&output);

        let mut source_map = min_file.clone().into_os_string();
        source_map.push(".map");

        for path in [
            gzip_path(&min_file),
            PathBuf::from(source_map),
            gzip_path(&output),
            min_file,
        ] {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifacts() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("bundleconfig.json");
        fs::write(
            &config_path,
            r#"[
                { "outputFileName": "css/site.css", "inputFiles": ["css/a.css"] },
                { "outputFileName": "js/app.min.js", "inputFiles": ["js/app.js"] }
            ]"#,
        )
        .unwrap();
        let config = BundleConfig::load(&config_path).unwrap();

        let root = temp.path();
        assert_eq!(
            artifacts(&config),
            vec![
                root.join("css/site.min.css.gz"),
                root.join("css/site.min.css.map"),
                root.join("css/site.css.gz"),
                root.join("css/site.min.css"),
                root.join("js/app.min.js.gz"),
                root.join("js/app.min.js.map"),
                root.join("js/app.min.js"),
            ]
        );
    }
}
