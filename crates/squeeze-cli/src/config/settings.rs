use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use squeeze::{RuntimeArchive, RuntimeCache};
use std::path::{Path, PathBuf};

use crate::cli::{BuildArgs, CleanArgs, RuntimeArgs, WarmArgs};
use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::{ConfigError, Result};

/// Optional settings file in the working directory.
pub const SETTINGS_FILE: &str = "squeeze.json";

/// Tool settings, independent of any particular bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bundle definition file.
    pub config: PathBuf,

    /// `.tar.gz` with `node_modules/uglify-js` (and optionally `node`).
    pub runtime_archive: Option<PathBuf>,

    /// Where the runtime is extracted. Defaults to the versioned temp dir.
    pub cache_dir: Option<PathBuf>,

    /// Bundles processed in parallel.
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            runtime_archive: None,
            cache_dir: None,
            jobs: 1,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_archive: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl SettingsOverrides {
    fn with_runtime(mut self, runtime: &RuntimeArgs) -> Self {
        self.runtime_archive = runtime.runtime_archive.clone();
        self.cache_dir = runtime.cache_dir.clone();
        self
    }
}

impl From<&BuildArgs> for SettingsOverrides {
    fn from(args: &BuildArgs) -> Self {
        Self {
            config: args.config.clone(),
            jobs: args.jobs,
            ..Self::default()
        }
        .with_runtime(&args.runtime)
    }
}

impl From<&CleanArgs> for SettingsOverrides {
    fn from(args: &CleanArgs) -> Self {
        Self {
            config: args.config.clone(),
            ..Self::default()
        }
    }
}

impl From<&WarmArgs> for SettingsOverrides {
    fn from(args: &WarmArgs) -> Self {
        Self::default().with_runtime(&args.runtime)
    }
}

impl Settings {
    /// Load settings for a run started in `cwd`.
    ///
    /// Priority: CLI flags > `SQUEEZE_*` environment > `squeeze.json` > defaults.
    /// Relative paths are resolved against `cwd`.
    pub fn load(overrides: &SettingsOverrides, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let settings_file = cwd.join(SETTINGS_FILE);
        if settings_file.is_file() {
            figment = figment.merge(Json::file(&settings_file));
        }

        // SQUEEZE_RUNTIME_ARCHIVE, SQUEEZE_CACHE_DIR, SQUEEZE_JOBS, SQUEEZE_CONFIG
        figment = figment
            .merge(Env::prefixed("SQUEEZE_"))
            .merge(Serialized::defaults(overrides));

        let settings: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "settings".to_string(),
            value: e.to_string(),
            hint: format!("Check {} and SQUEEZE_* environment variables", SETTINGS_FILE),
        })?;

        settings.resolved(cwd)
    }

    fn resolved(mut self, cwd: &Path) -> Result<Self> {
        if self.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "jobs".to_string(),
                value: "0".to_string(),
                hint: "Use 1 for sequential builds".to_string(),
            }
            .into());
        }
        self.config = cwd.join(&self.config);
        self.runtime_archive = self.runtime_archive.map(|path| cwd.join(path));
        self.cache_dir = self.cache_dir.map(|path| cwd.join(path));
        Ok(self)
    }

    /// Runtime cache described by these settings.
    pub fn runtime_cache(&self) -> RuntimeCache {
        let dir = self
            .cache_dir
            .clone()
            .unwrap_or_else(RuntimeCache::default_dir);
        let cache = RuntimeCache::new(dir);
        match &self.runtime_archive {
            Some(archive) => cache.with_archive(RuntimeArchive::File(archive.clone())),
            None => cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const VARS: [&str; 4] = [
        "SQUEEZE_CONFIG",
        "SQUEEZE_RUNTIME_ARCHIVE",
        "SQUEEZE_CACHE_DIR",
        "SQUEEZE_JOBS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&SettingsOverrides::default(), temp.path()).unwrap();

        assert_eq!(settings.config, temp.path().join(DEFAULT_CONFIG_FILE));
        assert_eq!(settings.jobs, 1);
        assert!(settings.runtime_archive.is_none());
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_priority_order() {
        clear_env();
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SETTINGS_FILE),
            r#"{ "jobs": 2, "cache_dir": "file-cache", "runtime_archive": "file.tar.gz" }"#,
        )
        .unwrap();
        unsafe {
            std::env::set_var("SQUEEZE_JOBS", "3");
            std::env::set_var("SQUEEZE_CACHE_DIR", "env-cache");
        }

        let overrides = SettingsOverrides {
            jobs: Some(4),
            ..SettingsOverrides::default()
        };
        let settings = Settings::load(&overrides, temp.path());
        clear_env();
        let settings = settings.unwrap();

        assert_eq!(settings.jobs, 4);
        assert_eq!(settings.cache_dir, Some(temp.path().join("env-cache")));
        assert_eq!(settings.runtime_archive, Some(temp.path().join("file.tar.gz")));
    }

    #[test]
    #[serial]
    fn test_zero_jobs_rejected() {
        clear_env();
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SETTINGS_FILE), r#"{ "jobs": 0 }"#).unwrap();
        assert!(Settings::load(&SettingsOverrides::default(), temp.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_build_args_override_config_path() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let args = BuildArgs {
            config: Some(PathBuf::from("web/bundles.json")),
            ..BuildArgs::default()
        };
        let settings = Settings::load(&SettingsOverrides::from(&args), temp.path()).unwrap();
        assert_eq!(settings.config, temp.path().join("web/bundles.json"));
    }

    #[test]
    fn test_runtime_cache_uses_configured_dir() {
        let settings = Settings {
            cache_dir: Some(PathBuf::from("/tmp/squeeze-test-cache")),
            ..Settings::default()
        };
        assert_eq!(
            settings.runtime_cache().dir(),
            Path::new("/tmp/squeeze-test-cache")
        );
        assert_eq!(
            Settings::default().runtime_cache().dir(),
            RuntimeCache::default_dir()
        );
    }
}
