use serde::{Deserialize, Serialize};
use squeeze::{Bundle, MinifySettings, min_file_name};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, ConfigError, Result};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bundleconfig.json";

/// One entry of `bundleconfig.json`.
///
/// ```json
/// {
///   "outputFileName": "wwwroot/css/site.css",
///   "inputFiles": ["wwwroot/css/reset.css", "wwwroot/css/layout.css"],
///   "minify": { "enabled": true, "gzip": true },
///   "sourceMap": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Output path, relative to the config file.
    #[serde(default)]
    pub output_file_name: PathBuf,

    /// Inputs in concatenation order, relative to the config file.
    #[serde(default)]
    pub input_files: Vec<PathBuf>,

    #[serde(default)]
    pub minify: MinifySettings,

    #[serde(default)]
    pub source_map: bool,

    /// Kept for compatibility with existing bundleconfig.json files; unused.
    #[serde(default = "default_true")]
    pub include_in_project: bool,
}

fn default_true() -> bool {
    true
}

impl BundleEntry {
    /// Read and concatenate the inputs into an engine [`Bundle`].
    ///
    /// Inputs are joined with `\n`. A missing input fails the bundle.
    pub fn assemble(&self, base_dir: &Path) -> Result<Bundle, BuildError> {
        let mut parts = Vec::with_capacity(self.input_files.len());
        for input in &self.input_files {
            let path = base_dir.join(input);
            let text = fs::read_to_string(&path).map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    BuildError::InputNotFound {
                        input: path.clone(),
                        bundle: self.output_file_name.clone(),
                    }
                } else {
                    BuildError::InputUnreadable {
                        input: path.clone(),
                        source,
                    }
                }
            })?;
            parts.push(text);
        }

        Ok(Bundle {
            base_dir: base_dir.to_path_buf(),
            output_file_name: self.output_file_name.clone(),
            input_files: self.input_files.clone(),
            output: parts.join("\n"),
            minify: self.minify.clone(),
            source_map: self.source_map,
        })
    }

    /// Whether the output name is already a `.min.` name, in which case the
    /// minified file replaces the bundle output itself.
    pub fn writes_min_in_place(&self) -> bool {
        min_file_name(&self.output_file_name) == self.output_file_name
    }
}

/// Parsed `bundleconfig.json` together with the directory its paths are
/// relative to.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub entries: Vec<BundleEntry>,
}

impl BundleConfig {
    /// Load and validate a bundle definition file.
    pub fn load(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)?;
        let text = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.clone()),
            _ => ConfigError::Io(err),
        })?;

        let entries: Vec<BundleEntry> =
            serde_json::from_str(&text).map_err(|source| ConfigError::InvalidJson {
                path: path.clone(),
                source,
            })?;

        for (index, entry) in entries.iter().enumerate() {
            if entry.output_file_name.as_os_str().is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("[{}].outputFileName", index),
                    hint: "Every bundle needs an output file, e.g. \"wwwroot/js/site.js\"".to_string(),
                }
                .into());
            }
        }

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        tracing::debug!("Loaded {} bundle(s) from {}", entries.len(), path.display());
        Ok(Self {
            path,
            base_dir,
            entries,
        })
    }

    /// Entries whose `outputFileName` matches one of `filters`, in config
    /// order. An empty filter list selects everything.
    pub fn select(&self, filters: &[PathBuf]) -> Result<Vec<&BundleEntry>> {
        if filters.is_empty() {
            return Ok(self.entries.iter().collect());
        }

        for filter in filters {
            if !self.entries.iter().any(|entry| same_output(entry, filter)) {
                return Err(ConfigError::InvalidValue {
                    field: "--bundle".to_string(),
                    value: filter.display().to_string(),
                    hint: format!(
                        "No bundle in {} has this outputFileName",
                        self.path.display()
                    ),
                }
                .into());
            }
        }

        Ok(self
            .entries
            .iter()
            .filter(|entry| filters.iter().any(|filter| same_output(entry, filter)))
            .collect())
    }
}

fn same_output(entry: &BundleEntry, filter: &Path) -> bool {
    normalize(&entry.output_file_name) == normalize(filter)
}

fn normalize(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.trim_start_matches("./").to_string()
}
