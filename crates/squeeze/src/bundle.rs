//! Bundle definitions consumed by the minification engine.
//!
//! A [`Bundle`] is built by a host (for example the `squeeze` CLI reading
//! `bundleconfig.json`). The engine never mutates it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One minification unit: ordered inputs mapped to a single output file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    /// Directory that relative output and input paths are resolved against.
    pub base_dir: PathBuf,

    /// Output file path, relative to `base_dir` (absolute paths are kept as is).
    pub output_file_name: PathBuf,

    /// Input files in concatenation order.
    pub input_files: Vec<PathBuf>,

    /// Concatenated content of all inputs, produced by the host.
    pub output: String,

    /// Minification settings, including per-type overrides.
    pub minify: MinifySettings,

    /// Ask the script minifier to emit a source map.
    pub source_map: bool,
}

impl Bundle {
    /// Create a bundle for `output_file_name` under `base_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use squeeze::Bundle;
    /// use std::path::Path;
    ///
    /// let bundle = Bundle::new("/srv/site", "js/app.js").input("js/a.js");
    /// assert_eq!(bundle.output_path().unwrap(), Path::new("/srv/site/js/app.js"));
    /// ```
    pub fn new(base_dir: impl Into<PathBuf>, output_file_name: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            output_file_name: output_file_name.into(),
            ..Default::default()
        }
    }

    /// Append an input file.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_files.push(path.into());
        self
    }

    /// Set the concatenated input content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.output = content.into();
        self
    }

    /// Enable or disable minification.
    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify.enabled = enabled;
        self
    }

    /// Enable or disable the gzip sibling.
    pub fn gzip(mut self, enabled: bool) -> Self {
        self.minify.gzip = enabled;
        self
    }

    /// Enable or disable source map generation for scripts.
    pub fn source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    /// Replace the minification settings.
    pub fn settings(mut self, settings: MinifySettings) -> Self {
        self.minify = settings;
        self
    }

    /// Absolute output path, or `None` when the bundle has no output.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.output_file_name.as_os_str().is_empty() {
            return None;
        }
        Some(self.base_dir.join(&self.output_file_name))
    }

    /// Input files resolved against `base_dir`.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.input_files
            .iter()
            .map(|input| self.base_dir.join(input))
            .collect()
    }

    /// Kind of asset this bundle produces, if it is one squeeze minifies.
    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::from_path(&self.output_file_name)
    }

    /// True when the bundle has an output path and minification is enabled.
    pub fn is_minifiable(&self) -> bool {
        self.minify.enabled && self.output_path().is_some()
    }
}

/// Output types with a minification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `.js`, handled by the external script minifier.
    Script,
    /// `.css`, handled in-process by lightningcss.
    Style,
    /// `.html` / `.htm`, handled in-process by minify-html.
    Markup,
}

impl AssetKind {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// ```
    /// use squeeze::AssetKind;
    /// use std::path::Path;
    ///
    /// assert_eq!(AssetKind::from_path(Path::new("site.CSS")), Some(AssetKind::Style));
    /// assert_eq!(AssetKind::from_path(Path::new("index.htm")), Some(AssetKind::Markup));
    /// assert_eq!(AssetKind::from_path(Path::new("logo.svg")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_uppercase();
        match extension.as_str() {
            "JS" => Some(Self::Script),
            "CSS" => Some(Self::Style),
            "HTML" | "HTM" => Some(Self::Markup),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Style => write!(f, "stylesheet"),
            Self::Markup => write!(f, "markup"),
        }
    }
}

/// Minification settings for a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifySettings {
    /// Minify the bundle at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also write a `.gz` copy of the minified file.
    #[serde(default)]
    pub gzip: bool,

    /// Stylesheet overrides.
    #[serde(default)]
    pub css: CssOptions,

    /// Markup overrides.
    #[serde(default)]
    pub html: HtmlOptions,
}

impl Default for MinifySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            gzip: false,
            css: CssOptions::default(),
            html: HtmlOptions::default(),
        }
    }
}

/// Stylesheet minification options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssOptions {
    /// Skip invalid rules instead of failing the bundle
    #[serde(default)]
    pub error_recovery: bool,
}

/// Markup minification options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlOptions {
    /// Keep `<!-- comments -->`
    #[serde(default)]
    pub keep_comments: bool,

    /// Keep optional closing tags such as `</p>`
    #[serde(default)]
    pub keep_closing_tags: bool,

    /// Minify inline `<style>` blocks
    #[serde(default = "default_true")]
    pub minify_css: bool,

    /// Minify inline `<script>` blocks
    #[serde(default = "default_true")]
    pub minify_js: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            keep_comments: false,
            keep_closing_tags: false,
            minify_css: true,
            minify_js: true,
        }
    }
}

fn default_true() -> bool {
    true
}
