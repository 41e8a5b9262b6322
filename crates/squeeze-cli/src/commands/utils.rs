use std::path::{Path, PathBuf};

use crate::error::Result;

/// Working directory of the current process.
pub(crate) fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// `path` relative to `base` for display, or `path` itself when it lies
/// elsewhere.
pub(crate) fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
