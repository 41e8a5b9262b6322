//! Change-aware writing of minified and gzip output.

pub mod gzip;
pub mod writer;

pub use gzip::{GzipWriter, gzip_path};
pub use writer::{FileWriter, min_file_name};

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Write `content` to `target` through a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub(crate) fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::WriteFailure {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_sibling(target);
    if let Err(source) = fs::write(&temp_path, content) {
        cleanup_temp_file(&temp_path);
        return Err(Error::WriteFailure {
            path: target.to_path_buf(),
            source,
        });
    }

    fs::rename(&temp_path, target).map_err(|source| {
        cleanup_temp_file(&temp_path);
        Error::WriteFailure {
            path: target.to_path_buf(),
            source,
        }
    })
}

fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    target.with_file_name(name)
}

// Best-effort: we are already failing.
fn cleanup_temp_file(temp_path: &Path) {
    if temp_path.exists() {
        if let Err(e) = fs::remove_file(temp_path) {
            tracing::warn!(
                "Failed to clean up temporary file '{}': {}",
                temp_path.display(),
                e
            );
        }
    }
}
