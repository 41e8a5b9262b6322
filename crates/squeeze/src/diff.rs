//! Content-level change detection for output files.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Returns true if `path` does not hold exactly `candidate`.
///
/// A missing file counts as changed (first write). So does a file that cannot
/// be read as UTF-8 text.
pub fn has_changed(path: &Path, candidate: &str) -> bool {
    match fs::read_to_string(path) {
        Ok(existing) => existing != candidate,
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                tracing::debug!("Treating '{}' as changed: {}", path.display(), err);
            }
            true
        }
    }
}
