//! Writes minified text next to the bundle output as `<name>.min.<ext>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diff::has_changed;
use crate::events::{EventBus, EventKind, LifecycleEvent};
use crate::{Bundle, MinificationOutcome, Result};

use super::write_atomic;

/// Canonical minified file name for `path`.
///
/// Names that already contain `.min.` (any case) are returned unchanged;
/// otherwise `.min` is inserted before the final extension.
///
/// ```
/// use squeeze::min_file_name;
/// use std::path::Path;
///
/// assert_eq!(min_file_name(Path::new("js/app.js")), Path::new("js/app.min.js"));
/// assert_eq!(min_file_name(Path::new("js/app.min.js")), Path::new("js/app.min.js"));
/// ```
pub fn min_file_name(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return path.to_path_buf();
    };

    if file_name.to_ascii_lowercase().contains(".min.") {
        return path.to_path_buf();
    }

    let minified = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) => format!(
            "{}.min.{}",
            stem.to_string_lossy(),
            extension.to_string_lossy()
        ),
        _ => format!("{file_name}.min"),
    };
    path.with_file_name(minified)
}

/// Writes minified content only when it differs from what is on disk.
#[derive(Debug, Clone)]
pub struct FileWriter {
    events: Arc<EventBus>,
}

impl FileWriter {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { events }
    }

    /// Write the outcome's content to the bundle's minified path.
    ///
    /// The content is trimmed and stored back into the outcome, and
    /// `outcome.changed` is updated. `before-write` always fires;
    /// `after-write` only fires when the file was actually written.
    /// Outcomes with errors or without content are ignored.
    pub fn write(&self, bundle: &Bundle, outcome: &mut MinificationOutcome) -> Result<()> {
        if outcome.has_errors() {
            return Ok(());
        }
        let (Some(source), Some(content)) = (bundle.output_path(), outcome.content.take()) else {
            return Ok(());
        };

        let content = content.trim().to_string();
        let min_file = min_file_name(&source);
        let changed = has_changed(&min_file, &content);
        outcome.changed = changed;

        self.events.emit(
            EventKind::BeforeWrite,
            &LifecycleEvent::new(&source, &min_file, Some(bundle), changed),
        )?;

        if changed {
            write_atomic(&min_file, content.as_bytes())?;
            tracing::info!("Minified {}", min_file.display());
        } else {
            tracing::debug!("{} is up to date", min_file.display());
        }
        outcome.content = Some(content);

        if changed {
            self.events.emit(
                EventKind::AfterWrite,
                &LifecycleEvent::new(&source, &min_file, Some(bundle), true),
            )?;
        }
        Ok(())
    }
}
