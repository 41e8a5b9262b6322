//! Gzip siblings (`<file>.gz`) for minified output.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::events::{EventBus, EventKind, LifecycleEvent};
use crate::{Bundle, Error, Result};

use super::write_atomic;

/// `<source>.gz`, keeping the full original file name.
///
/// ```
/// use squeeze::gzip_path;
/// use std::path::Path;
///
/// assert_eq!(gzip_path(Path::new("css/site.min.css")), Path::new("css/site.min.css.gz"));
/// ```
pub fn gzip_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Writes best-compression gzip files when they are missing or stale.
#[derive(Debug, Clone)]
pub struct GzipWriter {
    events: Arc<EventBus>,
}

impl GzipWriter {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { events }
    }

    /// Gzip `content` (or the bundle's unminified output when `None`) into
    /// `<source_file>.gz`.
    ///
    /// The gzip file is rewritten when `minification_changed` is set, when it
    /// does not exist, or when it is older than `source_file`. `before-gzip`
    /// fires regardless; `after-gzip` only after a write. Returns whether the
    /// file was written.
    pub fn write_gzip(
        &self,
        source_file: &Path,
        bundle: &Bundle,
        minification_changed: bool,
        content: Option<&str>,
    ) -> Result<bool> {
        let gz_file = gzip_path(source_file);
        let changed = minification_changed || is_stale(&gz_file, source_file);

        self.events.emit(
            EventKind::BeforeGzip,
            &LifecycleEvent::new(source_file, &gz_file, Some(bundle), changed),
        )?;

        if !changed {
            tracing::debug!("{} is up to date", gz_file.display());
            return Ok(false);
        }

        let bytes = compress(content.unwrap_or(&bundle.output)).map_err(|source| {
            Error::WriteFailure {
                path: gz_file.clone(),
                source,
            }
        })?;
        write_atomic(&gz_file, &bytes)?;
        tracing::info!("Compressed {}", gz_file.display());

        self.events.emit(
            EventKind::AfterGzip,
            &LifecycleEvent::new(source_file, &gz_file, Some(bundle), true),
        )?;
        Ok(true)
    }
}

fn compress(text: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()
}

/// Missing gzip, or one older than its source.
fn is_stale(gz_file: &Path, source_file: &Path) -> bool {
    let Ok(gz_modified) = fs::metadata(gz_file).and_then(|meta| meta.modified()) else {
        return true;
    };
    match fs::metadata(source_file).and_then(|meta| meta.modified()) {
        Ok(source_modified) => gz_modified < source_modified,
        Err(_) => false,
    }
}
