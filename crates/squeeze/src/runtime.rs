//! Shared cache directory holding the node runtime and the `uglify-js` package.
//!
//! The cache lives at `<temp dir>/<tool name><version>/` by default and is
//! populated lazily from a gzip-compressed tar archive:
//!
//! ```text
//! squeeze0.2.0/
//! ├── node                       (node.exe on Windows, optional)
//! ├── node_modules/uglify-js/…
//! └── log.txt                    sentinel + last run diagnostics
//! ```
//!
//! A [`RuntimeCache`] is usually created once per process and shared via
//! `Arc`. Extraction and log writes are serialized per cache directory, so
//! separate instances rooted at the same directory never race either.

use flate2::read::GzDecoder;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use crate::{Error, Result};

/// Sentinel written after a successful extraction.
pub const SENTINEL_FILE: &str = "log.txt";

/// Package directory that must exist for the cache to count as initialized.
pub const NODE_MODULES: &str = "node_modules";

#[cfg(windows)]
const NODE_BINARY: &str = "node.exe";
#[cfg(not(windows))]
const NODE_BINARY: &str = "node";

/// Source of the runtime archive (`.tar.gz`).
#[derive(Debug, Clone)]
pub enum RuntimeArchive {
    /// Archive on disk.
    File(PathBuf),
    /// Archive held in memory, e.g. from `include_bytes!`.
    Bytes(Arc<[u8]>),
}

impl RuntimeArchive {
    fn reader(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(match self {
            RuntimeArchive::File(path) => Box::new(File::open(path)?),
            RuntimeArchive::Bytes(bytes) => Box::new(&bytes[..]),
        })
    }

    /// Unpack into `dest`.
    pub fn extract_to(&self, dest: &Path) -> std::io::Result<()> {
        let mut archive = tar::Archive::new(GzDecoder::new(self.reader()?));
        archive.unpack(dest)
    }
}

/// Lifecycle of the cache within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Ready,
}

/// Locks shared by every [`RuntimeCache`] rooted at the same directory.
#[derive(Debug, Default)]
struct DirLocks {
    init: Mutex<()>,
    log: Mutex<()>,
}

static DIR_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<DirLocks>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn dir_locks(dir: &Path) -> Arc<DirLocks> {
    let key = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
    Arc::clone(DIR_LOCKS.lock().entry(key).or_default())
}

/// Lazily-initialized runtime cache directory.
#[derive(Debug)]
pub struct RuntimeCache {
    dir: PathBuf,
    archive: Option<RuntimeArchive>,
    state: Mutex<RuntimeState>,
    locks: Arc<DirLocks>,
}

impl RuntimeCache {
    /// Cache rooted at `dir`, with no archive configured.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            locks: dir_locks(&dir),
            dir,
            archive: None,
            state: Mutex::new(RuntimeState::Uninitialized),
        }
    }

    /// Cache in the default versioned temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(Self::default_dir())
    }

    /// `<temp dir>/<tool name><version>`
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join(concat!(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
    }

    /// Archive to extract when the cache is missing or incomplete.
    pub fn with_archive(mut self, archive: RuntimeArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state(&self) -> RuntimeState {
        *self.state.lock()
    }

    /// Node binary: the bundled one when present, otherwise `node` from `PATH`.
    pub fn node_executable(&self) -> PathBuf {
        let bundled = self.dir.join(NODE_BINARY);
        if bundled.is_file() {
            bundled
        } else {
            PathBuf::from(NODE_BINARY)
        }
    }

    /// Entry point of the `uglify-js` CLI inside the cache.
    pub fn minifier_script(&self) -> PathBuf {
        self.dir
            .join(NODE_MODULES)
            .join("uglify-js")
            .join("bin")
            .join("uglifyjs")
    }

    fn is_populated(&self) -> bool {
        self.dir.join(NODE_MODULES).is_dir() && self.dir.join(SENTINEL_FILE).is_file()
    }

    /// Make sure the cache is extracted, returning its directory.
    ///
    /// The first call checks for `node_modules/` and the sentinel; when either
    /// is missing the directory is wiped and re-extracted. Later calls return
    /// immediately.
    pub fn ensure_ready(&self) -> Result<&Path> {
        let mut state = self.state.lock();
        if *state == RuntimeState::Ready {
            return Ok(&self.dir);
        }

        // Another instance may have populated the directory while we waited.
        let _init = self.locks.init.lock();
        if self.is_populated() {
            tracing::debug!("Reusing runtime cache at {}", self.dir.display());
        } else {
            self.populate()?;
        }

        *state = RuntimeState::Ready;
        Ok(&self.dir)
    }

    fn populate(&self) -> Result<()> {
        let archive = self.archive.as_ref().ok_or_else(|| {
            self.setup_error("runtime is not installed and no runtime archive is configured")
        })?;

        tracing::info!("Extracting minifier runtime to {}", self.dir.display());

        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)
                .map_err(|e| self.setup_error(format!("cannot remove stale cache: {e}")))?;
        }
        fs::create_dir_all(&self.dir)
            .map_err(|e| self.setup_error(format!("cannot create cache directory: {e}")))?;

        archive
            .extract_to(&self.dir)
            .map_err(|e| self.setup_error(format!("cannot extract runtime archive: {e}")))?;

        if !self.dir.join(NODE_MODULES).is_dir() {
            return Err(self.setup_error(format!(
                "runtime archive does not contain a '{NODE_MODULES}' directory"
            )));
        }

        self.write_log(&format!(
            "Runtime initialized at {}\n",
            chrono::Local::now().to_rfc3339()
        ))
    }

    /// Overwrite the sentinel log with diagnostic text.
    pub fn write_log(&self, text: &str) -> Result<()> {
        let _guard = self.locks.log.lock();
        let path = self.dir.join(SENTINEL_FILE);
        fs::write(&path, text).map_err(|source| Error::WriteFailure { path, source })
    }

    fn setup_error(&self, message: impl Into<String>) -> Error {
        Error::RuntimeSetup {
            dir: self.dir.clone(),
            message: message.into(),
        }
    }
}
