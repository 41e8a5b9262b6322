//! External-process script minification.
//!
//! Scripts are handed to the `uglify-js` CLI running on a node binary from the
//! [`RuntimeCache`]. The process writes the `.min.js` file itself, so this
//! strategy returns no content. A non-empty stderr is the only failure signal;
//! the exit code is not inspected.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use super::Minifier;
use crate::events::{EventBus, EventKind, LifecycleEvent};
use crate::output::min_file_name;
use crate::{Bundle, Error, MinificationError, MinificationOutcome, Result, RuntimeCache};

/// Environment variable that stops node from refusing unsupported platforms.
pub const PLATFORM_CHECK_BYPASS: &str = "NODE_SKIP_PLATFORM_CHECK";

/// Command-line arguments for one `uglifyjs` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArgs {
    pub inputs: Vec<PathBuf>,
    pub mangle: bool,
    pub output: PathBuf,
    pub source_map: bool,
}

impl ScriptArgs {
    /// Arguments for minifying `bundle` into `output`.
    pub fn new(bundle: &Bundle, output: &Path) -> Self {
        Self {
            inputs: bundle.input_paths(),
            mangle: bundle.minify.enabled,
            output: output.to_path_buf(),
            source_map: bundle.source_map,
        }
    }

    /// Arguments as passed to the process, one path per argument.
    pub fn to_os_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self
            .inputs
            .iter()
            .map(|input| input.as_os_str().to_owned())
            .collect();
        if self.mangle {
            args.push("--mangle".into());
        }
        args.push("--output".into());
        args.push(self.output.as_os_str().to_owned());
        if self.source_map {
            args.push("--source-map".into());
        }
        args
    }

    /// Quoted single-line rendering, for logs.
    ///
    /// ```
    /// use squeeze::Bundle;
    /// use squeeze::minifier::ScriptArgs;
    /// use std::path::Path;
    ///
    /// let bundle = Bundle::new("/site", "app.js").input("a.js");
    /// let args = ScriptArgs::new(&bundle, Path::new("/site/app.min.js"));
    /// assert_eq!(
    ///     args.command_line(),
    ///     r#""/site/a.js" --mangle --output "/site/app.min.js""#
    /// );
    /// ```
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .inputs
            .iter()
            .map(|input| format!("\"{}\"", input.display()))
            .collect();
        if self.mangle {
            parts.push("--mangle".to_string());
        }
        parts.push(format!("--output \"{}\"", self.output.display()));
        if self.source_map {
            parts.push("--source-map".to_string());
        }
        parts.join(" ")
    }
}

/// Minifies scripts with an external `node` + `uglify-js` process.
#[derive(Debug, Clone)]
pub struct ScriptMinifier {
    runtime: Arc<RuntimeCache>,
}

impl ScriptMinifier {
    pub fn new(runtime: Arc<RuntimeCache>) -> Self {
        Self { runtime }
    }

    fn command(&self, runtime_dir: &Path, target: &Path, args: &ScriptArgs) -> Result<Command> {
        let mut command = Command::new(self.runtime.node_executable());
        command
            .arg(self.runtime.minifier_script())
            .args(args.to_os_args())
            .current_dir(filesystem_root(target))
            .env("PATH", prefixed_path(runtime_dir)?)
            .env(PLATFORM_CHECK_BYPASS, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }
}

impl Minifier for ScriptMinifier {
    fn name(&self) -> &'static str {
        "uglify-js"
    }

    fn minify(
        &self,
        bundle: &Bundle,
        target: &Path,
        events: &EventBus,
    ) -> Result<MinificationOutcome> {
        let min_file = min_file_name(target);
        let runtime_dir = self.runtime.ensure_ready()?;

        // uglify-js does not create the --output directory.
        if let Some(parent) = min_file.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::WriteFailure {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let args = ScriptArgs::new(bundle, &min_file);

        let program = self.runtime.node_executable();
        tracing::debug!("Running {} {}", program.display(), args.command_line());

        let output = self
            .command(runtime_dir, target, &args)?
            .output()
            .map_err(|source| Error::Spawn { program, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let diagnostic = format!(
            "{}\nargs: {}\nstatus: {}\nstdout:\n{}\nstderr:\n{}\n",
            chrono::Local::now().to_rfc3339(),
            args.command_line(),
            output.status,
            stdout,
            stderr
        );
        if let Err(err) = self.runtime.write_log(&diagnostic) {
            tracing::warn!("Could not update runtime log: {}", err);
        }

        let mut outcome = MinificationOutcome::new(&min_file);
        if !stderr.trim().is_empty() {
            outcome.errors.push(MinificationError::new(
                target.to_string_lossy(),
                stderr.into_owned(),
                0,
                0,
            ));
            return Ok(outcome);
        }

        // The process decides whether to write, so the core cannot diff here.
        outcome.changed = true;
        events.emit(
            EventKind::AfterWrite,
            &LifecycleEvent::new(target, &min_file, Some(bundle), true),
        )?;
        Ok(outcome)
    }
}

/// Drive or filesystem root containing `path` (`/` or `C:\`).
fn filesystem_root(path: &Path) -> &Path {
    match path.ancestors().last() {
        Some(root) if !root.as_os_str().is_empty() => root,
        _ => Path::new("."),
    }
}

fn prefixed_path(runtime_dir: &Path) -> Result<OsString> {
    let existing = std::env::var_os("PATH").unwrap_or_default();
    let dirs = std::iter::once(runtime_dir.to_path_buf()).chain(std::env::split_paths(&existing));
    std::env::join_paths(dirs).map_err(|err| Error::RuntimeSetup {
        dir: runtime_dir.to_path_buf(),
        message: format!("cannot prepend to PATH: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_order() {
        let bundle = Bundle::new("/site", "js/app.js")
            .input("js/a.js")
            .input("js/b.js")
            .source_map(true);
        let args = ScriptArgs::new(&bundle, Path::new("/site/js/app.min.js"));

        let rendered: Vec<String> = args
            .to_os_args()
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "/site/js/a.js",
                "/site/js/b.js",
                "--mangle",
                "--output",
                "/site/js/app.min.js",
                "--source-map",
            ]
        );
    }

    #[test]
    fn test_mangle_follows_minify_flag() {
        let bundle = Bundle::new("/site", "app.js").input("a.js").minify(false);
        let args = ScriptArgs::new(&bundle, Path::new("/site/app.min.js"));
        assert!(!args.mangle);
        assert!(!args.command_line().contains("--mangle"));
    }

    #[test]
    fn test_command_line_quotes_paths() {
        let bundle = Bundle::new("/my site", "app.js").input("a b.js");
        let args = ScriptArgs::new(&bundle, Path::new("/my site/app.min.js"));
        assert_eq!(
            args.command_line(),
            r#""/my site/a b.js" --mangle --output "/my site/app.min.js""#
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_filesystem_root() {
        assert_eq!(filesystem_root(Path::new("/srv/site/app.js")), Path::new("/"));
        assert_eq!(filesystem_root(Path::new("relative.js")), Path::new("."));
    }

    #[test]
    fn test_prefixed_path_starts_with_runtime_dir() {
        let dir = std::env::temp_dir().join("squeeze-runtime");
        let path = prefixed_path(&dir).unwrap();
        let first = std::env::split_paths(&path).next().unwrap();
        assert_eq!(first, dir);
    }
}
