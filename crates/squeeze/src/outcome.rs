//! Per-bundle minification results.

use std::path::{Path, PathBuf};

/// Result of minifying one bundle.
///
/// `content` is only meaningful when `errors` is empty. Script bundles never
/// carry content: the external minifier writes the file itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinificationOutcome {
    /// File the outcome refers to.
    pub file_name: PathBuf,

    /// Minified text, `None` until produced.
    pub content: Option<String>,

    /// Structured errors, in the order they were reported.
    pub errors: Vec<MinificationError>,

    /// Whether the written output differs from what was on disk before.
    pub changed: bool,
}

impl MinificationOutcome {
    /// Empty outcome for `file_name`.
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Outcome carrying a single error and no content.
    pub fn failed(file_name: impl Into<PathBuf>, error: MinificationError) -> Self {
        Self {
            file_name: file_name.into(),
            errors: vec![error],
            ..Default::default()
        }
    }

    /// True when at least one error was reported.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A single minification error.
///
/// `line` is 1-based and `column` is 0-based; both are 0 when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinificationError {
    pub file_name: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl MinificationError {
    pub fn new(file_name: impl Into<String>, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Error without position information.
    pub fn generic(file: &Path, message: impl Into<String>) -> Self {
        Self::new(file.to_string_lossy(), message, 0, 0)
    }
}

impl std::fmt::Display for MinificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}({},{}): {}",
                self.file_name, self.line, self.column, self.message
            )
        } else {
            write!(f, "{}: {}", self.file_name, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors_tracks_error_list() {
        let mut outcome = MinificationOutcome::new("site.css");
        assert!(!outcome.has_errors());
        assert!(outcome.content.is_none());

        outcome
            .errors
            .push(MinificationError::new("site.css", "unexpected token", 3, 4));
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = MinificationOutcome::failed(
            "app.js",
            MinificationError::generic(Path::new("app.js"), "node not found"),
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, 0);
        assert_eq!(outcome.errors[0].column, 0);
        assert!(!outcome.changed);
    }

    #[test]
    fn test_error_display() {
        let positioned = MinificationError::new("site.css", "bad selector", 2, 0);
        assert_eq!(positioned.to_string(), "site.css(2,0): bad selector");

        let generic = MinificationError::new("app.js", "boom", 0, 0);
        assert_eq!(generic.to_string(), "app.js: boom");
    }
}
