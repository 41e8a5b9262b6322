//! Sizes, durations and the end-of-build summary.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

use super::{colors_enabled, is_quiet};

/// Format file size in human-readable format.
///
/// ```
/// use squeeze_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use squeeze_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print written files with their sizes, then a one-line total.
///
/// `files` holds (display name, size in bytes) for every file written this run.
pub fn print_summary(files: &[(String, u64)], bundles: usize, failed: usize, elapsed: Duration) {
    if is_quiet() {
        return;
    }

    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let colors = colors_enabled();

    if !files.is_empty() {
        eprintln!();
        for (name, size) in files {
            if colors {
                eprintln!("  {} {} {}", "▸".blue(), name.bold(), format_size(*size).dimmed());
            } else {
                eprintln!("  ▸ {} {}", name, format_size(*size));
            }
        }
        eprintln!("{}", "─".repeat(width));
    }

    let line = format!(
        "{} bundle(s), {} file(s) written, {} failed in {}",
        bundles,
        files.len(),
        failed,
        format_duration(elapsed)
    );
    if !colors {
        eprintln!("{}", line);
    } else if failed > 0 {
        eprintln!("{}", line.red());
    } else {
        eprintln!("{}", line.green());
    }
}
