//! Terminal output: status lines and the build summary.
//!
//! ```no_run
//! use squeeze_cli::ui;
//!
//! ui::init(false, false);
//! ui::info("Loading bundleconfig.json");
//! ui::success("css/site.min.css");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_summary};
pub use messages::{error, info, skipped, success, warning};

static COLOR: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors are used when stderr
/// is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Configure output for this process. Call once from `main`.
pub fn init(no_color: bool, quiet: bool) {
    COLOR.store(!no_color && should_use_color(), Ordering::Relaxed);
    QUIET.store(quiet, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

pub(crate) fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}
