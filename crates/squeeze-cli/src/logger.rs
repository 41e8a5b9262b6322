//! Tracing setup for the squeeze CLI.
//!
//! Level selection, highest priority first:
//! 1. `--verbose`: debug for squeeze crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. warn, so normal runs only show the CLI's own status lines
//!
//! ```rust,no_run
//! use squeeze_cli::logger::init_logger;
//!
//! init_logger(true, false, false);
//! tracing::debug!("Minifying {}", "site.css");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "squeeze=debug,squeeze_cli=debug";
const QUIET_FILTER: &str = "squeeze=error,squeeze_cli=error";
const DEFAULT_FILTER: &str = "squeeze=warn,squeeze_cli=warn";

/// Build the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
