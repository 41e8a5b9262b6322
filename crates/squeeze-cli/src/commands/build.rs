//! Build command implementation.
//!
//! `squeeze build` turns every entry of `bundleconfig.json` into an engine
//! [`Bundle`] and runs it through the [`Orchestrator`]. Bundles fail
//! independently: the command reports each failure, keeps going, and exits
//! non-zero at the end if anything failed.

use parking_lot::Mutex;
use rayon::prelude::*;
use squeeze::diff::has_changed;
use squeeze::{Bundle, BundleResult, EventBus, EventKind, Orchestrator};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::{BundleConfig, BundleEntry, Settings, SettingsOverrides};
use crate::error::{BuildError, Result};
use crate::ui;

/// Files written during the run, as (display name, size).
type WrittenFiles = Arc<Mutex<Vec<(String, u64)>>>;

type EntryResult = std::result::Result<BundleResult, BuildError>;

/// Execute the build command.
///
/// 1. Load settings (CLI > env > squeeze.json > defaults) and bundleconfig.json
/// 2. Assemble each selected bundle from its inputs
/// 3. Minify / write / gzip through the engine, in parallel with `--jobs`
/// 4. Report per-bundle problems and print a summary
pub fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let cwd = utils::current_dir()?;
    let settings = Settings::load(&SettingsOverrides::from(&args), &cwd)?;

    ui::info(&format!("Loading {}", settings.config.display()));
    let config = BundleConfig::load(&settings.config)?;
    let entries = config.select(&args.bundles)?;
    if entries.is_empty() {
        ui::warning("No bundles defined");
        return Ok(());
    }

    let events = Arc::new(EventBus::new());
    let written = attach_observers(&events, &config.base_dir);
    let orchestrator = Orchestrator::new(events, Arc::new(settings.runtime_cache()));

    let results = run(&orchestrator, &config.base_dir, &entries, settings.jobs)?;
    let failed = report(&results);

    let mut files = written.lock().clone();
    files.sort();
    ui::print_summary(&files, results.len(), failed, start_time.elapsed());

    if failed > 0 {
        return Err(BuildError::BundlesFailed {
            failed,
            total: results.len(),
        }
        .into());
    }
    Ok(())
}

/// Register the logging observer and the summary observer.
fn attach_observers(events: &EventBus, base_dir: &Path) -> WrittenFiles {
    for kind in EventKind::ALL {
        events.subscribe(kind, move |event| {
            tracing::debug!(
                "{}: {} -> {} (changed: {})",
                kind,
                event.source.display(),
                event.destination.display(),
                event.changed
            );
            Ok(())
        });
    }

    let written: WrittenFiles = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::AfterWrite, EventKind::AfterGzip] {
        let written = Arc::clone(&written);
        let base_dir = base_dir.to_path_buf();
        events.subscribe(kind, move |event| {
            let size = fs::metadata(&event.destination)
                .map(|meta| meta.len())
                .unwrap_or(0);
            written
                .lock()
                .push((utils::display_path(&event.destination, &base_dir), size));
            Ok(())
        });
    }
    written
}

fn run<'a>(
    orchestrator: &Orchestrator,
    base_dir: &Path,
    entries: &[&'a BundleEntry],
    jobs: usize,
) -> Result<Vec<(&'a BundleEntry, EntryResult)>> {
    let build = |entry: &&'a BundleEntry| (*entry, build_entry(orchestrator, base_dir, entry));

    if jobs <= 1 || entries.len() <= 1 {
        return Ok(entries.iter().map(build).collect());
    }

    tracing::debug!("Building {} bundles on {} threads", entries.len(), jobs);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| BuildError::WorkerPool(e.to_string()))?;
    Ok(pool.install(|| entries.par_iter().map(build).collect()))
}

fn build_entry(orchestrator: &Orchestrator, base_dir: &Path, entry: &BundleEntry) -> EntryResult {
    let bundle = entry.assemble(base_dir)?;
    if !entry.writes_min_in_place() {
        write_bundle_output(&bundle)?;
    }
    Ok(orchestrator.process_isolated(&bundle))
}

/// Write the concatenated, unminified bundle when it changed.
fn write_bundle_output(bundle: &Bundle) -> std::result::Result<bool, BuildError> {
    let Some(output) = bundle.output_path() else {
        return Ok(false);
    };
    if !has_changed(&output, &bundle.output) {
        return Ok(false);
    }

    let write = || {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output, &bundle.output)
    };
    write().map_err(|source| BuildError::OutputWriteFailed {
        output: output.clone(),
        source,
    })?;

    tracing::debug!("Wrote bundle {}", output.display());
    Ok(true)
}

/// Print one line per bundle that needs attention. Returns the failure count.
fn report(results: &[(&BundleEntry, EntryResult)]) -> usize {
    let mut failed = 0;
    for (entry, result) in results {
        let name: PathBuf = entry.output_file_name.clone();
        match result {
            Err(err) => {
                failed += 1;
                ui::error(&format!("{}: {}", name.display(), err));
            }
            Ok(result) if !result.is_success() => {
                failed += 1;
                match &result.failure {
                    Some(err) => ui::error(&format!("{}: {}", name.display(), err)),
                    None => {
                        for error in &result.outcome.errors {
                            ui::error(&error.to_string());
                        }
                    }
                }
            }
            Ok(_) if !entry.minify.enabled => {
                ui::skipped(&format!("{} (minification disabled)", name.display()));
            }
            Ok(result) if !result.outcome.changed => {
                ui::skipped(&format!("{} is up to date", name.display()));
            }
            Ok(_) => {}
        }
    }
    failed
}
