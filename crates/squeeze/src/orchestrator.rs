//! Per-bundle pipeline: minify, write if changed, gzip.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::events::{EventBus, EventKind, LifecycleEvent};
use crate::output::{FileWriter, GzipWriter, min_file_name};
use crate::{
    AssetKind, Bundle, Error, MinificationError, MinificationOutcome, MinifierDispatch, Result,
    RuntimeCache,
};

/// Drives bundles through dispatch, the file writer and the gzip writer.
///
/// The orchestrator is `Send + Sync`; hosts may call [`process`](Self::process)
/// from several threads at once as long as bundles do not share an output.
#[derive(Debug)]
pub struct Orchestrator {
    dispatch: MinifierDispatch,
    writer: FileWriter,
    gzip: GzipWriter,
}

impl Orchestrator {
    /// Orchestrator with the built-in minifiers.
    pub fn new(events: Arc<EventBus>, runtime: Arc<RuntimeCache>) -> Self {
        Self::with_dispatch(MinifierDispatch::new(events, runtime))
    }

    /// Orchestrator around a customized dispatcher. Writers report to the
    /// dispatcher's event bus.
    pub fn with_dispatch(dispatch: MinifierDispatch) -> Self {
        let events = Arc::clone(dispatch.events());
        Self {
            dispatch,
            writer: FileWriter::new(Arc::clone(&events)),
            gzip: GzipWriter::new(events),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        self.dispatch.events()
    }

    /// Run one bundle through the pipeline.
    ///
    /// Minification errors are reported in the returned outcome and nothing
    /// is written for that bundle. `Err` means a write, or an observer, failed.
    pub fn process(&self, bundle: &Bundle) -> Result<MinificationOutcome> {
        let mut outcome = self.dispatch.minify(bundle)?;
        if outcome.has_errors() {
            return Ok(outcome);
        }

        if !bundle.is_minifiable() {
            return Ok(outcome);
        }
        let (Some(target), Some(kind)) = (bundle.output_path(), bundle.kind()) else {
            return Ok(outcome);
        };

        if outcome.content.is_some() {
            self.writer.write(bundle, &mut outcome)?;
        }

        if bundle.minify.gzip {
            let min_file = min_file_name(&target);
            match kind {
                // The external process wrote the file; compress what it produced.
                AssetKind::Script => {
                    let written = match fs::read_to_string(&min_file) {
                        Ok(text) => Some(text),
                        Err(err) => {
                            tracing::debug!(
                                "Cannot read back '{}' ({}), compressing unminified output",
                                min_file.display(),
                                err
                            );
                            None
                        }
                    };
                    self.gzip
                        .write_gzip(&min_file, bundle, outcome.changed, written.as_deref())?;
                }
                AssetKind::Style | AssetKind::Markup => {
                    self.gzip.write_gzip(
                        &min_file,
                        bundle,
                        outcome.changed,
                        outcome.content.as_deref(),
                    )?;
                }
            }
        }

        Ok(outcome)
    }

    /// Like [`process`](Self::process), but never fails.
    ///
    /// A pipeline `Err` is logged, turned into a failed outcome and announced
    /// through a top-level error event (no bundle attached).
    pub fn process_isolated(&self, bundle: &Bundle) -> BundleResult {
        let output = bundle.output_path().unwrap_or_default();
        match self.process(bundle) {
            Ok(outcome) => BundleResult {
                output,
                outcome,
                failure: None,
            },
            Err(err) => {
                tracing::error!("Bundle '{}' failed: {}", output.display(), err);
                let outcome = MinificationOutcome::failed(
                    min_file_name(&output),
                    MinificationError::generic(&output, err.to_string()),
                );
                if let Err(observer) = self.events().emit(
                    EventKind::Error,
                    &LifecycleEvent::error(&output, None, &outcome),
                ) {
                    tracing::error!("{}", observer);
                }
                BundleResult {
                    output,
                    outcome,
                    failure: Some(err),
                }
            }
        }
    }

    /// Process every bundle in order. One bundle's failure does not stop the
    /// rest.
    pub fn minify_all(&self, bundles: &[Bundle]) -> BatchReport {
        bundles
            .iter()
            .map(|bundle| self.process_isolated(bundle))
            .collect()
    }
}

/// Result of one bundle within a batch.
#[derive(Debug)]
pub struct BundleResult {
    /// Absolute output path of the bundle (empty when it has none).
    pub output: PathBuf,
    pub outcome: MinificationOutcome,
    /// Write-phase or observer error, if the pipeline aborted.
    pub failure: Option<Error>,
}

impl BundleResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.outcome.has_errors()
    }
}

/// Per-bundle results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<BundleResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BundleResult> {
        self.results.iter().filter(|result| result.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BundleResult> {
        self.results.iter().filter(|result| !result.is_success())
    }

    /// Number of bundles whose output was written.
    pub fn changed_count(&self) -> usize {
        self.succeeded().filter(|result| result.outcome.changed).count()
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(BundleResult::is_success)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl FromIterator<BundleResult> for BatchReport {
    fn from_iter<I: IntoIterator<Item = BundleResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Minifier;
    use flate2::read::GzDecoder;
    use parking_lot::Mutex;
    use std::io::Read;
    use std::path::Path;
    use tempfile::TempDir;

    type Seen = Arc<Mutex<Vec<(EventKind, bool, bool)>>>;

    fn orchestrator(temp: &TempDir) -> (Orchestrator, Seen) {
        let events = Arc::new(EventBus::new());
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let seen = Arc::clone(&seen);
            events.subscribe(kind, move |event| {
                seen.lock()
                    .push((kind, event.changed, event.bundle.is_some()));
                Ok(())
            });
        }
        let runtime = Arc::new(RuntimeCache::new(temp.path().join("runtime")));
        (Orchestrator::new(events, runtime), seen)
    }

    fn count(seen: &Seen, kind: EventKind) -> usize {
        seen.lock().iter().filter(|(k, _, _)| *k == kind).count()
    }

    fn gunzip(path: &Path) -> String {
        let mut text = String::new();
        GzDecoder::new(fs::File::open(path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    /// Stands in for the external process: writes the min file itself.
    struct WritesMinFile;

    impl Minifier for WritesMinFile {
        fn name(&self) -> &'static str {
            "writes-min-file"
        }

        fn minify(&self, bundle: &Bundle, target: &Path, events: &EventBus) -> Result<MinificationOutcome> {
            let min_file = min_file_name(target);
            fs::write(&min_file, bundle.output.replace(' ', ""))?;
            let mut outcome = MinificationOutcome::new(&min_file);
            outcome.changed = true;
            events.emit(
                EventKind::AfterWrite,
                &LifecycleEvent::new(target, &min_file, Some(bundle), true),
            )?;
            Ok(outcome)
        }
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, seen) = orchestrator(&temp);
        let bundle = Bundle::new(temp.path(), "css/site.css").content(".a {\n  color: red;\n}\n");

        let first = orchestrator.process(&bundle).unwrap();
        let second = orchestrator.process(&bundle).unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(count(&seen, EventKind::AfterWrite), 1);
        assert_eq!(count(&seen, EventKind::BeforeWrite), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("css/site.min.css")).unwrap(),
            ".a{color:red}"
        );
    }

    #[test]
    fn test_disabled_bundle_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, seen) = orchestrator(&temp);
        let bundle = Bundle::new(temp.path(), "site.css")
            .content(".a { color: red; }")
            .minify(false)
            .gzip(true);

        let outcome = orchestrator.process(&bundle).unwrap();
        assert!(!outcome.has_errors());
        assert!(outcome.content.is_none());
        assert!(seen.lock().is_empty());
        assert!(!temp.path().join("site.min.css").exists());
    }

    #[test]
    fn test_errors_write_nothing() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, seen) = orchestrator(&temp);
        let bundle = Bundle::new(temp.path(), "site.css")
            .content(".a { color: red; }\n.{ }")
            .gzip(true);

        let outcome = orchestrator.process(&bundle).unwrap();
        assert!(outcome.has_errors());
        assert!(!temp.path().join("site.min.css").exists());
        assert!(!temp.path().join("site.min.css.gz").exists());
        assert_eq!(*seen.lock(), vec![(EventKind::Error, false, true)]);
    }

    #[test]
    fn test_css_gzip_follows_minified_content() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, seen) = orchestrator(&temp);
        let bundle = Bundle::new(temp.path(), "site.css")
            .content("a { color: red; }")
            .gzip(true);

        orchestrator.process(&bundle).unwrap();

        assert_eq!(gunzip(&temp.path().join("site.min.css.gz")), "a{color:red}");
        let kinds: Vec<EventKind> = seen.lock().iter().map(|(kind, _, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::BeforeWrite,
                EventKind::AfterWrite,
                EventKind::BeforeGzip,
                EventKind::AfterGzip,
            ]
        );
    }

    #[test]
    fn test_script_gzip_reads_back_process_output() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, _) = orchestrator(&temp);
        let dispatch = MinifierDispatch::new(
            Arc::clone(orchestrator.events()),
            Arc::new(RuntimeCache::new(temp.path().join("runtime"))),
        )
        .with_strategy(AssetKind::Script, WritesMinFile);
        let orchestrator = Orchestrator::with_dispatch(dispatch);

        let bundle = Bundle::new(temp.path(), "app.js")
            .content("var a = 1;")
            .gzip(true);
        let outcome = orchestrator.process(&bundle).unwrap();

        assert!(outcome.changed);
        assert!(outcome.content.is_none());
        assert_eq!(gunzip(&temp.path().join("app.min.js.gz")), "vara=1;");
    }

    #[test]
    fn test_batch_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, _) = orchestrator(&temp);
        let bundles = vec![
            Bundle::new(temp.path(), "one.css").content(".one { color: red; }"),
            Bundle::new(temp.path(), "two.css").content(".two { color: red; }\n.{ }"),
            Bundle::new(temp.path(), "three.css").content(".three { color: red; }"),
        ];

        let report = orchestrator.minify_all(&bundles);

        assert_eq!(report.len(), 3);
        assert!(!report.is_success());
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.changed_count(), 2);
        assert!(temp.path().join("one.min.css").is_file());
        assert!(!temp.path().join("two.min.css").exists());
        assert!(temp.path().join("three.min.css").is_file());
    }

    #[test]
    fn test_observer_failure_becomes_top_level_error() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, seen) = orchestrator(&temp);
        orchestrator
            .events()
            .subscribe(EventKind::AfterWrite, |_| anyhow::bail!("deploy hook failed"));

        let bundles = vec![
            Bundle::new(temp.path(), "site.css").content(".a { color: red; }"),
            Bundle::new(temp.path(), "page.html").content("<p>  hi  </p>"),
        ];
        let report = orchestrator.minify_all(&bundles);

        assert_eq!(report.failed().count(), 2);
        let failure = report.results[0].failure.as_ref().unwrap();
        assert!(matches!(failure, Error::Observer { event: EventKind::AfterWrite, .. }));
        assert!(report.results[0].outcome.errors[0].message.contains("deploy hook failed"));

        let top_level_errors = seen
            .lock()
            .iter()
            .filter(|(kind, _, has_bundle)| *kind == EventKind::Error && !has_bundle)
            .count();
        assert_eq!(top_level_errors, 2);
    }

    #[test]
    fn test_orchestrator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Orchestrator>();
        assert_send_sync::<EventBus>();
        assert_send_sync::<RuntimeCache>();
    }
}
