//! Minifier strategies and extension-based dispatch.
//!
//! ```text
//! Bundle → MinifierDispatch ─┬─ .js        → ScriptMinifier (external node process)
//!                            ├─ .css       → StyleMarkupMinifier (lightningcss)
//!                            └─ .html/.htm → StyleMarkupMinifier (minify-html)
//! ```

mod script;
mod style;

pub use script::{ScriptArgs, ScriptMinifier};
pub use style::{StyleMarkupMinifier, minify_css, minify_html};

use std::path::Path;
use std::sync::Arc;

use crate::events::{EventBus, EventKind, LifecycleEvent};
use crate::{AssetKind, Bundle, Error, MinificationError, MinificationOutcome, Result, RuntimeCache};

/// A minification strategy.
///
/// In-process and external-process implementations share the same outcome
/// contract, so dispatch does not care which one it is talking to.
pub trait Minifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Minify `bundle`, whose absolute output path is `target`.
    ///
    /// Returning `Err` is allowed: the dispatcher turns it into a single
    /// positionless [`MinificationError`]. The exception is
    /// [`Error::Observer`], which is passed through to the caller.
    fn minify(
        &self,
        bundle: &Bundle,
        target: &Path,
        events: &EventBus,
    ) -> Result<MinificationOutcome>;
}

/// Selects a [`Minifier`] by output extension and normalizes its result.
pub struct MinifierDispatch {
    events: Arc<EventBus>,
    script: Box<dyn Minifier>,
    style: Box<dyn Minifier>,
    markup: Box<dyn Minifier>,
}

impl MinifierDispatch {
    /// Dispatch with the built-in strategies.
    pub fn new(events: Arc<EventBus>, runtime: Arc<RuntimeCache>) -> Self {
        Self {
            events,
            script: Box::new(ScriptMinifier::new(runtime)),
            style: Box::new(StyleMarkupMinifier::css()),
            markup: Box::new(StyleMarkupMinifier::html()),
        }
    }

    /// Replace the strategy used for `kind`.
    pub fn with_strategy(mut self, kind: AssetKind, minifier: impl Minifier + 'static) -> Self {
        let minifier: Box<dyn Minifier> = Box::new(minifier);
        match kind {
            AssetKind::Script => self.script = minifier,
            AssetKind::Style => self.style = minifier,
            AssetKind::Markup => self.markup = minifier,
        }
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn strategy(&self, kind: AssetKind) -> &dyn Minifier {
        match kind {
            AssetKind::Script => self.script.as_ref(),
            AssetKind::Style => self.style.as_ref(),
            AssetKind::Markup => self.markup.as_ref(),
        }
    }

    /// Minify one bundle.
    ///
    /// Disabled bundles and bundles without an output path return an empty
    /// outcome with no side effects. Unknown extensions pass through silently.
    /// When the outcome has errors the [`EventKind::Error`] handlers run before
    /// this returns.
    pub fn minify(&self, bundle: &Bundle) -> Result<MinificationOutcome> {
        let Some(target) = bundle.output_path().filter(|_| bundle.is_minifiable()) else {
            return Ok(MinificationOutcome::default());
        };

        let Some(kind) = AssetKind::from_path(&target) else {
            tracing::debug!("No minifier for '{}', skipping", target.display());
            return Ok(MinificationOutcome::new(target));
        };

        let strategy = self.strategy(kind);
        tracing::debug!("Minifying {} with {}", target.display(), strategy.name());

        let outcome = match strategy.minify(bundle, &target, &self.events) {
            Ok(outcome) => outcome,
            Err(err @ Error::Observer { .. }) => return Err(err),
            Err(err) => MinificationOutcome::failed(
                &target,
                MinificationError::generic(&target, err.to_string()),
            ),
        };

        if outcome.has_errors() {
            for error in &outcome.errors {
                tracing::warn!("{}", error);
            }
            self.events.emit(
                EventKind::Error,
                &LifecycleEvent::error(&target, Some(bundle), &outcome),
            )?;
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for MinifierDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinifierDispatch")
            .field("script", &self.script.name())
            .field("style", &self.style.name())
            .field("markup", &self.markup.name())
            .finish()
    }
}
