//! Lifecycle notifications around every file-system mutation.
//!
//! Hosts register handlers on an [`EventBus`] before handing it to the
//! [`Orchestrator`](crate::Orchestrator). Handlers run synchronously on the
//! calling thread, in registration order. A handler error stops the current
//! emission and is returned to the caller as [`Error::Observer`]; the engine
//! does not swallow it.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Bundle, Error, MinificationOutcome, Result};

/// The five notification points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A minified file is about to be written (fires even when unchanged).
    BeforeWrite,
    /// A minified file was written.
    AfterWrite,
    /// A gzip file is about to be written (fires even when unchanged).
    BeforeGzip,
    /// A gzip file was written.
    AfterGzip,
    /// Minification of a bundle produced errors.
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::BeforeWrite,
        EventKind::AfterWrite,
        EventKind::BeforeGzip,
        EventKind::AfterGzip,
        EventKind::Error,
    ];
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::BeforeWrite => write!(f, "before-write"),
            EventKind::AfterWrite => write!(f, "after-write"),
            EventKind::BeforeGzip => write!(f, "before-gzip"),
            EventKind::AfterGzip => write!(f, "after-gzip"),
            EventKind::Error => write!(f, "error"),
        }
    }
}

/// Payload passed to every handler.
#[derive(Debug, Clone)]
pub struct LifecycleEvent<'a> {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// `None` for top-level failures that are not tied to a bundle value.
    pub bundle: Option<&'a Bundle>,
    pub changed: bool,
    /// Set for [`EventKind::Error`] only.
    pub outcome: Option<&'a MinificationOutcome>,
}

impl<'a> LifecycleEvent<'a> {
    pub fn new(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        bundle: Option<&'a Bundle>,
        changed: bool,
    ) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            bundle,
            changed,
            outcome: None,
        }
    }

    /// Error payload for `outcome`.
    pub fn error(
        source: impl AsRef<Path>,
        bundle: Option<&'a Bundle>,
        outcome: &'a MinificationOutcome,
    ) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: outcome.file_name.clone(),
            bundle,
            changed: false,
            outcome: Some(outcome),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Registry of lifecycle handlers.
pub struct EventBus {
    next_id: AtomicU64,
    registrations: RwLock<Vec<Registration>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// Register `handler` for `kind`.
    ///
    /// # Example
    ///
    /// ```
    /// use squeeze::{EventBus, EventKind};
    ///
    /// let events = EventBus::new();
    /// let id = events.subscribe(EventKind::AfterGzip, |event| {
    ///     println!("compressed {}", event.destination.display());
    ///     Ok(())
    /// });
    /// assert_eq!(events.handler_count(EventKind::AfterGzip), 1);
    /// assert!(events.unsubscribe(id));
    /// ```
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.write().push(Registration {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    /// Invoke every handler registered for `kind`.
    ///
    /// Handlers are snapshotted first so a handler may subscribe or unsubscribe
    /// without deadlocking.
    pub fn emit(&self, kind: EventKind, event: &LifecycleEvent<'_>) -> Result<()> {
        let handlers: Vec<Handler> = self
            .registrations
            .read()
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| Arc::clone(&registration.handler))
            .collect();

        for handler in handlers {
            handler(event).map_err(|err| Error::Observer {
                event: kind,
                message: format!("{err:#}"),
            })?;
        }

        Ok(())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.registrations.read().len())
            .finish()
    }
}
