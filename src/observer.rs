//! Resolution observers.
//!
//! Observers see every resolution, nested dependency resolutions included.
//! Calls are synchronous on the resolving thread, so implementations should
//! be quick.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;

/// Hook for resolution events.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{DiObserver, Key, ServiceCollection, Resolver, DiResult};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder { seen: Mutex<Vec<&'static str>> }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &Key) {
///         self.seen.lock().unwrap().push(key.display_name());
///     }
///     fn resolved(&self, _key: &Key, _duration: Duration) {}
/// }
///
/// # fn main() -> DiResult<()> {
/// let recorder = Arc::new(Recorder::default());
/// let mut services = ServiceCollection::new();
/// services.add_instance(7u32);
/// services.add_observer(recorder.clone());
///
/// let provider = services.build()?;
/// provider.get_required::<u32>()?;
/// assert_eq!(*recorder.seen.lock().unwrap(), vec!["u32"]);
/// # Ok(())
/// # }
/// ```
pub trait DiObserver: Send + Sync {
    fn resolving(&self, key: &Key);

    fn resolved(&self, key: &Key, duration: Duration);

    /// Resolution of `key` failed. Not called for plain absence.
    fn failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }
}

/// Observer that forwards events to `tracing`.
///
/// ```
/// use ferrous_activator::{ServiceCollection, TracingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(TracingObserver::new()));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        TracingObserver
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(service = key.display_name(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(service = key.display_name(), ?duration, "resolved");
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(service = key.display_name(), %error, "resolution failed");
    }
}
