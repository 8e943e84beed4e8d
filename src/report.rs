//! Failure reporting.
//!
//! The engine knows nothing about the host test harness. Every verification
//! failure and every fatal condition is handed to one injectable callback,
//! the [`Reporter`]. What the callback does (fail the test, print, collect)
//! is up to the host.

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::tracing_compat::warn;

/// The injectable `report(message)` callback.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn Fn(&str) + Send + Sync>,
}

impl Reporter {
    /// Wraps an arbitrary callback.
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Panics with the message. This fails the current test, which is the
    /// conventional meaning of a failed assertion under `cargo test`.
    #[must_use]
    pub fn panicking() -> Self {
        Self::new(|message| panic!("{message}"))
    }

    /// Logs the message at `warn` and carries on.
    #[must_use]
    pub fn logging() -> Self {
        Self::new(|message| {
            warn!(message = %message, "decoy failure reported");
        })
    }

    /// Records every message in the returned [`FailureLog`].
    #[must_use]
    pub fn collecting() -> (Self, FailureLog) {
        let log = FailureLog::default();
        let messages = Arc::clone(&log.messages);
        let reporter = Self::new(move |message| messages.lock().push(message.to_owned()));
        (reporter, log)
    }

    /// Delivers a message to the callback.
    pub fn report(&self, message: &str) {
        (self.sink)(message);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::panicking()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

/// Messages captured by [`Reporter::collecting`].
#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl FailureLog {
    /// Snapshot of every reported message, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of reported messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// The most recent message.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }

    /// Forgets every captured message.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}
