//! Failure surface for errors that cannot be returned to the caller
//!
//! Logging calls never fail. Errors raised inside a channel, by a deferred
//! continuation, or by an event listener end up here after the call that
//! triggered them has finished fanning out.

use super::error::LoggerError;
use super::metrics::LoggerMetrics;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A failure that happened away from the logging call site
#[derive(Debug)]
pub struct DispatchFailure {
    /// Index of the failing channel, `None` for event listeners
    pub channel: Option<usize>,
    pub error: LoggerError,
}

impl DispatchFailure {
    pub fn channel(index: usize, error: LoggerError) -> Self {
        Self {
            channel: Some(index),
            error,
        }
    }

    pub fn listener(error: LoggerError) -> Self {
        Self {
            channel: None,
            error,
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.channel {
            Some(idx) => write!(f, "Channel #{} failed: {}", idx, self.error),
            None => write!(f, "Event listener failed: {}", self.error),
        }
    }
}

/// Callback invoked for every reported failure
pub type FailureCallback = Arc<dyn Fn(&DispatchFailure) + Send + Sync>;

/// Shared handle that channels and processors report failures through
#[derive(Clone, Default)]
pub struct FailureReporter {
    handler: Arc<RwLock<Option<FailureCallback>>>,
    metrics: Arc<LoggerMetrics>,
}

impl FailureReporter {
    pub fn new(metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            handler: Arc::new(RwLock::new(None)),
            metrics,
        }
    }

    /// Replace the callback; `None` restores the stderr default
    pub fn set_handler(&self, handler: Option<FailureCallback>) {
        *self.handler.write() = handler;
    }

    pub fn report(&self, failure: DispatchFailure) {
        self.metrics.record_failure();

        let handler = self.handler.read().clone();
        match handler {
            Some(callback) => callback(&failure),
            None => eprintln!("[LOGGER ERROR] {}", failure),
        }
    }
}

impl fmt::Debug for FailureReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureReporter")
            .field("custom_handler", &self.handler.read().is_some())
            .finish()
    }
}
