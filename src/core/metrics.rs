//! Logger metrics for observability
//!
//! Counters for dispatched and gated calls, reported failures and published
//! control events.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use logchain::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_failure();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Calls that passed the level gate and were fanned out
    dispatched: AtomicU64,

    /// Calls rejected by the level gate
    gated: AtomicU64,

    /// Failures handed to the failure surface
    failures: AtomicU64,

    /// Control events published to subscribers
    events_published: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            gated: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn gated(&self) -> u64 {
        self.gated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_gated(&self) -> u64 {
        self.gated.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failure(&self) -> u64 {
        self.failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_event(&self) -> u64 {
        self.events_published.fetch_add(1, Ordering::Relaxed)
    }

    /// Failures per dispatched call as a percentage (0.0 - 100.0)
    ///
    /// A single call can fail in several channels, so the rate can exceed
    /// 100 when many channels fail together.
    pub fn failure_rate(&self) -> f64 {
        let dispatched = self.dispatched() as f64;
        if dispatched == 0.0 {
            0.0
        } else {
            (self.failures() as f64 / dispatched) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.gated.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.events_published.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            gated: AtomicU64::new(self.gated()),
            failures: AtomicU64::new(self.failures()),
            events_published: AtomicU64::new(self.events_published()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.gated(), 0);
        assert_eq!(metrics.failures(), 0);
        assert_eq!(metrics.events_published(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_gated(), 0);
        assert_eq!(metrics.record_gated(), 1);
        assert_eq!(metrics.gated(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..10 {
            metrics.record_dispatched();
        }
        metrics.record_failure();

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_event();
        metrics.reset();

        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.events_published(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();

        let snapshot = metrics.clone();
        metrics.record_dispatched();

        assert_eq!(snapshot.dispatched(), 1);
        assert_eq!(metrics.dispatched(), 2);
    }
}
