//! Shared metrics accumulator for one load test run.
//!
//! Provides [`MetricsAggregator`], a cloneable handle that every virtual user
//! records into, and [`MetricsSnapshot`], the owned copy the engine reads once
//! all virtual users have exited.
//!
//! # Design
//!
//! - **One lock**: counters and the latency sample live behind a single
//!   `parking_lot::Mutex`, so a record is never observed half-applied.
//! - **Short critical section**: the lock is taken only inside
//!   [`MetricsAggregator::record`], after the request has completed.
//! - **Raw samples**: latencies are kept as-is (milliseconds) so percentiles
//!   are exact nearest-rank values rather than histogram approximations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::loadtest::error::RequestError;

/// Outcome of one dispatched request.
pub type Outcome = Result<(), RequestError>;

/// A single request measurement.
///
/// Created via [`RequestSample::success`] or [`RequestSample::error`].
#[derive(Debug, Clone)]
pub struct RequestSample {
    /// Wall-clock duration of the request.
    pub duration: Duration,
    /// `Ok(())` for success, `Err(RequestError)` for failure.
    pub result: Outcome,
}

impl RequestSample {
    /// Create a success sample.
    pub fn success(duration: Duration) -> Self {
        Self {
            duration,
            result: Ok(()),
        }
    }

    /// Create an error sample.
    pub fn error(duration: Duration, err: RequestError) -> Self {
        Self {
            duration,
            result: Err(err),
        }
    }

    /// Latency in whole milliseconds.
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns `true` if the request succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Point-in-time copy of the aggregator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total requests recorded (success + failure).
    pub total_requests: u64,
    /// Successful requests.
    pub success_count: u64,
    /// Failed requests.
    pub failure_count: u64,
    /// Every recorded latency in milliseconds, in record order.
    pub latencies_ms: Vec<u64>,
    /// Failure counts by classification (http, timeout, connection,
    /// invalid_request).
    pub error_category_counts: BTreeMap<String, u64>,
}

/// Thread-safe accumulator shared by all virtual users of a run.
///
/// Cloning yields another handle to the same state.
///
/// # Example
///
/// ```
/// use loadrig::loadtest::metrics::MetricsAggregator;
///
/// let metrics = MetricsAggregator::new();
/// metrics.record(42, &Ok(()));
///
/// let snap = metrics.snapshot();
/// assert_eq!(snap.total_requests, 1);
/// assert_eq!(snap.latencies_ms, vec![42]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl MetricsAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one request: bumps the total and the success or failure count,
    /// and appends the latency to the sample.
    pub fn record(&self, latency_ms: u64, outcome: &Outcome) {
        let mut state = self.inner.lock();
        state.total_requests += 1;
        state.latencies_ms.push(latency_ms);
        match outcome {
            Ok(()) => state.success_count += 1,
            Err(err) => {
                state.failure_count += 1;
                *state
                    .error_category_counts
                    .entry(err.error_category().to_owned())
                    .or_insert(0) += 1;
            },
        }
    }

    /// Records a [`RequestSample`].
    pub fn record_sample(&self, sample: &RequestSample) {
        self.record(sample.latency_ms(), &sample.result);
    }

    /// Copies the current state out of the lock.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_aggregator_has_zero_counts() {
        let snap = MetricsAggregator::new().snapshot();
        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.success_count, 0);
        assert_eq!(snap.failure_count, 0);
        assert!(snap.latencies_ms.is_empty());
    }

    #[test]
    fn test_record_success_and_failure() {
        let metrics = MetricsAggregator::new();
        for _ in 0..5 {
            metrics.record(10, &Ok(()));
        }
        for _ in 0..3 {
            metrics.record(500, &Err(RequestError::Timeout));
        }
        let snap = metrics.snapshot();
        assert_eq!(snap.success_count, 5);
        assert_eq!(snap.failure_count, 3);
        assert_eq!(snap.total_requests, 8);
        assert_eq!(snap.latencies_ms.len(), 8);
    }

    #[test]
    fn test_failures_keep_latency_samples() {
        let metrics = MetricsAggregator::new();
        metrics.record(120, &Err(RequestError::Http { status: 503 }));
        assert_eq!(metrics.snapshot().latencies_ms, vec![120]);
    }

    #[test]
    fn test_error_category_counts_tracked() {
        let metrics = MetricsAggregator::new();
        metrics.record(10, &Err(RequestError::Timeout));
        metrics.record(10, &Err(RequestError::Timeout));
        metrics.record(10, &Err(RequestError::Http { status: 500 }));
        metrics.record(
            10,
            &Err(RequestError::InvalidRequest {
                message: "bad url".to_string(),
            }),
        );
        metrics.record(10, &Ok(()));

        let snap = metrics.snapshot();
        assert_eq!(snap.error_category_counts.get("timeout"), Some(&2));
        assert_eq!(snap.error_category_counts.get("http"), Some(&1));
        assert_eq!(snap.error_category_counts.get("invalid_request"), Some(&1));
        assert_eq!(snap.error_category_counts.get("connection"), None);
    }

    #[test]
    fn test_record_sample_converts_duration() {
        let metrics = MetricsAggregator::new();
        metrics.record_sample(&RequestSample::success(Duration::from_micros(42_900)));
        metrics.record_sample(&RequestSample::error(
            Duration::from_millis(7),
            RequestError::Connection {
                message: "refused".to_string(),
            },
        ));
        let snap = metrics.snapshot();
        assert_eq!(snap.latencies_ms, vec![42, 7]);
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.failure_count, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let metrics = MetricsAggregator::new();
        let other = metrics.clone();
        other.record(1, &Ok(()));
        assert_eq!(metrics.snapshot().total_requests, 1);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let metrics = MetricsAggregator::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for i in 0..1_000 {
                        if (t + i) % 4 == 0 {
                            metrics.record(i, &Err(RequestError::Timeout));
                        } else {
                            metrics.record(i, &Ok(()));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 8_000);
        assert_eq!(snap.success_count + snap.failure_count, 8_000);
        assert_eq!(snap.latencies_ms.len(), 8_000);
    }
}
