//! Property-based tests for the latency calculator and metrics aggregator.

use proptest::prelude::*;

use loadrig::loadtest::error::RequestError;
use loadrig::loadtest::metrics::MetricsAggregator;
use loadrig::loadtest::percentile::{percentile, LatencySummary};

proptest! {
    /// P90 <= P95 <= P99 and avg lies within [min, max].
    #[test]
    fn summary_is_ordered(latencies in prop::collection::vec(0u64..10_000, 1..300)) {
        let summary = LatencySummary::from_samples(&latencies);
        prop_assert!(summary.p90 <= summary.p95);
        prop_assert!(summary.p95 <= summary.p99);
        prop_assert!(summary.min <= summary.avg);
        prop_assert!(summary.avg <= summary.max);
        prop_assert!(summary.p99 <= summary.max);
        prop_assert_eq!(summary.max, *latencies.iter().max().unwrap());
    }

    /// Percentile is monotonic in p and always one of the samples.
    #[test]
    fn percentile_monotonic(
        mut latencies in prop::collection::vec(0u64..10_000, 1..300),
        p1 in 0.0f64..100.0,
        p2 in 0.0f64..100.0,
    ) {
        latencies.sort_unstable();
        let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        let a = percentile(&latencies, lo);
        let b = percentile(&latencies, hi);
        prop_assert!(a <= b);
        prop_assert!(latencies.contains(&a));
    }

    /// Computing a summary leaves the input untouched and is repeatable.
    #[test]
    fn summary_is_pure(latencies in prop::collection::vec(0u64..10_000, 0..100)) {
        let before = latencies.clone();
        let first = LatencySummary::from_samples(&latencies);
        let second = LatencySummary::from_samples(&latencies);
        prop_assert_eq!(&latencies, &before);
        prop_assert_eq!(first, second);
    }

    /// Totals always equal success + failure, and every request is sampled.
    #[test]
    fn aggregator_totals(
        outcomes in prop::collection::vec((0u64..1_000, 0u16..600), 0..200),
    ) {
        let metrics = MetricsAggregator::new();
        for (latency, status) in &outcomes {
            let outcome = if *status < 400 {
                Ok(())
            } else {
                Err(RequestError::Http { status: *status })
            };
            metrics.record(*latency, &outcome);
        }

        let snap = metrics.snapshot();
        let failures = outcomes.iter().filter(|(_, s)| *s >= 400).count() as u64;
        prop_assert_eq!(snap.total_requests, outcomes.len() as u64);
        prop_assert_eq!(snap.total_requests, snap.success_count + snap.failure_count);
        prop_assert_eq!(snap.failure_count, failures);
        prop_assert_eq!(snap.latencies_ms.len(), outcomes.len());
        prop_assert_eq!(
            snap.error_category_counts.get("http").copied().unwrap_or(0),
            failures
        );
    }
}
