//! Nearest-rank latency statistics.
//!
//! Everything here is a pure function over a latency sample in milliseconds,
//! so it can be tested without running any virtual users.

use std::time::Duration;

/// Nearest-rank percentile of an ascending-sorted sample.
///
/// The rank is `floor(p * n / 100)`, clamped to the last element.
/// Returns 0 for an empty sample.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let n = sorted.len();
    let rank = (p.max(0.0) * n as f64 / 100.0).floor() as usize;
    sorted[rank.min(n - 1)]
}

/// Integer mean of a sample. Returns 0 for an empty sample.
pub fn average(samples: &[u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: u128 = samples.iter().map(|&v| u128::from(v)).sum();
    (sum / samples.len() as u128) as u64
}

/// Throughput over the elapsed wall-clock time. Returns 0.0 when no time
/// has elapsed.
pub fn requests_per_second(total_requests: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    total_requests as f64 / secs
}

/// Latency statistics of one run, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub avg: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
    pub min: u64,
    pub max: u64,
}

impl LatencySummary {
    /// Computes the summary from an unsorted sample.
    ///
    /// The sample is copied before sorting; the caller's slice is left as is.
    pub fn from_samples(samples: &[u64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        Self {
            avg: average(&sorted),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            min: sorted.first().copied().unwrap_or(0),
            max: sorted.last().copied().unwrap_or(0),
        }
    }
}
