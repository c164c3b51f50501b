//! Virtual user (VU) task loop for load test execution.
//!
//! Each VU repeatedly runs every step of the script in order until the run
//! deadline passes. The deadline is only checked between iterations: an
//! iteration that starts before the deadline always runs to completion, so a
//! run can overrun its nominal duration by up to one iteration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::loadtest::client::{execute_step, Transport};
use crate::loadtest::metrics::MetricsAggregator;
use crate::loadtest::model::Script;

/// Atomic counter of completed iterations across all virtual users.
///
/// Lightweight wrapper around `Arc<AtomicU64>` for clone-friendly sharing
/// across VU tasks and the engine.
#[derive(Debug, Clone, Default)]
pub struct IterationCounter(Arc<AtomicU64>);

impl IterationCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count by one.
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current count.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Main virtual user task loop.
///
/// Each pass:
/// 1. Checks the deadline; returns once it has passed.
/// 2. Executes every step in script order, recording each into `metrics`.
/// 3. Increments `iterations`.
///
/// Request failures are recorded and the loop carries on.
pub async fn vu_loop(
    vu_id: u32,
    script: Arc<Script>,
    transport: Arc<dyn Transport>,
    metrics: MetricsAggregator,
    iterations: IterationCounter,
    deadline: Instant,
) {
    let mut completed: u64 = 0;

    while Instant::now() < deadline {
        for step in &script.steps {
            let sample = execute_step(transport.as_ref(), step).await;
            metrics.record_sample(&sample);
        }
        iterations.increment();
        completed += 1;
    }

    tracing::debug!(vu = vu_id, iterations = completed, "virtual user finished");
}
