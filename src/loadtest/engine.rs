//! Load test execution engine.
//!
//! [`LoadEngine`] is the top-level driver that:
//! - Spawns one virtual user task per configured VU via [`TaskTracker`]
//! - Shares one [`MetricsAggregator`] and one [`IterationCounter`] between them
//! - Waits for every task to exit, then turns the final snapshot into a
//!   [`TestResult`]
//!
//! There is no mid-run cancellation. Each VU stops on its own once the
//! deadline has passed and its current iteration has finished.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::task::TaskTracker;

use crate::loadtest::client::{HttpTransport, Transport};
use crate::loadtest::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::loadtest::model::{test_id_for, Script, TestConfig, TestResult};
use crate::loadtest::percentile::{requests_per_second, LatencySummary};
use crate::loadtest::vu::{vu_loop, IterationCounter};

/// Drives virtual users against a script through a shared [`Transport`].
#[derive(Clone)]
pub struct LoadEngine {
    transport: Arc<dyn Transport>,
}

impl LoadEngine {
    /// Creates an engine over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Creates an engine over an [`HttpTransport`] with the given per-request
    /// timeout.
    pub fn http(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::with_timeout(request_timeout)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Runs `config.vus` virtual users for `config.duration` seconds.
    ///
    /// The script is assumed valid (see
    /// [`validate_script`](crate::loadtest::validation::validate_script)).
    /// Request failures are counted, never returned: every call produces a
    /// result. Returns only after all virtual users have exited.
    pub async fn run(&self, script: &Script, config: &TestConfig) -> TestResult {
        let started_at = Utc::now();
        let test_start = Instant::now();
        let deadline = test_start + Duration::from_secs(config.duration);

        tracing::info!(
            script_id = %config.script_id,
            test_type = %config.test_type,
            vus = config.vus,
            duration_secs = config.duration,
            steps = script.steps.len(),
            "starting load test"
        );

        let tracker = TaskTracker::new();
        let metrics = MetricsAggregator::new();
        let iterations = IterationCounter::new();
        let script = Arc::new(script.clone());

        for vu_id in 0..config.vus {
            tracker.spawn(vu_loop(
                vu_id,
                script.clone(),
                self.transport.clone(),
                metrics.clone(),
                iterations.clone(),
                deadline,
            ));
        }

        // Drain: close tracker and wait for all VU tasks
        tracker.close();
        tracker.wait().await;

        let elapsed = test_start.elapsed();
        let result = build_result(
            config,
            &metrics.snapshot(),
            iterations.get(),
            elapsed,
            started_at,
        );

        tracing::info!(
            test_id = %result.test_id,
            total_requests = result.total_requests,
            failures = result.failure,
            iterations = result.iterations,
            elapsed_ms = elapsed.as_millis() as u64,
            "load test finished"
        );

        result
    }
}

/// Builds the immutable run record from the final metrics snapshot.
fn build_result(
    config: &TestConfig,
    snapshot: &MetricsSnapshot,
    iterations: u64,
    elapsed: Duration,
    started_at: chrono::DateTime<Utc>,
) -> TestResult {
    let latency = LatencySummary::from_samples(&snapshot.latencies_ms);

    TestResult {
        test_id: test_id_for(&started_at),
        script_id: config.script_id.clone(),
        total_requests: snapshot.total_requests,
        success: snapshot.success_count,
        failure: snapshot.failure_count,
        avg_latency_ms: latency.avg,
        p90_latency_ms: latency.p90,
        p95_latency_ms: latency.p95,
        p99_latency_ms: latency.p99,
        rps: requests_per_second(snapshot.total_requests, elapsed),
        iterations,
        started_at,
        errors: snapshot.error_category_counts.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadtest::client::Reply;
    use crate::loadtest::error::RequestError;
    use crate::loadtest::model::Step;
    use async_trait::async_trait;

    struct FixedTransport {
        latency: Duration,
        status: u16,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _step: &Step) -> Result<Reply, RequestError> {
            tokio::time::sleep(self.latency).await;
            Ok(Reply::new(self.status))
        }
    }

    fn engine(latency_ms: u64, status: u16) -> LoadEngine {
        LoadEngine::new(Arc::new(FixedTransport {
            latency: Duration::from_millis(latency_ms),
            status,
        }))
    }

    fn one_step_script() -> Script {
        Script::new("s1", vec![Step::http("GET", "http://localhost/")])
    }

    #[tokio::test]
    async fn test_zero_vus_yields_empty_result() {
        let result = engine(1, 200)
            .run(&one_step_script(), &TestConfig::new("s1", 0, 1))
            .await;
        assert_eq!(result.total_requests, 0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.avg_latency_ms, 0);
        assert_eq!(result.p99_latency_ms, 0);
        assert_eq!(result.rps, 0.0);
        assert_eq!(result.script_id, "s1");
    }

    #[tokio::test]
    async fn test_zero_duration_yields_empty_result() {
        let result = engine(1, 200)
            .run(&one_step_script(), &TestConfig::new("s1", 4, 0))
            .await;
        assert_eq!(result.total_requests, 0);
        assert_eq!(result.success, 0);
        assert_eq!(result.failure, 0);
        assert_eq!(result.avg_latency_ms, 0);
        assert_eq!(result.rps, 0.0);
    }

    #[tokio::test]
    async fn test_totals_match_iterations_times_steps() {
        let script = Script::new(
            "s1",
            vec![
                Step::http("GET", "http://localhost/a"),
                Step::http("GET", "http://localhost/b"),
            ],
        );
        let result = engine(5, 200)
            .run(&script, &TestConfig::new("s1", 3, 1))
            .await;
        assert!(result.iterations > 0);
        assert_eq!(result.total_requests, result.iterations * 2);
        assert_eq!(result.total_requests, result.success + result.failure);
        assert_eq!(result.failure, 0);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_counted_as_failure() {
        let result = engine(5, 500)
            .run(&one_step_script(), &TestConfig::new("s1", 2, 1))
            .await;
        assert!(result.total_requests > 0);
        assert_eq!(result.success, 0);
        assert_eq!(result.failure, result.total_requests);
        assert_eq!(result.errors.get("http"), Some(&result.failure));
    }

    #[tokio::test]
    async fn test_test_id_derived_from_start_time() {
        let result = engine(1, 200)
            .run(&one_step_script(), &TestConfig::new("s1", 0, 0))
            .await;
        assert_eq!(result.test_id, test_id_for(&result.started_at));
    }

    #[test]
    fn test_build_result_from_snapshot() {
        let snapshot = MetricsSnapshot {
            total_requests: 4,
            success_count: 3,
            failure_count: 1,
            latencies_ms: vec![40, 10, 30, 20],
            error_category_counts: [("timeout".to_string(), 1)].into_iter().collect(),
        };
        let started_at = Utc::now();
        let result = build_result(
            &TestConfig::new("s9", 2, 2),
            &snapshot,
            4,
            Duration::from_secs(2),
            started_at,
        );
        assert_eq!(result.script_id, "s9");
        assert_eq!(result.avg_latency_ms, 25);
        assert_eq!(result.p90_latency_ms, 40);
        assert_eq!(result.iterations, 4);
        assert!((result.rps - 2.0).abs() < f64::EPSILON);
        assert_eq!(result.errors.get("timeout"), Some(&1));
        assert_eq!(result.started_at, started_at);
    }
}
