//! k6-style terminal summary renderer for load test results.
//!
//! [`render_summary`] is a pure function: it takes a [`TestResult`] and the
//! script that produced it and returns a formatted [`String`]. Colors come from
//! the `colored` crate and respect `colored::control::set_override(false)`,
//! which the CLI sets for `--no-color` or piped output.

use colored::Colorize;

use crate::loadtest::model::{Script, TestConfig, TestResult};

/// Width for dotted metric row padding.
const PAD_WIDTH: usize = 32;

/// Render a k6-style terminal summary.
///
/// # Layout
///
/// ```text
///           /\      |  loadrig
///          /  \     |
///     /\  /    \    |  script:    3f0c5c9e-...
///    /  \/      \   |  type:      load
///   /    \       \  |  vus:       10
///  /      \       \ |  duration:  30s (2 steps)
///
///   http_req_duration...........: avg=45ms  p90=80ms  p95=120ms  p99=200ms
///   http_reqs...................: 1000
///   http_req_success............: 950
///   http_req_failed.............: 50 (5.0%)
///   http_req_rate...............: 33.3 req/s
///   iterations..................: 500
/// ```
pub fn render_summary(result: &TestResult, config: &TestConfig, script: &Script) -> String {
    let mut lines = Vec::new();

    lines.push(render_header(result, config, script.steps.len()));

    let latency_value = format!(
        "avg={}ms  p90={}ms  p95={}ms  p99={}ms",
        result.avg_latency_ms, result.p90_latency_ms, result.p95_latency_ms, result.p99_latency_ms
    );
    let latency_colored = if result.p99_latency_ms < 1000 {
        latency_value.green().to_string()
    } else {
        latency_value.yellow().to_string()
    };
    lines.push(format_metric_row(
        "http_req_duration",
        &latency_colored,
        PAD_WIDTH,
    ));

    lines.push(format_metric_row(
        "http_reqs",
        &result.total_requests.to_string(),
        PAD_WIDTH,
    ));
    lines.push(format_metric_row(
        "http_req_success",
        &result.success.to_string().green().to_string(),
        PAD_WIDTH,
    ));

    let failure_pct = result.failure_rate() * 100.0;
    let failure_str = format!("{} ({failure_pct:.1}%)", result.failure);
    let failure_colored = if failure_pct > 5.0 {
        failure_str.red().to_string()
    } else if failure_pct > 1.0 {
        failure_str.yellow().to_string()
    } else {
        failure_str
    };
    lines.push(format_metric_row(
        "http_req_failed",
        &failure_colored,
        PAD_WIDTH,
    ));

    lines.push(format_metric_row(
        "http_req_rate",
        &format!("{:.1} req/s", result.rps),
        PAD_WIDTH,
    ));
    lines.push(format_metric_row(
        "iterations",
        &result.iterations.to_string(),
        PAD_WIDTH,
    ));

    if !result.errors.is_empty() {
        lines.push(String::new());
        lines.push("  errors:".to_string());
        let mut categories: Vec<_> = result.errors.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1));
        for (category, count) in categories {
            lines.push(format_metric_row(
                &format!("    {category}"),
                &count.to_string().red().to_string(),
                PAD_WIDTH,
            ));
        }
    }

    lines.join("\n")
}

/// Render the ASCII art header with run details.
fn render_header(result: &TestResult, config: &TestConfig, step_count: usize) -> String {
    format!(
        r#"
          /\      |  {}
         /  \     |
    /\  /    \    |  script:    {}
   /  \/      \   |  type:      {}
  /    \       \  |  vus:       {}
 /      \       \ |  duration:  {}s ({} steps)
"#,
        "loadrig".bold(),
        result.script_id,
        config.test_type,
        config.vus,
        config.duration,
        step_count,
    )
}

/// Format a single metric row with dot-padding.
///
/// Produces: `"  metric_name..................: value_string"`
fn format_metric_row(name: &str, value: &str, pad_width: usize) -> String {
    format!("  {name:.<pad_width$}: {value}")
}
