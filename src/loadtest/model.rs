//! Script, run configuration and run result types.
//!
//! A [`Script`] is an ordered list of [`Step`]s that one virtual user executes
//! per iteration. A [`TestConfig`] says how many virtual users run it and for
//! how long. A [`TestResult`] is the immutable record of one completed run.
//!
//! All types serialize to the camelCase JSON used by the HTTP API and the
//! on-disk stores.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "id": "3f0c5c9e-6a43-4d3c-9a59-2b8f7c1e4d10",
//!   "steps": [
//!     { "type": "HTTP", "method": "GET", "url": "https://example.com/health" },
//!     { "type": "HTTP", "method": "POST", "url": "https://example.com/login",
//!       "header": { "Content-Type": "application/json" },
//!       "body": "{\"user\":\"demo\"}" }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol of a step. Only plain HTTP request/response is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepType {
    /// A single HTTP request.
    #[default]
    #[serde(rename = "HTTP")]
    Http,
}

/// One request definition, executed once per iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step protocol (defaults to `HTTP`).
    #[serde(rename = "type", default)]
    pub step_type: StepType,
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Absolute target URL.
    pub url: String,
    /// Request headers. Stored with the script but not sent by the engine.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub header: HashMap<String, String>,
    /// Request body. Stored with the script but not sent by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Step {
    /// Creates an HTTP step with no headers and no body.
    pub fn http(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            step_type: StepType::Http,
            method: method.into(),
            url: url.into(),
            header: HashMap::new(),
            body: None,
        }
    }

    /// Attaches a request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(name.into(), value.into());
        self
    }
}

/// An identified, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Unique script identifier.
    pub id: String,
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Creates a script from an id and its steps.
    pub fn new(id: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            steps,
        }
    }
}

/// Informational label for the kind of test being run.
///
/// The engine behaves identically for every variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Minimal sanity run.
    Smoke,
    /// Expected production load.
    #[default]
    Load,
    /// Load beyond expected capacity.
    Stress,
    /// Sudden burst of load.
    Spike,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Smoke => "smoke",
            Self::Load => "load",
            Self::Stress => "stress",
            Self::Spike => "spike",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Self::Smoke),
            "load" => Ok(Self::Load),
            "stress" => Ok(Self::Stress),
            "spike" => Ok(Self::Spike),
            other => Err(format!(
                "unknown test type '{other}' (expected smoke, load, stress or spike)"
            )),
        }
    }
}

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    /// Script to run.
    pub script_id: String,
    /// Informational test type tag.
    #[serde(rename = "type", default)]
    pub test_type: TestType,
    /// Number of concurrent virtual users.
    #[serde(default)]
    pub vus: u32,
    /// Run duration in seconds.
    #[serde(default)]
    pub duration: u64,
}

impl TestConfig {
    /// Creates a `load` config for the given script.
    pub fn new(script_id: impl Into<String>, vus: u32, duration: u64) -> Self {
        Self {
            script_id: script_id.into(),
            test_type: TestType::Load,
            vus,
            duration,
        }
    }

    /// Sets the informational test type.
    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_type = test_type;
        self
    }
}

/// Immutable outcome of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Run identifier derived from the start time (`YYYYMMDDHHMMSS`).
    pub test_id: String,
    /// Script that was run.
    pub script_id: String,
    /// Requests dispatched (success + failure).
    pub total_requests: u64,
    /// Requests that completed with a status below 400.
    pub success: u64,
    /// Requests that errored or returned a status of 400 or above.
    pub failure: u64,
    /// Mean latency in milliseconds.
    pub avg_latency_ms: u64,
    /// 90th percentile latency in milliseconds.
    pub p90_latency_ms: u64,
    /// 95th percentile latency in milliseconds.
    pub p95_latency_ms: u64,
    /// 99th percentile latency in milliseconds.
    pub p99_latency_ms: u64,
    /// Requests per second over the actual run time.
    pub rps: f64,
    /// Full script passes completed by all virtual users combined.
    pub iterations: u64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Failure counts by category (`http`, `timeout`, `connection`,
    /// `invalid_request`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, u64>,
}

impl TestResult {
    /// Failed fraction of all requests (0.0..=1.0). Returns 0.0 if empty.
    pub fn failure_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.failure as f64 / self.total_requests as f64
    }
}

/// Formats the run identifier for a start time.
pub fn test_id_for(started_at: &DateTime<Utc>) -> String {
    started_at.format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_script_json() {
        let json = r#"{
            "id": "s1",
            "steps": [
                { "type": "HTTP", "method": "GET", "url": "http://localhost/a" },
                { "method": "POST", "url": "http://localhost/b",
                  "header": { "X-Token": "t" }, "body": "{}" }
            ]
        }"#;
        let script: Script = serde_json::from_str(json).unwrap();
        assert_eq!(script.id, "s1");
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].step_type, StepType::Http);
        assert_eq!(script.steps[1].step_type, StepType::Http);
        assert_eq!(script.steps[1].header.get("X-Token").unwrap(), "t");
        assert_eq!(script.steps[1].body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_step_omits_empty_header_and_body() {
        let value = serde_json::to_value(Step::http("GET", "http://localhost/")).unwrap();
        assert_eq!(value["type"], "HTTP");
        assert!(value.get("header").is_none());
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_parse_test_config_camel_case() {
        let json = r#"{ "scriptId": "abc", "type": "stress", "vus": 5, "duration": 10 }"#;
        let config: TestConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.script_id, "abc");
        assert_eq!(config.test_type, TestType::Stress);
        assert_eq!(config.vus, 5);
        assert_eq!(config.duration, 10);
    }

    #[test]
    fn test_test_config_type_defaults_to_load() {
        let config: TestConfig = serde_json::from_str(r#"{ "scriptId": "abc" }"#).unwrap();
        assert_eq!(config.test_type, TestType::Load);
        assert_eq!(config.vus, 0);
        assert_eq!(config.duration, 0);
    }

    #[test]
    fn test_test_type_from_str() {
        assert_eq!("Spike".parse::<TestType>().unwrap(), TestType::Spike);
        assert_eq!("smoke".parse::<TestType>().unwrap(), TestType::Smoke);
        assert!("soak".parse::<TestType>().is_err());
        assert_eq!(TestType::Stress.to_string(), "stress");
    }

    #[test]
    fn test_test_id_format() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(test_id_for(&ts), "20260309070501");
    }

    #[test]
    fn test_result_json_field_names() {
        let result = TestResult {
            test_id: "20260101000000".to_string(),
            script_id: "s1".to_string(),
            total_requests: 3,
            success: 2,
            failure: 1,
            avg_latency_ms: 10,
            p90_latency_ms: 12,
            p95_latency_ms: 13,
            p99_latency_ms: 14,
            rps: 1.5,
            iterations: 3,
            started_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            errors: BTreeMap::new(),
        };
        let value = serde_json::to_value(&result).unwrap();
        for key in [
            "testId",
            "scriptId",
            "totalRequests",
            "success",
            "failure",
            "avgLatencyMs",
            "p90LatencyMs",
            "p95LatencyMs",
            "p99LatencyMs",
            "rps",
            "iterations",
            "startedAt",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_failure_rate() {
        let json = r#"{
            "testId": "20260101000000", "scriptId": "s1",
            "totalRequests": 10, "success": 7, "failure": 3,
            "avgLatencyMs": 1, "p90LatencyMs": 1, "p95LatencyMs": 1, "p99LatencyMs": 1,
            "rps": 1.0, "iterations": 10, "startedAt": "2026-01-01T00:00:00Z"
        }"#;
        let mut result: TestResult = serde_json::from_str(json).unwrap();
        assert!((result.failure_rate() - 0.3).abs() < 1e-9);

        result.total_requests = 0;
        result.success = 0;
        result.failure = 0;
        assert_eq!(result.failure_rate(), 0.0);
    }

    #[test]
    fn test_result_without_errors_field_deserializes() {
        let json = r#"{
            "testId": "20260101000000", "scriptId": "s1",
            "totalRequests": 0, "success": 0, "failure": 0,
            "avgLatencyMs": 0, "p90LatencyMs": 0, "p95LatencyMs": 0, "p99LatencyMs": 0,
            "rps": 0.0, "iterations": 0, "startedAt": "2026-01-01T00:00:00Z"
        }"#;
        let result: TestResult = serde_json::from_str(json).unwrap();
        assert!(result.errors.is_empty());
    }
}
