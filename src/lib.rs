//! # loadrig
//!
//! Script-driven HTTP load testing.
//!
//! A [`Script`](loadtest::model::Script) is an ordered list of HTTP steps.
//! [`LoadEngine`](loadtest::engine::LoadEngine) runs a fixed number of
//! virtual users that repeat the script until a deadline, then reports
//! request counts, latency percentiles and throughput as a
//! [`TestResult`](loadtest::model::TestResult).
//!
//! ```no_run
//! use std::time::Duration;
//! use loadrig::loadtest::engine::LoadEngine;
//! use loadrig::loadtest::model::{Script, Step, TestConfig};
//!
//! # async fn demo() -> Result<(), reqwest::Error> {
//! let script = Script::new("health", vec![Step::http("GET", "http://localhost:8080/health")]);
//! let engine = LoadEngine::http(Duration::from_secs(30))?;
//! let result = engine.run(&script, &TestConfig::new("health", 5, 10)).await;
//! println!("p95 = {}ms", result.p95_latency_ms);
//! # Ok(())
//! # }
//! ```
//!
//! The [`api`] module exposes the same operations over HTTP, backed by the
//! file stores in [`storage`].

pub mod api;
pub mod config;
pub mod generator;
pub mod loadtest;
pub mod logging;
pub mod service;
pub mod storage;
