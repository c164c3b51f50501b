//! Load testing engine for recorded HTTP scripts.
//!
//! Provides the script/run data model, a pluggable request transport,
//! a shared metrics aggregator, nearest-rank latency statistics and the
//! virtual user driver that ties them together.

pub mod client;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod percentile;
pub mod summary;
pub mod validation;
pub mod vu;
