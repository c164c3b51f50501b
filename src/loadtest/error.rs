//! Error types for the load testing engine.
//!
//! Defines [`RequestError`] for failures of a single step request and
//! [`ValidationError`] for scripts that cannot be handed to the engine.
//!
//! Request errors never abort a run: the executor folds them into the
//! failure count. Validation errors are raised before a run starts.

/// Failure of a single step request.
///
/// Each variant represents a distinct failure category that the metrics
/// aggregator counts and reports separately.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The server answered with a status code of 400 or above.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The request exceeded the per-request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS resolution, TCP connect, TLS handshake,
    /// or the connection dropping mid-response).
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The request could not be constructed from the step (malformed method
    /// or URL).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl RequestError {
    /// Returns the error category as a static string for metrics classification.
    ///
    /// Categories: `"http"`, `"timeout"`, `"connection"`, `"invalid_request"`.
    pub fn error_category(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Timeout => "timeout",
            Self::Connection { .. } => "connection",
            Self::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Classify a [`reqwest::Error`] into the appropriate [`RequestError`] variant.
    pub fn classify_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidRequest {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Connection {
                message: err.to_string(),
            }
        }
    }
}

/// Precondition violations that keep a script from being run.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The referenced script does not exist.
    #[error("script not found: {id}")]
    ScriptNotFound { id: String },

    /// The script has no steps to execute.
    #[error("script has no steps")]
    NoSteps,

    /// A step has an empty URL. `step` is the 1-based step position.
    #[error("step {step}: url is empty")]
    EmptyUrl { step: usize },

    /// A step has an empty method. `step` is the 1-based step position.
    #[error("step {step}: method is empty")]
    EmptyMethod { step: usize },
}
