//! Per-step request execution.
//!
//! [`Transport`] is the seam between the engine and the network: it performs
//! one request for a [`Step`] and hands back a [`Reply`] as soon as the
//! response head has arrived. [`HttpTransport`] is the production
//! implementation over a shared [`reqwest::Client`].
//!
//! [`execute_step`] wraps any transport with timing and outcome classification.
//! The clock stops when the reply arrives; the body is drained afterwards, so
//! download time is not part of the latency. Every call yields a
//! [`RequestSample`], including calls that fail before a request could be
//! built.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Response};

use crate::loadtest::error::RequestError;
use crate::loadtest::metrics::RequestSample;
use crate::loadtest::model::Step;

/// Per-request timeout applied by [`HttpTransport::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response head of one exchange, with the body still pending.
#[derive(Debug)]
pub struct Reply {
    status: u16,
    body: Option<Response>,
}

impl Reply {
    /// A reply with no body to drain.
    pub fn new(status: u16) -> Self {
        Self { status, body: None }
    }

    /// A reply whose body is read off the connection by [`Reply::drain`].
    pub fn with_body(response: Response) -> Self {
        Self {
            status: response.status().as_u16(),
            body: Some(response),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reads and discards the body so the connection returns to the pool.
    pub async fn drain(self) {
        if let Some(response) = self.body {
            if let Err(e) = response.bytes().await {
                tracing::debug!(status = self.status, error = %e, "failed to drain response body");
            }
        }
    }
}

/// Performs the network call for one step.
///
/// Implementations return a [`Reply`] for any completed exchange, whatever
/// the status, and an error only when no response was received.
/// Implementations must be safe to share between all virtual users.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues the request described by `step` and returns once the response
    /// head is available.
    async fn send(&self, step: &Step) -> Result<Reply, RequestError>;
}

/// HTTP transport backed by one connection-pooling [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the default 30 second per-request timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a transport with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, step: &Step) -> Result<Reply, RequestError> {
        let method = Method::from_bytes(step.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|e| RequestError::InvalidRequest {
                message: format!("invalid method '{}': {e}", step.method),
            })?;
        let request = self
            .client
            .request(method, step.url.as_str())
            .build()
            .map_err(|e| RequestError::InvalidRequest {
                message: e.to_string(),
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| RequestError::classify_reqwest(&e))?;

        Ok(Reply::with_body(response))
    }
}

/// Classifies a transport result: a status below 400 is a success.
pub fn classify_status(result: Result<u16, RequestError>) -> Result<(), RequestError> {
    match result {
        Ok(status) if status < 400 => Ok(()),
        Ok(status) => Err(RequestError::Http { status }),
        Err(err) => Err(err),
    }
}

/// Executes one step and measures it.
///
/// The clock starts just before the transport call and stops when the
/// response head (or an error) arrives, so failed requests carry a latency
/// too. The body is drained after the measurement.
pub async fn execute_step(transport: &dyn Transport, step: &Step) -> RequestSample {
    let start = Instant::now();
    let result = transport.send(step).await;
    let duration = start.elapsed();

    let status = match result {
        Ok(reply) => {
            let status = reply.status();
            reply.drain().await;
            Ok(status)
        },
        Err(err) => Err(err),
    };

    match classify_status(status) {
        Ok(()) => RequestSample::success(duration),
        Err(err) => RequestSample::error(duration, err),
    }
}
