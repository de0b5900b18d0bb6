/*!
 * HTTP transport for delivering serialized reports.
 *
 * `Transport` is the seam between the worker and the network. The default
 * implementation uses `ureq`, a blocking client with no async runtime; the
 * worker is already a dedicated thread, so blocking I/O is fine there.
 *
 * Exactly one POST per call. No retries and no backoff. A non-200 answer
 * counts as a failure.
 */
use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;

/// Sends one already-serialized JSON report.
pub trait Transport: Send + 'static {
    fn post(&self, endpoint: &str, body: &[u8]) -> Result<(), TransportError>;
}

/**
 * `ureq`-backed transport.
 *
 * Created once per client and moved into the worker thread, so the
 * agent's connection pool is reused across reports.
 */
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    /**
     * `timeout` bounds each request end to end. `None` waits as long as the
     * server takes, which can stall the worker on a hung connection.
     */
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn post(&self, endpoint: &str, body: &[u8]) -> Result<(), TransportError> {
        let response = self
            .agent
            .post(endpoint)
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(TransportError::Status(status));
        }
        Ok(())
    }
}
