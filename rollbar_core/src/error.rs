/*!
 * Error types.
 *
 * Only construction and initialization surface errors to the caller.
 * Delivery failures are reported by the worker through `tracing` and
 * never propagate back to the code that produced the report.
 */

/// Errors returned while configuring or initializing the reporter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sensitive-field pattern is not a valid regular expression.
    #[error("invalid filter_fields pattern: {0}")]
    InvalidFilterPattern(#[from] regex::Error),

    /// A zero-capacity queue could never accept a report.
    #[error("queue_capacity must be at least 1")]
    ZeroCapacity,

    #[error("Rollbar reporter is already initialized")]
    AlreadyInitialized,

    #[error("failed to spawn delivery worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("unknown severity level: {0}")]
    UnknownLevel(String),
}

/// Why a single report was not delivered. Terminal for that report.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("empty access token")]
    MissingAccessToken,

    #[error("failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure of a single POST attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint answered with anything other than HTTP 200.
    #[error("service returned status: {0}")]
    Status(u16),

    #[error("POST failed: {0}")]
    Request(String),
}
