/**
 * The reporter client: owns the report builder and the delivery queue.
 *
 * Lifecycle:
 * 1. `rollbar_core::init(options)` creates a `Client` and stores it in a
 *    global `OnceLock`; the worker thread starts right away.
 * 2. `rollbar_core::report_*` read the global `Client`, build a report and
 *    enqueue it without blocking.
 * 3. `init` returns a `Guard`; dropping it waits (bounded) for the queue to
 *    drain before the process exits.
 *
 * A `Client` can also be created with `Client::new` and used directly,
 * without touching the global.
 */
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::Error;
use crate::protocol::constants::{
    DEFAULT_ENDPOINT, DEFAULT_ENVIRONMENT, DEFAULT_FILTER_FIELDS, DEFAULT_QUEUE_CAPACITY,
};
use crate::protocol::types::{Level, Report, Stack};
use crate::report::{Redactor, ReportBuilder, ReportedError, RequestInfo};
use crate::transport::{DeliveryQueue, HttpTransport, Transport};

// ---------------------------------------------------------------------------
// Global singleton
// ---------------------------------------------------------------------------

/**
 * Process-wide client, written once by `init` before any report is made.
 * All free functions read it through `get_client()`.
 */
static GLOBAL_CLIENT: OnceLock<Client> = OnceLock::new();

/// The global client, or `None` before `init()`.
pub fn get_client() -> Option<&'static Client> {
    GLOBAL_CLIENT.get()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/**
 * Reporter configuration. All fields have defaults via `Default`.
 *
 * # Example
 * ```ignore
 * let _guard = rollbar_core::init(rollbar_core::Options {
 *     access_token: "POST_SERVER_ITEM_TOKEN".into(),
 *     environment: "production".into(),
 *     ..Default::default()
 * })?;
 * ```
 */
#[derive(Clone, Debug)]
pub struct Options {
    /// Project access token. When empty, reports are built and queued but
    /// discarded by the worker.
    pub access_token: String,

    /// Environment every report is filed under.
    /// Default: `"development"`.
    pub environment: String,

    /// Item endpoint reports are POSTed to.
    pub endpoint: String,

    /// Reports held in the queue before new ones are dropped. Must be > 0.
    /// Default: `1000`.
    pub queue_capacity: usize,

    /// Regular expression for sensitive field names, matched
    /// case-insensitively against query and form parameter names.
    /// Default: `"password|secret|token"`.
    pub filter_fields: String,

    /// Upper bound for each POST. Default: `None`, no timeout.
    pub request_timeout: Option<Duration>,

    /// How long the `Guard` waits for the queue to drain on drop.
    /// Default: 2 seconds.
    pub drain_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            filter_fields: DEFAULT_FILTER_FIELDS.to_string(),
            request_timeout: None,
            drain_timeout: Duration::from_secs(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct Client {
    builder: ReportBuilder,
    queue: DeliveryQueue,
    drain_timeout: Duration,
}

impl Client {
    /// Creates a client delivering over HTTP.
    pub fn new(options: Options) -> Result<Self, Error> {
        let transport = HttpTransport::new(options.request_timeout);
        Self::with_transport(options, transport)
    }

    /**
     * Creates a client delivering through `transport`.
     *
     * # Errors
     * `InvalidFilterPattern`, `ZeroCapacity` or `WorkerSpawn`. Nothing is
     * started when the options are invalid.
     */
    pub fn with_transport<T: Transport>(options: Options, transport: T) -> Result<Self, Error> {
        let redactor = Redactor::new(&options.filter_fields)?;
        let builder = ReportBuilder::new(options.access_token, options.environment, redactor);
        let queue = DeliveryQueue::start(options.queue_capacity, options.endpoint, transport)?;

        Ok(Self {
            builder,
            queue,
            drain_timeout: options.drain_timeout,
        })
    }

    /**
     * Creates the global client. Only the first successful call wins;
     * later calls return `AlreadyInitialized`.
     */
    pub fn init(options: Options) -> Result<(), Error> {
        /*
         * Early guard: avoid spawning a worker if already initialized.
         */
        if GLOBAL_CLIENT.get().is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let client = Self::new(options)?;
        GLOBAL_CLIENT.set(client).map_err(|_| Error::AlreadyInitialized)
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    /// Reports an error with a stack starting at the caller.
    pub fn report_error(&self, level: Level, error: impl Into<ReportedError>) -> bool {
        self.report_error_with_skip(level, error, 0)
    }

    /**
     * Reports an error, dropping `skip` extra frames above the caller from
     * the captured stack. Useful when reporting from inside a helper.
     */
    pub fn report_error_with_skip(&self, level: Level, error: impl Into<ReportedError>, skip: usize) -> bool {
        let report = self.builder.error_report(level, &error.into(), skip);
        self.enqueue(report)
    }

    pub fn report_error_with_request(
        &self,
        level: Level,
        error: impl Into<ReportedError>,
        request: &RequestInfo,
    ) -> bool {
        self.report_error_with_request_and_skip(level, error, request, 0)
    }

    pub fn report_error_with_request_and_skip(
        &self,
        level: Level,
        error: impl Into<ReportedError>,
        request: &RequestInfo,
        skip: usize,
    ) -> bool {
        let report = self.builder.request_error_report(level, &error.into(), skip, request);
        self.enqueue(report)
    }

    /// Reports an error around a stack the caller already captured.
    pub fn report_error_with_stack(&self, level: Level, error: impl Into<ReportedError>, stack: Stack) -> bool {
        let report = self.builder.error_report_with_stack(level, &error.into(), stack, None);
        self.enqueue(report)
    }

    pub fn report_message(&self, level: Level, message: &str) -> bool {
        let report = self.builder.message_report(level, message);
        self.enqueue(report)
    }

    /**
     * Enqueues a finished report. Never blocks; `false` means the queue
     * was full and the report was dropped.
     */
    pub fn enqueue(&self, report: Report) -> bool {
        self.queue.enqueue(report)
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Blocks until every accepted report has had its delivery attempt.
    pub fn wait_until_drained(&self) {
        self.queue.wait_until_drained();
    }

    pub fn wait_until_drained_timeout(&self, timeout: Duration) -> bool {
        self.queue.wait_until_drained_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = Client::new(Options {
            queue_capacity: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::ZeroCapacity)));
    }

    #[test]
    fn test_invalid_filter_pattern_is_rejected() {
        let result = Client::new(Options {
            filter_fields: "[".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidFilterPattern(_))));
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.environment, "development");
        assert_eq!(options.endpoint, "https://api.rollbar.com/api/1/item/");
        assert_eq!(options.queue_capacity, 1000);
        assert_eq!(options.filter_fields, "password|secret|token");
        assert!(options.request_timeout.is_none());
    }
}
