/*!
 * Rollbar Core: the reporting engine.
 *
 * This crate builds reports (stack, fingerprint, redacted request data) and
 * delivers them from a bounded queue on a single background thread. End
 * users should depend on the `rollbar` facade crate instead, which
 * re-exports everything and wires up addons (panic hook).
 *
 * # Module structure
 *
 * - `protocol/`: what we send: report model, constants
 * - `report/`: how a report is built: stack walker, fingerprint, redactor
 * - `transport/`: how we deliver: queue, worker, drain barrier, HTTP
 * - `client`: lifecycle: init, global state, report routing
 * - `guard`: RAII drain-on-drop
 */

mod client;
mod error;
mod guard;
pub mod protocol;
pub mod report;
pub mod transport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use client::{get_client, Client, Options};
pub use error::{DeliveryError, Error, TransportError};
pub use guard::Guard;
pub use protocol::constants::{NOTIFIER_NAME, NOTIFIER_VERSION};
pub use protocol::types::{Fields, Frame, Level, Report, Stack};
pub use report::stack::capture_stack;
pub use report::{ReportedError, RequestInfo};
pub use transport::is_worker_thread;

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/**
 * Initializes the process-wide reporter and starts its worker.
 *
 * Returns `Ok(Guard)`; keep the guard alive for the duration of the app.
 * Returns `Err` if the options are invalid or `init` was already called.
 */
pub fn init(options: Options) -> Result<Guard, Error> {
    Client::init(options)?;
    Ok(Guard::new())
}

/**
 * Reports an error. The stack starts at the function calling
 * `report_error`.
 *
 * Returns `false` if the report was dropped because the queue is full, and
 * also before `init()`, when this is a silent no-op.
 */
pub fn report_error(level: Level, error: impl Into<ReportedError>) -> bool {
    match get_client() {
        Some(client) => client.report_error_with_skip(level, error, 0),
        None => false,
    }
}

/// Reports an error, dropping `skip` extra frames above the caller.
pub fn report_error_with_skip(level: Level, error: impl Into<ReportedError>, skip: usize) -> bool {
    match get_client() {
        Some(client) => client.report_error_with_skip(level, error, skip),
        None => false,
    }
}

/// Reports an error together with the HTTP request being served.
pub fn report_error_with_request(level: Level, error: impl Into<ReportedError>, request: &RequestInfo) -> bool {
    match get_client() {
        Some(client) => client.report_error_with_request_and_skip(level, error, request, 0),
        None => false,
    }
}

pub fn report_error_with_request_and_skip(
    level: Level,
    error: impl Into<ReportedError>,
    request: &RequestInfo,
    skip: usize,
) -> bool {
    match get_client() {
        Some(client) => client.report_error_with_request_and_skip(level, error, request, skip),
        None => false,
    }
}

/**
 * Reports an error around an already captured stack.
 *
 * Low-level API used by addons (e.g. `rollbar_panic`) that trim the stack
 * themselves.
 */
pub fn report_error_with_stack(level: Level, error: impl Into<ReportedError>, stack: Stack) -> bool {
    match get_client() {
        Some(client) => client.report_error_with_stack(level, error, stack),
        None => false,
    }
}

/// Reports a plain message. The title is its first line.
pub fn report_message(level: Level, message: &str) -> bool {
    match get_client() {
        Some(client) => client.report_message(level, message),
        None => false,
    }
}

/**
 * Blocks until every accepted report has had its delivery attempt.
 *
 * No bound on the wait; see `wait_until_drained_timeout`. Returns
 * immediately before `init()`.
 */
pub fn wait_until_drained() {
    if let Some(client) = get_client() {
        client.wait_until_drained();
    }
}

/// Returns `true` if the queue drained within `timeout`.
pub fn wait_until_drained_timeout(timeout: std::time::Duration) -> bool {
    match get_client() {
        Some(client) => client.wait_until_drained_timeout(timeout),
        None => true,
    }
}
