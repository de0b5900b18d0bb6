/*!
 * Rollbar: asynchronous error reporting for Rust.
 *
 * This is the crate applications depend on. It re-exports the core API and
 * wires up addons (panic hook) through a single `init` call.
 *
 * # Quick start
 *
 * ```ignore
 * fn main() -> Result<(), rollbar::Error> {
 *     let _guard = rollbar::init("POST_SERVER_ITEM_TOKEN")?;
 *
 *     rollbar::report_message(rollbar::Level::Info, "application started");
 *
 *     if let Err(e) = std::fs::read("settings.toml") {
 *         rollbar::report_error(rollbar::Level::Error, rollbar::ReportedError::typed(&e));
 *     }
 *
 *     // panics are reported too (catch_panics defaults to true)
 *     Ok(())
 *     // _guard is dropped here and waits for the queue to drain
 * }
 * ```
 */

pub use rollbar_core::{
    capture_stack, report_error, report_error_with_request, report_error_with_request_and_skip,
    report_error_with_skip, report_error_with_stack, report_message, wait_until_drained,
    wait_until_drained_timeout, Client, DeliveryError, Error, Fields, Frame, Guard, Level, Report,
    ReportedError, RequestInfo, Stack, TransportError,
};
pub use rollbar_core::Options as CoreOptions;

/**
 * Configuration for the reporter.
 *
 * `From<&str>` turns a bare access token into `Options` with every other
 * field at its default:
 * - `catch_panics` = `true`
 * - everything in `core` as in `rollbar_core::Options::default()`
 */
#[derive(Clone, Debug)]
pub struct Options {
    /// Queue, endpoint, token and redaction settings.
    pub core: rollbar_core::Options,

    /// Whether to install a panic hook that reports panics.
    pub catch_panics: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            core: rollbar_core::Options::default(),
            catch_panics: true,
        }
    }
}

impl From<&str> for Options {
    fn from(access_token: &str) -> Self {
        Self {
            core: rollbar_core::Options {
                access_token: access_token.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl From<rollbar_core::Options> for Options {
    fn from(core: rollbar_core::Options) -> Self {
        Self {
            core,
            ..Default::default()
        }
    }
}

/**
 * Initializes the reporter and installs the configured addons.
 *
 * ```ignore
 * // Just a token (panics reported by default)
 * let _guard = rollbar::init("TOKEN")?;
 *
 * // Full control
 * let _guard = rollbar::init(rollbar::Options {
 *     core: rollbar::CoreOptions {
 *         access_token: "TOKEN".into(),
 *         environment: "production".into(),
 *         ..Default::default()
 *     },
 *     catch_panics: false,
 * })?;
 * ```
 *
 * # Errors
 * Invalid options, or `init` called more than once.
 */
pub fn init(options: impl Into<Options>) -> Result<Guard, Error> {
    let opts = options.into();

    let guard = rollbar_core::init(opts.core)?;

    if opts.catch_panics {
        rollbar_panic::install();
    }

    Ok(guard)
}
