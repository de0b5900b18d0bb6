/**
 * RAII guard returned by `rollbar_core::init()`.
 *
 * ```ignore
 * fn main() {
 *     let _guard = rollbar_core::init(options).unwrap();
 *
 *     // ... application logic, reports are queued here ...
 *
 * }   // <-- _guard is dropped here, waiting for the queue to drain
 * ```
 *
 * The wait is bounded by `Options::drain_timeout`. Reports still queued
 * after that are lost when the process exits.
 */
use crate::client;

/**
 * Drain-on-drop guard.
 *
 * Does not own the `Client`; the client lives in a `static OnceLock` and
 * outlives the guard.
 */
pub struct Guard {
    _private: (),
}

impl Guard {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if let Some(client) = client::get_client() {
            if !client.wait_until_drained_timeout(client.drain_timeout()) {
                tracing::warn!(
                    target: "rollbar",
                    pending = client.pending(),
                    "drain timed out, some reports may not have been sent"
                );
            }
        }
    }
}
