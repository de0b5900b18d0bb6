/*!
 * Rollbar Panic Hook: automatic panic reporting.
 *
 * `install()` registers a `std::panic::set_hook` handler that, on panic:
 *
 * 1. Extracts the panic message.
 * 2. Captures the stack and trims the panic machinery above the code that
 *    panicked.
 * 3. Enqueues a `critical` error report with class `panic` via
 *    `rollbar_core::report_error_with_stack()`.
 * 4. Calls the previous panic hook, so the default stderr output is kept.
 *
 * # Recursion safety
 *
 * A `thread_local` flag stops re-entry if reporting itself panics. Panics
 * on the delivery worker thread are never reported: the report would go
 * out through the transport that just panicked, queueing a new panic for
 * every one delivered.
 */

use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};

use rollbar_core::{Frame, Level, ReportedError, Stack};

/// Keeps `install()` idempotent so hooks never stack up.
static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// Frame that ends the panic runtime's own part of the stack.
const SHORT_BACKTRACE_END: &str = "__rust_end_short_backtrace";

/// Frames directly below the marker that still belong to the panic runtime.
const PANIC_MACHINERY: &[&str] = &["rust_begin_unwind", "core::panicking::", "std::panicking::"];

/**
 * Installs the panic hook. Idempotent.
 *
 * Call after `rollbar_core::init()`; before it, panics are only passed on
 * to the previous hook.
 */
pub fn install() {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let is_recursive = IN_HOOK.with(|flag| flag.replace(true));

        if !is_recursive {
            if should_report() {
                let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                    handle_panic(info);
                }));
            }

            IN_HOOK.with(|flag| flag.set(false));
        }

        previous_hook(info);
    }));
}

fn should_report() -> bool {
    !rollbar_core::is_worker_thread()
}

fn handle_panic(info: &PanicHookInfo) {
    let message = panic_message(info);
    let stack = trim_panic_machinery(rollbar_core::capture_stack(0));

    if !rollbar_core::report_error_with_stack(Level::Critical, ReportedError::panic(message), stack) {
        tracing::debug!(target: "rollbar", "panic was not queued for reporting");
    }
}

fn panic_message(info: &PanicHookInfo) -> String {
    match info.payload().downcast_ref::<&str>() {
        Some(s) => (*s).to_string(),
        None => match info.payload().downcast_ref::<String>() {
            Some(s) => s.clone(),
            None => "<unknown panic>".to_string(),
        },
    }
}

/**
 * Drops the hook and panic-runtime frames so the stack starts at the code
 * that panicked. Returns the stack untouched when the runtime marker is
 * missing (e.g. stripped symbols).
 */
fn trim_panic_machinery(stack: Stack) -> Stack {
    let Some(end) = stack.iter().position(|f| f.method.contains(SHORT_BACKTRACE_END)) else {
        return stack;
    };

    stack
        .into_iter()
        .skip(end + 1)
        .skip_while(is_panic_machinery)
        .collect()
}

fn is_panic_machinery(frame: &Frame) -> bool {
    PANIC_MACHINERY
        .iter()
        .any(|prefix| frame.method.starts_with(prefix))
}
