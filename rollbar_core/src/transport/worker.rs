/**
 * Background worker that drains the delivery queue and POSTs each report.
 *
 * ```text
 *  ┌──────────────┐     bounded channel     ┌─────────────────┐
 *  │  Caller code │ ──────── Report ──────► │  Worker thread  │
 *  │ (any thread) │                         │    (single)     │
 *  └──────────────┘                         └────────┬────────┘
 *                                                    │
 *                                          Transport::post()
 *                                                    │
 *                                            ┌───────▼───────┐
 *                                            │  Rollbar API  │
 *                                            └───────────────┘
 * ```
 *
 * One delivery attempt is in flight at a time, in FIFO order. Every attempt,
 * successful or not, is followed by exactly one `DrainBarrier::complete`.
 * The loop ends only when every sender is gone; a process-wide client never
 * drops its sender, so its worker lives as long as the process.
 */
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;

use super::http::Transport;
use crate::error::{DeliveryError, Error};
use crate::protocol::types::Report;

// ---------------------------------------------------------------------------
// DrainBarrier: pending-report counter callers can wait on
// ---------------------------------------------------------------------------

/**
 * Counts reports accepted into the queue and not yet attempted.
 *
 * Uses a `Mutex<usize>` + `Condvar` pair:
 * - `admit` increments while the report is being handed to the channel.
 * - The worker calls `complete` after each attempt and wakes waiters when
 *   the count reaches zero.
 * - `wait` / `wait_timeout` block until the count is zero.
 *
 * Waiting is not a snapshot: reports admitted during the wait are waited
 * for as well.
 */
pub struct DrainBarrier {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl DrainBarrier {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    /**
     * Runs `hand_off` under the counter lock and counts it if it succeeds.
     *
     * The worker needs the same lock to `complete`, so it can never
     * decrement for a report before that report was counted. A failed
     * hand-off leaves the count untouched.
     */
    pub fn admit<E>(&self, hand_off: impl FnOnce() -> Result<(), E>) -> Result<(), E> {
        let mut pending = self.lock();
        hand_off()?;
        *pending += 1;
        Ok(())
    }

    pub fn complete(&self) {
        let mut pending = self.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    pub fn pending(&self) -> usize {
        *self.lock()
    }

    /// Blocks until no report is pending.
    pub fn wait(&self) {
        let guard = self.lock();
        let _guard = self
            .drained
            .wait_while(guard, |pending| *pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /**
     * Blocks until no report is pending or `timeout` elapses.
     *
     * Returns `true` if the queue drained in time.
     */
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (_guard, result) = self
            .drained
            .wait_timeout_while(guard, timeout, |pending| *pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
        !result.timed_out()
    }

    /*
     * The counter stays meaningful even if a holder panicked; recover the
     * guard instead of propagating poison.
     */
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DrainBarrier {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Delivery of a single report
// ---------------------------------------------------------------------------

/**
 * Makes the one and only delivery attempt for `report`.
 *
 * Reports without an access token are discarded before anything is sent.
 */
pub fn deliver<T>(transport: &T, endpoint: &str, report: &Report) -> Result<(), DeliveryError>
where
    T: Transport + ?Sized,
{
    if report.access_token.is_empty() {
        return Err(DeliveryError::MissingAccessToken);
    }

    let body = serde_json::to_vec(report)?;
    transport.post(endpoint, &body)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Worker: the background thread
// ---------------------------------------------------------------------------

thread_local! {
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

/**
 * Whether the current thread is a delivery worker.
 *
 * Reports made from here would be delivered through the same transport
 * that is currently failing, so the panic hook stays quiet on this thread.
 */
pub fn is_worker_thread() -> bool {
    ON_WORKER.with(Cell::get)
}

pub struct Worker;

impl Worker {
    /**
     * Spawns the worker thread. No join handle is kept; the thread is
     * never stopped explicitly.
     */
    pub fn spawn<T: Transport>(
        receiver: Receiver<Report>,
        endpoint: String,
        transport: T,
        barrier: Arc<DrainBarrier>,
    ) -> Result<(), Error> {
        thread::Builder::new()
            .name("rollbar-worker".into())
            .spawn(move || Self::run_loop(&receiver, &endpoint, &transport, &barrier))
            .map(|_| ())
            .map_err(Error::WorkerSpawn)
    }

    fn run_loop<T: Transport>(receiver: &Receiver<Report>, endpoint: &str, transport: &T, barrier: &DrainBarrier) {
        ON_WORKER.with(|flag| flag.set(true));

        while let Ok(report) = receiver.recv() {
            /*
             * A panic inside the transport must not kill the thread or leave
             * the barrier counting a report that will never complete.
             */
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| deliver(transport, endpoint, &report)));

            match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(target: "rollbar", title = %report.data.title, "report delivered");
                }
                Ok(Err(err)) => {
                    tracing::warn!(target: "rollbar", error = %err, title = %report.data.title, "dropping report");
                }
                Err(_) => {
                    tracing::error!(target: "rollbar", title = %report.data.title, "transport panicked, dropping report");
                }
            }

            barrier.complete();
        }
    }
}
