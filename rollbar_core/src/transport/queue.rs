/**
 * Bounded delivery queue: the producer side of the worker channel.
 *
 * `enqueue` never blocks: a report is either accepted immediately or
 * rejected immediately when the queue already holds `capacity` reports.
 * Rejected reports are lost; they are never counted by the drain barrier.
 */
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use super::http::Transport;
use super::worker::{DrainBarrier, Worker};
use crate::error::Error;
use crate::protocol::types::Report;

pub struct DeliveryQueue {
    sender: Sender<Report>,
    barrier: Arc<DrainBarrier>,
    capacity: usize,
}

impl DeliveryQueue {
    /**
     * Creates the channel and starts the single worker that drains it.
     *
     * # Errors
     * `ZeroCapacity` for a zero capacity, `WorkerSpawn` if the thread could
     * not be started.
     */
    pub fn start<T: Transport>(capacity: usize, endpoint: String, transport: T) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let barrier = Arc::new(DrainBarrier::new());
        Worker::spawn(receiver, endpoint, transport, barrier.clone())?;

        Ok(Self {
            sender,
            barrier,
            capacity,
        })
    }

    /**
     * Hands `report` to the worker without waiting for space.
     *
     * Returns `false` when the report was dropped because the queue is full
     * (or the worker is gone); a diagnostic is logged in that case.
     */
    pub fn enqueue(&self, report: Report) -> bool {
        match self.barrier.admit(|| self.sender.try_send(report)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(target: "rollbar", capacity = self.capacity, "buffer full, dropping report");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!(target: "rollbar", "delivery worker has shut down, dropping report");
                false
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reports accepted and not yet attempted.
    pub fn pending(&self) -> usize {
        self.barrier.pending()
    }

    pub fn wait_until_drained(&self) {
        self.barrier.wait();
    }

    /// Returns `true` if the queue drained before `timeout` elapsed.
    pub fn wait_until_drained_timeout(&self, timeout: Duration) -> bool {
        self.barrier.wait_timeout(timeout)
    }
}
