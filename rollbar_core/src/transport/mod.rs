/**
 * Transport layer: queueing and delivery.
 *
 * Everything related to *how* reports reach the Rollbar API:
 * - `queue`: bounded, non-blocking producer side
 * - `worker`: background thread, drain barrier, single-attempt delivery
 * - `http`: the `Transport` seam and its `ureq` implementation
 */

pub mod http;
pub mod queue;
pub mod worker;

pub use http::{HttpTransport, Transport};
pub use queue::DeliveryQueue;
pub use worker::{deliver, is_worker_thread, DrainBarrier, Worker};
