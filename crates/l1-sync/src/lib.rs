//! Relays transactions enqueued on L1 to L2, in queue index order.
//!
//! [`L1Ingestor`] scans confirmed L1 blocks for enqueue events and adds them
//! to a persisted queue; [`EnqueueRelayer`] hands each one to the L2
//! sequencer. An item that cannot be relayed within the configured attempts
//! is fatal: skipping it would desynchronize the two chains.

mod ingestor;
mod metrics;
mod relayer;

pub use ingestor::{L1Ingestor, SyncError};
pub use relayer::{enqueue_queue, EnqueueRelayer, ENQUEUE_QUEUE};
