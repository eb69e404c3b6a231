//! Ships L2 transactions to L1 in batches.
//!
//! [`BatchProducer`] cuts batches out of L2 blocks and adds them to the
//! submission queue. [`BatchSubmitter`] drives the batch at the head of the
//! queue through `QUEUED -> SENT -> FINALIZED`, see [`state_machine`].

mod metrics;
pub mod producer;
pub mod state_machine;
pub mod submitter;

pub use producer::BatchProducer;
pub use submitter::{
    submission_queue, BatchRejected, BatchSubmitter, SubmissionHandler, SUBMISSION_QUEUE,
};
