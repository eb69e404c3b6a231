//! Persisted sequential queue.
//!
//! Items are handed to an [`ItemHandler`] one at a time in index order. The
//! item at index `i` is delivered only after `i - 1` was marked processed,
//! and the processed cursor lives in the store, so a restarted process
//! resumes exactly where the previous one stopped.

mod error;
mod metrics;
mod queue;

pub use error::{FatalError, QueueError};
pub use queue::{ItemHandler, QueueCloser, QueueOptions, SequentialQueue};
