use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue {namespace}: cannot mark {index} processed, next expected is {expected}")]
    OutOfOrder {
        namespace: String,
        index: u64,
        expected: u64,
    },
    #[error("queue {namespace}: item {index} was never added")]
    MissingItem { namespace: String, index: u64 },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// A queue gave up on an item. Skipping it would break ordering, so the
/// process must stop.
#[derive(Error, Debug, Clone)]
#[error("queue {namespace}: item {index} failed {attempts} times, last error: {last_error}")]
pub struct FatalError {
    pub namespace: String,
    pub index: u64,
    pub attempts: u32,
    pub last_error: String,
}
