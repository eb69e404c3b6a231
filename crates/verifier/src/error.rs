use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// The candidate cannot be compared at all. This is a configuration
    /// problem, not fraud.
    #[error("batch {batch_index}: {claimed} claimed roots but {independent} independent roots")]
    CandidateMismatch {
        batch_index: u64,
        claimed: usize,
        independent: usize,
    },
    #[error("expect state batch {expected}, got {actual}")]
    MissingBatch { expected: u64, actual: u64 },
}
