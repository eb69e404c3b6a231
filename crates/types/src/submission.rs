use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{chain::L2Transaction, H256};

/// Submission progress of a batch. Variants are ordered: a batch only moves
/// to a greater status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Queued,
    Sent,
    Finalized,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Queued
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Queued => "QUEUED",
            SubmissionStatus::Sent => "SENT",
            SubmissionStatus::Finalized => "FINALIZED",
        };
        f.write_str(s)
    }
}

/// Mutable part of a submission, persisted apart from the queued payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionState {
    pub status: SubmissionStatus,
    pub submission_tx_hash: Option<H256>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSubmission {
    pub batch_number: u64,
    pub transactions: Vec<L2Transaction>,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submission_tx_hash: Option<H256>,
}

impl BatchSubmission {
    pub fn new(batch_number: u64, transactions: Vec<L2Transaction>) -> Self {
        BatchSubmission {
            batch_number,
            transactions,
            status: SubmissionStatus::Queued,
            submission_tx_hash: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        SubmissionState {
            status: self.status,
            submission_tx_hash: self.submission_tx_hash,
        }
    }

    pub fn with_state(self, state: SubmissionState) -> Self {
        BatchSubmission {
            status: state.status,
            submission_tx_hash: state.submission_tx_hash,
            ..self
        }
    }
}
