use serde::{Deserialize, Serialize};

use crate::RawTransaction;

/// Describes how many items at this position of a batch came from the
/// sequencer and from the L1 queue, and when.
///
/// The sequenced items come first and carry their raw transaction in the
/// batch; the queued items follow and are only counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchContext {
    pub num_sequenced: u64,
    pub num_queued: u64,
    pub timestamp: u64,
    pub block_number: u64,
}

impl BatchContext {
    pub fn num_items(&self) -> u64 {
        self.num_sequenced + self.num_queued
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub should_start_at_element: u64,
    pub total_elements_to_append: u64,
    pub contexts: Vec<BatchContext>,
    pub transactions: Vec<RawTransaction>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchValidationError {
    #[error("contexts declare {declared} sequenced transactions but batch carries {actual}")]
    SequencedCount { declared: u64, actual: u64 },
    #[error("contexts declare {declared} elements but batch appends {total}")]
    TotalCount { declared: u64, total: u64 },
}

impl Batch {
    /// Check that the contexts account for every carried transaction and
    /// every appended element.
    pub fn validate(&self) -> Result<(), BatchValidationError> {
        let sequenced: u64 = self.contexts.iter().map(|c| c.num_sequenced).sum();
        let actual = self.transactions.len() as u64;
        if sequenced != actual {
            return Err(BatchValidationError::SequencedCount {
                declared: sequenced,
                actual,
            });
        }
        let declared: u64 = self.contexts.iter().map(BatchContext::num_items).sum();
        if declared != self.total_elements_to_append {
            return Err(BatchValidationError::TotalCount {
                declared,
                total: self.total_elements_to_append,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(num_sequenced: u64, num_queued: u64) -> BatchContext {
        BatchContext {
            num_sequenced,
            num_queued,
            timestamp: 1,
            block_number: 1,
        }
    }

    #[test]
    fn test_validate() {
        let mut batch = Batch {
            should_start_at_element: 0,
            total_elements_to_append: 3,
            contexts: vec![context(1, 1), context(1, 0)],
            transactions: vec![vec![1].into(), vec![2].into()],
        };
        assert_eq!(batch.validate(), Ok(()));

        batch.total_elements_to_append = 2;
        assert_eq!(
            batch.validate(),
            Err(BatchValidationError::TotalCount {
                declared: 3,
                total: 2
            })
        );

        batch.transactions.pop();
        assert_eq!(
            batch.validate(),
            Err(BatchValidationError::SequencedCount {
                declared: 2,
                actual: 1
            })
        );
    }
}
