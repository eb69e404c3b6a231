//! Group ordered L2 transactions into batch contexts.

use relay_types::{
    batch::{Batch, BatchContext},
    chain::{L2Transaction, QueueOrigin},
};

/// Build a batch out of transactions ordered by their canonical index.
///
/// A context covers a run of sequencer transactions followed by a run of
/// L1 queue transactions that share one timestamp and L1 block number. Only
/// sequencer transactions carry their raw bytes in the batch.
pub fn build_batch(transactions: &[L2Transaction]) -> Batch {
    let mut contexts: Vec<BatchContext> = Vec::new();
    let mut raw = Vec::new();

    for tx in transactions {
        let sequenced = tx.queue_origin == QueueOrigin::Sequencer;
        let extend_last = match contexts.last() {
            Some(last) => {
                last.timestamp == tx.timestamp
                    && last.block_number == tx.l1_block_number
                    // a sequencer tx cannot follow queued ones in one context
                    && !(sequenced && last.num_queued > 0)
            }
            None => false,
        };
        if !extend_last {
            contexts.push(BatchContext {
                num_sequenced: 0,
                num_queued: 0,
                timestamp: tx.timestamp,
                block_number: tx.l1_block_number,
            });
        }
        if let Some(context) = contexts.last_mut() {
            if sequenced {
                context.num_sequenced += 1;
                raw.push(tx.raw.clone());
            } else {
                context.num_queued += 1;
            }
        }
    }

    Batch {
        should_start_at_element: transactions.first().map(|tx| tx.index).unwrap_or_default(),
        total_elements_to_append: transactions.len() as u64,
        contexts,
        transactions: raw,
    }
}
