use std::{cmp::min, sync::Arc};

use anyhow::Result;
use relay_config::L1SyncConfig;
use relay_queue::SequentialQueue;
use relay_rpc_client::{EnqueueSource, L1Client};
use relay_store::{traits::ChainStore, Store};
use relay_types::chain::EnqueuedTransaction;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::metrics::L1_SYNC_METRICS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("enqueue index gap in L1 blocks [{from_block}, {to_block}]: expected {expected}, found {found}")]
    QueueIndexGap {
        from_block: u64,
        to_block: u64,
        expected: u64,
        found: u64,
    },
}

/// Scans confirmed L1 blocks for enqueued transactions.
pub struct L1Ingestor {
    store: Store,
    l1: Arc<dyn L1Client>,
    source: Arc<dyn EnqueueSource>,
    queue: SequentialQueue<EnqueuedTransaction>,
    confirmations: u64,
    config: L1SyncConfig,
}

impl L1Ingestor {
    pub fn new(
        store: Store,
        l1: Arc<dyn L1Client>,
        source: Arc<dyn EnqueueSource>,
        queue: SequentialQueue<EnqueuedTransaction>,
        confirmations: u64,
        config: L1SyncConfig,
    ) -> Self {
        L1Ingestor {
            store,
            l1,
            source,
            queue,
            confirmations,
            config,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("l1 ingestor stopped");
                    return;
                }
                _ = interval.tick() => {}
            }
            if let Err(err) = self.scan().await {
                log::warn!("l1 ingestor: {:#}", err);
            }
        }
    }

    /// Scan the next range of confirmed blocks. Returns the number of new
    /// enqueued transactions.
    ///
    /// The cursor only moves when every index in the range follows the last
    /// one seen.
    #[tracing::instrument(skip(self))]
    pub async fn scan(&self) -> Result<usize> {
        let from_block = match self.store.get_l1_sync_last_scanned_block()? {
            Some(last) => last + 1,
            None => self.config.start_block,
        };
        let mut next_index = self
            .store
            .get_l1_sync_next_queue_index()?
            .unwrap_or(self.config.start_queue_index);

        let tip = self.l1.block_number().await?;
        // a block at `tip + 1 - confirmations` has enough confirmations
        let confirmed = match (tip + 1).checked_sub(self.confirmations) {
            Some(confirmed) => confirmed,
            None => return Ok(0),
        };
        if from_block > confirmed {
            return Ok(0);
        }
        let to_block = min(confirmed, from_block + self.config.logs_range - 1);

        let mut fresh = Vec::new();
        for tx in self.source.get_enqueued(from_block, to_block).await? {
            if tx.queue_index < next_index {
                log::debug!("skip known enqueued transaction {}", tx.queue_index);
                continue;
            }
            if tx.queue_index != next_index {
                return Err(SyncError::QueueIndexGap {
                    from_block,
                    to_block,
                    expected: next_index,
                    found: tx.queue_index,
                }
                .into());
            }
            next_index += 1;
            fresh.push(tx);
        }

        let count = fresh.len();
        for tx in fresh {
            self.queue.add(tx.queue_index, tx).await?;
        }
        let mut db_tx = self.store.begin_transaction();
        db_tx.set_l1_sync_cursor(to_block, next_index);
        db_tx.commit()?;

        L1_SYNC_METRICS.enqueued_seen.inc_by(count as u64);
        L1_SYNC_METRICS.last_scanned_block.set(to_block);
        if count > 0 {
            log::info!(
                "found {} enqueued transactions in L1 blocks [{}, {}]",
                count,
                from_block,
                to_block
            );
        }
        Ok(count)
    }
}
