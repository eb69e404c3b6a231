use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use relay_codec::builder::build_batch;
use relay_config::BatchSubmitterConfig;
use relay_queue::SequentialQueue;
use relay_rpc_client::L2Client;
use relay_store::{traits::ChainStore, Store};
use relay_types::{chain::BlockTag, submission::BatchSubmission};
use tokio::sync::broadcast;

use crate::metrics::SUBMITTER_METRICS;

/// Cuts batches out of L2 blocks.
///
/// A batch is cut once it holds `max_batch_size` transactions, or at least
/// `min_batch_size` transactions the oldest of which is older than
/// `max_batch_age_secs`. Blocks are never split.
pub struct BatchProducer {
    store: Store,
    l2: Arc<dyn L2Client>,
    queue: SequentialQueue<BatchSubmission>,
    config: BatchSubmitterConfig,
}

impl BatchProducer {
    pub fn new(
        store: Store,
        l2: Arc<dyn L2Client>,
        queue: SequentialQueue<BatchSubmission>,
        config: BatchSubmitterConfig,
    ) -> Self {
        BatchProducer {
            store,
            l2,
            queue,
            config,
        }
    }

    /// Next L2 block to batch and next batch number.
    pub fn cursor(&self) -> Result<(u64, u64)> {
        let next_block = self
            .store
            .get_producer_next_block()?
            .unwrap_or(self.config.start_block);
        let next_batch = self
            .store
            .get_producer_next_batch()?
            .unwrap_or(self.config.start_batch);
        Ok((next_block, next_batch))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("batch producer stopped");
                    return;
                }
                _ = interval.tick() => {}
            }
            let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
                Ok(d) => d.as_secs(),
                Err(err) => {
                    log::error!("system clock before unix epoch: {}", err);
                    continue;
                }
            };
            if let Err(err) = self.produce(now).await {
                log::warn!("batch producer: {:#}", err);
            }
        }
    }

    /// Cut at most one batch, judging its age against `now` (unix seconds).
    /// Returns the number of the batch added to the queue.
    #[tracing::instrument(skip(self))]
    pub async fn produce(&self, now: u64) -> Result<Option<u64>> {
        let (next_block, next_batch) = self.cursor()?;
        let tip = self.l2.block_number().await?;
        if next_block > tip {
            return Ok(None);
        }

        let max = self.config.max_batch_size as usize;
        let mut transactions = Vec::new();
        let mut end_block = next_block;
        let mut full = false;
        while end_block <= tip {
            let block = self
                .l2
                .get_block(BlockTag::Number(end_block))
                .await?
                .with_context(|| format!("L2 block {} not found", end_block))?;
            if !transactions.is_empty() && transactions.len() + block.transactions.len() > max {
                full = true;
                break;
            }
            transactions.extend(block.transactions);
            end_block += 1;
            if transactions.len() >= max {
                full = true;
                break;
            }
        }

        let oldest = match transactions.first() {
            Some(tx) => tx.timestamp,
            None => {
                // only empty blocks, skip them
                let mut tx = self.store.begin_transaction();
                tx.set_producer_cursor(end_block, next_batch);
                tx.commit()?;
                return Ok(None);
            }
        };
        let aged = now.saturating_sub(oldest) >= self.config.max_batch_age_secs;
        if !full && !(transactions.len() as u64 >= self.config.min_batch_size && aged) {
            log::debug!(
                "{} pending transactions, wait for more",
                transactions.len()
            );
            return Ok(None);
        }

        build_batch(&transactions)
            .validate()
            .with_context(|| format!("build batch {}", next_batch))?;
        let count = transactions.len();
        self.queue
            .add(next_batch, BatchSubmission::new(next_batch, transactions))
            .await?;
        let mut tx = self.store.begin_transaction();
        tx.set_producer_cursor(end_block, next_batch + 1);
        tx.commit()?;

        SUBMITTER_METRICS.batches_created.inc();
        log::info!(
            "batch {} created from L2 blocks [{}, {}), {} transactions",
            next_batch,
            next_block,
            end_block,
            count
        );
        Ok(Some(next_batch))
    }
}
