use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_config::{L1SyncConfig, QueueConfig};
use relay_queue::{FatalError, ItemHandler, QueueOptions, SequentialQueue};
use relay_rpc_client::L2Client;
use relay_store::Store;
use relay_types::chain::EnqueuedTransaction;
use tokio::sync::mpsc::UnboundedSender;

use crate::metrics::L1_SYNC_METRICS;

pub const ENQUEUE_QUEUE: &str = "l1_sync";

/// Hands enqueued transactions to the L2 sequencer.
pub struct EnqueueRelayer {
    l2: Arc<dyn L2Client>,
}

impl EnqueueRelayer {
    pub fn new(l2: Arc<dyn L2Client>) -> Self {
        EnqueueRelayer { l2 }
    }
}

#[async_trait]
impl ItemHandler<EnqueuedTransaction> for EnqueueRelayer {
    async fn handle(
        &self,
        queue: &SequentialQueue<EnqueuedTransaction>,
        index: u64,
        item: EnqueuedTransaction,
    ) -> Result<()> {
        self.l2
            .submit_enqueued(&item)
            .await
            .with_context(|| format!("relay enqueued transaction {}", index))?;
        L1_SYNC_METRICS.relayed.inc();
        // The transaction is on L2 now. Failing here would relay it again.
        if let Err(err) = queue.mark_processed_retrying(index).await {
            log::error!(
                "relayed enqueued transaction {} but could not mark it processed: {:#}",
                index,
                err
            );
            return Ok(());
        }
        log::info!(
            "relayed enqueued transaction {} from L1 block {}",
            index,
            item.l1_block_number
        );
        Ok(())
    }
}

/// The relay queue. It gives up after `max_relay_attempts` failures of one
/// item and reports a [`FatalError`] on `fatal_tx`.
pub fn enqueue_queue(
    store: &Store,
    l2: Arc<dyn L2Client>,
    config: &L1SyncConfig,
    queue_config: &QueueConfig,
    fatal_tx: UnboundedSender<FatalError>,
) -> SequentialQueue<EnqueuedTransaction> {
    let options = QueueOptions::new(ENQUEUE_QUEUE, config.start_queue_index)
        .with_retry(queue_config)
        .with_max_attempts(config.max_relay_attempts);
    SequentialQueue::new(
        options,
        store.clone(),
        Arc::new(EnqueueRelayer::new(l2)),
        Some(fatal_tx),
    )
}
