use std::sync::Arc;

use anyhow::{Context, Result};
use relay_config::VerifierConfig;
use relay_rpc_client::{StateBatchSource, StateRootProvider};
use relay_store::{traits::ChainStore, Store};
use tokio::sync::broadcast;

use crate::{compare::compare_roots, error::VerifierError, metrics::VERIFIER_METRICS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The next batch is not committed yet, or the replica has not reached
    /// its last height.
    Waiting,
    Verified { batch_index: u64 },
    Fraud {
        batch_index: u64,
        position: usize,
        height: u64,
    },
}

/// Checks state batches committed on L1, in batch order, against the roots
/// of an independent replica.
pub struct FraudDetector {
    store: Store,
    batches: Arc<dyn StateBatchSource>,
    replica: Arc<dyn StateRootProvider>,
    config: VerifierConfig,
    /// Last fraud reported, so a known mismatch is counted once.
    reported: Option<(u64, usize)>,
}

impl FraudDetector {
    pub fn new(
        store: Store,
        batches: Arc<dyn StateBatchSource>,
        replica: Arc<dyn StateRootProvider>,
        config: VerifierConfig,
    ) -> Self {
        FraudDetector {
            store,
            batches,
            replica,
            config,
            reported: None,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("fraud detector stopped");
                    return;
                }
                _ = interval.tick() => {}
            }
            // catch up as far as possible in one cycle
            loop {
                match self.check_next().await {
                    Ok(Verdict::Verified { .. }) => continue,
                    Ok(_) => break,
                    // the same batch would fail the same way next cycle
                    Err(err) if err.is::<VerifierError>() => {
                        log::error!("fraud detector halted: {:#}", err);
                        let _ = shutdown.recv().await;
                        log::info!("fraud detector stopped");
                        return;
                    }
                    Err(err) => {
                        log::warn!("fraud detector: {:#}", err);
                        break;
                    }
                }
            }
        }
    }

    /// Check the batch after the verifier cursor. The cursor advances only
    /// when every root matches.
    #[tracing::instrument(skip(self))]
    pub async fn check_next(&mut self) -> Result<Verdict> {
        let cursor = self.store.get_verifier_cursor()?;
        let batch_index = cursor.next_index(self.config.start_batch);
        let batch = match self.batches.get_state_batch(batch_index).await? {
            Some(batch) => batch,
            None => return Ok(Verdict::Waiting),
        };
        if batch.batch_index != batch_index {
            return Err(VerifierError::MissingBatch {
                expected: batch_index,
                actual: batch.batch_index,
            }
            .into());
        }

        if let Some(last) = batch.roots.len().checked_sub(1) {
            let replica_height = self.replica.latest_height().await?;
            if replica_height < batch.height_of(last) {
                log::debug!(
                    "replica at {} behind batch {} ending at {}",
                    replica_height,
                    batch_index,
                    batch.height_of(last)
                );
                return Ok(Verdict::Waiting);
            }
        }
        let mut independent = Vec::with_capacity(batch.roots.len());
        for position in 0..batch.roots.len() {
            let height = batch.height_of(position);
            let root = self
                .replica
                .state_root_at(height)
                .await?
                .with_context(|| format!("replica has no block {}", height))?;
            independent.push(root);
        }

        match compare_roots(batch_index, &batch.roots, &independent)? {
            Some(position) => {
                let height = batch.height_of(position);
                VERIFIER_METRICS.fraud_detected.set(1);
                if self.reported != Some((batch_index, position)) {
                    self.reported = Some((batch_index, position));
                    VERIFIER_METRICS.fraud_events.inc();
                    log::error!(
                        "state root mismatch in batch {} at position {} (L2 height {}): claimed {}, computed {}",
                        batch_index,
                        position,
                        height,
                        batch.roots[position],
                        independent[position]
                    );
                }
                Ok(Verdict::Fraud {
                    batch_index,
                    position,
                    height,
                })
            }
            None => {
                let mut cursor = cursor;
                cursor.advance(batch_index);
                let mut tx = self.store.begin_transaction();
                tx.set_verifier_cursor(&cursor)?;
                tx.commit()?;
                self.reported = None;
                VERIFIER_METRICS.fraud_detected.set(0);
                VERIFIER_METRICS.highest_checked_batch.set(batch_index);
                log::info!(
                    "batch {} verified ({} roots)",
                    batch_index,
                    batch.roots.len()
                );
                Ok(Verdict::Verified { batch_index })
            }
        }
    }
}
