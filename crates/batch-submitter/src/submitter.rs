use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_codec::{builder::build_batch, encode, BatchType, CodecError};
use relay_config::{BatchSubmitterConfig, L1Config, QueueConfig};
use relay_queue::{FatalError, ItemHandler, QueueOptions, SequentialQueue};
use relay_rpc_client::{
    confirm::wait_for_confirmations,
    contract::append_sequencer_batch_calldata,
    error::{ConfirmationTimeout, TransactionReverted},
    L1Client,
};
use relay_store::{traits::ChainStore, Store};
use relay_types::{
    batch::BatchValidationError,
    submission::{BatchSubmission, SubmissionState, SubmissionStatus},
    H256,
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc::UnboundedSender, Notify};

use crate::metrics::SUBMITTER_METRICS;
use crate::state_machine::{transition, Action, Outcome};

pub const SUBMISSION_QUEUE: &str = "batch_submitter";

/// The head batch cannot be encoded. Submission stops at it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("batch {batch_number} rejected, submission halted")]
pub struct BatchRejected {
    pub batch_number: u64,
}

/// Accepts the batch at the head of the submission queue.
///
/// The handler only records the batch as `QUEUED` and wakes the submitter;
/// the queue slot is released once the batch is finalized.
pub struct SubmissionHandler {
    store: Store,
    notify: Arc<Notify>,
}

#[async_trait]
impl ItemHandler<BatchSubmission> for SubmissionHandler {
    async fn handle(
        &self,
        _queue: &SequentialQueue<BatchSubmission>,
        index: u64,
        _item: BatchSubmission,
    ) -> Result<()> {
        if self.store.get_submission_state(index)?.is_none() {
            let mut tx = self.store.begin_transaction();
            tx.set_submission_state(index, &SubmissionState::default())?;
            tx.commit()?;
        }
        self.notify.notify_one();
        Ok(())
    }
}

/// The submission queue and the notifier its handler signals.
pub fn submission_queue(
    store: &Store,
    config: &BatchSubmitterConfig,
    queue_config: &QueueConfig,
    fatal_tx: Option<UnboundedSender<FatalError>>,
) -> (SequentialQueue<BatchSubmission>, Arc<Notify>) {
    let notify = Arc::new(Notify::new());
    let handler = Arc::new(SubmissionHandler {
        store: store.clone(),
        notify: notify.clone(),
    });
    let options = QueueOptions::new(SUBMISSION_QUEUE, config.start_batch).with_retry(queue_config);
    let queue = SequentialQueue::new(options, store.clone(), handler, fatal_tx);
    (queue, notify)
}

/// Drives the batch at the head of the submission queue to `FINALIZED`.
pub struct BatchSubmitter {
    store: Store,
    queue: SequentialQueue<BatchSubmission>,
    notify: Arc<Notify>,
    l1: Arc<dyn L1Client>,
    l1_config: L1Config,
    config: BatchSubmitterConfig,
}

impl BatchSubmitter {
    pub fn new(
        store: Store,
        queue: SequentialQueue<BatchSubmission>,
        notify: Arc<Notify>,
        l1: Arc<dyn L1Client>,
        l1_config: L1Config,
        config: BatchSubmitterConfig,
    ) -> Self {
        BatchSubmitter {
            store,
            queue,
            notify,
            l1,
            l1_config,
            config,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("batch submitter stopped");
                    return;
                }
                _ = interval.tick() => {}
                _ = self.notify.notified() => {}
            }
            if let Err(err) = self.run_task().await {
                if err.is::<BatchRejected>() {
                    log::error!("batch submitter: {:#}", err);
                    let _ = shutdown.recv().await;
                    log::info!("batch submitter stopped");
                    return;
                }
                log::warn!("batch submitter: {:#}", err);
            }
        }
    }

    /// Advance the head batch as far as possible. Returns its status at the
    /// end of the cycle, or `None` when no batch is waiting.
    #[tracing::instrument(skip(self))]
    pub async fn run_task(&self) -> Result<Option<SubmissionStatus>> {
        let batch_number = self.queue.next_index()?;
        // absent until the queue delivered the batch
        let state = match self.store.get_submission_state(batch_number)? {
            Some(state) => state,
            None => return Ok(None),
        };
        let mut submission = self
            .queue
            .get(batch_number)?
            .with_context(|| format!("batch {} delivered but not stored", batch_number))?
            .item
            .with_state(state);

        loop {
            let outcome = match submission.status {
                SubmissionStatus::Queued => self.send(&mut submission).await,
                SubmissionStatus::Sent => self.confirm(&submission).await,
                SubmissionStatus::Finalized => Outcome::Success,
            };
            let t = transition(submission.status, outcome);
            if t.next != submission.status {
                submission.status = t.next;
                let mut tx = self.store.begin_transaction();
                tx.set_submission_state(batch_number, &submission.state())?;
                tx.commit()?;
                log::info!(
                    "batch {} is {}{}",
                    batch_number,
                    submission.status,
                    submission
                        .submission_tx_hash
                        .map(|h| format!(", tx {}", h))
                        .unwrap_or_default()
                );
            }
            match t.action {
                Action::Confirm => continue,
                Action::Retry => return Ok(Some(submission.status)),
                Action::Release => {
                    self.queue.mark_processed(batch_number).await?;
                    SUBMITTER_METRICS.last_finalized_batch.set(batch_number);
                    return Ok(Some(submission.status));
                }
                Action::Halt => return Err(BatchRejected { batch_number }.into()),
            }
        }
    }

    async fn send(&self, submission: &mut BatchSubmission) -> Outcome {
        match self.try_send(submission).await {
            Ok(Some(tx_hash)) => {
                submission.submission_tx_hash = Some(tx_hash);
                SUBMITTER_METRICS.batches_sent.inc();
                Outcome::Success
            }
            Ok(None) => Outcome::Pending,
            Err(err) if err.is::<CodecError>() || err.is::<BatchValidationError>() => {
                SUBMITTER_METRICS.send_failures.inc();
                self.queue.report_fatal(submission.batch_number, 1, &err);
                Outcome::Rejected
            }
            Err(err) => {
                SUBMITTER_METRICS.send_failures.inc();
                log::warn!("send batch {}: {:#}", submission.batch_number, err);
                Outcome::Failed
            }
        }
    }

    /// `None` when the gas price is above the ceiling.
    async fn try_send(&self, submission: &BatchSubmission) -> Result<Option<H256>> {
        let batch = build_batch(&submission.transactions);
        batch.validate()?;
        let batch_type = if self.config.compression {
            BatchType::Zlib
        } else {
            BatchType::Legacy
        };
        let encoded = encode(&batch, batch_type)?;

        let gas_price = self.l1.gas_price().await?;
        let ceiling = self.config.max_gas_price_wei();
        if gas_price > ceiling {
            log::info!(
                "gas price {} above ceiling {}, hold batch {}",
                gas_price,
                ceiling,
                submission.batch_number
            );
            return Ok(None);
        }

        let calldata = append_sequencer_batch_calldata(&encoded);
        let tx_hash = self
            .l1
            .send_transaction(self.l1_config.canonical_chain_address, calldata)
            .await?;
        Ok(Some(tx_hash))
    }

    async fn confirm(&self, submission: &BatchSubmission) -> Outcome {
        let tx_hash = match submission.submission_tx_hash {
            Some(tx_hash) => tx_hash,
            None => {
                log::error!("batch {} is SENT without a tx hash", submission.batch_number);
                return Outcome::Failed;
            }
        };
        let result = wait_for_confirmations(
            self.l1.as_ref(),
            tx_hash,
            self.l1_config.confirmations,
            self.l1_config.poll_tx_interval(),
            self.l1_config.confirmation_timeout(),
        )
        .await;
        match result {
            Ok(_) => {
                SUBMITTER_METRICS.batches_finalized.inc();
                Outcome::Success
            }
            Err(err) if err.is::<ConfirmationTimeout>() => {
                log::debug!("batch {}: {}", submission.batch_number, err);
                Outcome::Pending
            }
            Err(err) => {
                SUBMITTER_METRICS.confirm_failures.inc();
                if err.is::<TransactionReverted>() {
                    log::error!("batch {}: {}", submission.batch_number, err);
                } else {
                    log::warn!("confirm batch {}: {:#}", submission.batch_number, err);
                }
                Outcome::Failed
            }
        }
    }
}
