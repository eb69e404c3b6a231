use std::{future::Future, marker::PhantomData, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_config::QueueConfig;
use relay_store::{traits::ChainStore, Store};
use relay_types::queue::{ProcessingRecord, QueueItem};
use relay_utils::ExponentialBackoff;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    sync::{mpsc::UnboundedSender, Mutex},
    time::sleep,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::error::{FatalError, QueueError};
use crate::metrics::QUEUE_METRICS;

/// Processes one queue item.
///
/// Returning `Ok` hands the item over: the queue will not deliver it again in
/// this process. The handler, or whoever it hands the item to, must call
/// [`SequentialQueue::mark_processed`] to release the next index. Returning
/// `Err` makes the queue retry the same item after a backoff.
#[async_trait]
pub trait ItemHandler<T>: Send + Sync + 'static {
    async fn handle(&self, queue: &SequentialQueue<T>, index: u64, item: T) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct QueueOptions {
    /// Separates queues sharing one store.
    pub namespace: String,
    /// Index delivered first when nothing was processed yet.
    pub start_index: u64,
    pub retry_base: Duration,
    pub retry_max: Duration,
    /// `None` retries forever. Otherwise the queue reports a [`FatalError`]
    /// after this many failed deliveries of one item.
    pub max_attempts: Option<u32>,
}

impl QueueOptions {
    pub fn new(namespace: impl Into<String>, start_index: u64) -> Self {
        let config = QueueConfig::default();
        QueueOptions {
            namespace: namespace.into(),
            start_index,
            retry_base: config.retry_base(),
            retry_max: config.retry_max(),
            max_attempts: None,
        }
    }

    pub fn with_retry(self, config: &QueueConfig) -> Self {
        QueueOptions {
            retry_base: config.retry_base(),
            retry_max: config.retry_max(),
            ..self
        }
    }

    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        QueueOptions {
            max_attempts: Some(max_attempts),
            ..self
        }
    }
}

struct Inner<T> {
    options: QueueOptions,
    store: Store,
    handler: Arc<dyn ItemHandler<T>>,
    /// Held while an item is being delivered. The value is the index last
    /// handed to the handler, which is never handed out twice.
    dispatched: Mutex<Option<u64>>,
    /// Serializes cursor updates.
    mark_lock: Mutex<()>,
    fatal_tx: Option<UnboundedSender<FatalError>>,
    /// Delivery attempts in flight.
    tasks: TaskTracker,
    closing: CancellationToken,
    _payload: PhantomData<fn() -> T>,
}

pub struct SequentialQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SequentialQueue<T> {
    fn clone(&self) -> Self {
        SequentialQueue {
            inner: Arc::clone(&self.inner),
        }
    }
}

enum Step {
    Done,
    Cascade(u64),
}

/// Stops a queue from outside, without knowing its payload type.
#[derive(Clone)]
pub struct QueueCloser {
    namespace: String,
    tasks: TaskTracker,
    closing: CancellationToken,
}

impl QueueCloser {
    /// Stop scheduling deliveries and wait until the attempts in flight
    /// return. An attempt never starts a new delivery once the queue is
    /// closing, and a delivery that already started runs to completion.
    /// Whatever was not delivered is resumed by the next `start` on the same
    /// store.
    pub async fn shutdown(self) {
        self.closing.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        log::info!("queue {} stopped", self.namespace);
    }
}

/// Run `op` until it succeeds, retrying store failures after `backoff`
/// sleeps. Other errors, and any error once `closing` fires, are returned.
async fn retry_store_errors<F, Fut>(
    closing: &CancellationToken,
    mut backoff: ExponentialBackoff,
    mut op: F,
) -> Result<(), QueueError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), QueueError>>,
{
    loop {
        match op().await {
            Err(QueueError::Store(err)) if !closing.is_cancelled() => {
                let wait = backoff.next_sleep();
                log::warn!("store write failed, retry in {:?}: {:#}", wait, err);
                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = closing.cancelled() => return Err(QueueError::Store(err)),
                }
            }
            result => return result,
        }
    }
}

impl<T> SequentialQueue<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(
        options: QueueOptions,
        store: Store,
        handler: Arc<dyn ItemHandler<T>>,
        fatal_tx: Option<UnboundedSender<FatalError>>,
    ) -> Self {
        SequentialQueue {
            inner: Arc::new(Inner {
                options,
                store,
                handler,
                dispatched: Mutex::new(None),
                mark_lock: Mutex::new(()),
                fatal_tx,
                tasks: TaskTracker::new(),
                closing: CancellationToken::new(),
                _payload: PhantomData,
            }),
        }
    }

    /// Resume delivery from durable state. Call once after construction.
    pub fn start(&self) -> Result<()> {
        let next = self.next_index()?;
        log::info!(
            "queue {} starts at index {}",
            self.inner.options.namespace,
            next
        );
        self.spawn_attempt(next);
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.inner.options.namespace
    }

    pub fn closer(&self) -> QueueCloser {
        QueueCloser {
            namespace: self.namespace().to_string(),
            tasks: self.inner.tasks.clone(),
            closing: self.inner.closing.clone(),
        }
    }

    pub async fn shutdown(&self) {
        self.closer().shutdown().await
    }

    /// Give up on `index` for good. The [`FatalError`] goes to the fatal
    /// channel, if the queue has one.
    pub fn report_fatal(&self, index: u64, attempts: u32, err: &anyhow::Error) {
        let fatal = FatalError {
            namespace: self.namespace().to_string(),
            index,
            attempts,
            last_error: format!("{:#}", err),
        };
        log::error!("{}", fatal);
        if let Some(ref fatal_tx) = self.inner.fatal_tx {
            let _ = fatal_tx.send(fatal);
        }
    }

    /// `None` when nothing was processed and the start index is 0.
    pub fn last_index_processed(&self) -> Result<Option<u64>> {
        let cursor = self.inner.store.get_queue_cursor(self.namespace())?;
        Ok(cursor.or_else(|| self.inner.options.start_index.checked_sub(1)))
    }

    /// The index waiting to be processed.
    pub fn next_index(&self) -> Result<u64> {
        let next = match self.inner.store.get_queue_cursor(self.namespace())? {
            Some(last) => last + 1,
            None => self.inner.options.start_index,
        };
        Ok(std::cmp::max(next, self.inner.options.start_index))
    }

    pub fn get(&self, index: u64) -> Result<Option<QueueItem<T>>> {
        let record = self
            .inner
            .store
            .get_queue_record::<T>(self.namespace(), index)?;
        Ok(record.map(ProcessingRecord::into_item))
    }

    /// Persist `item` and schedule its delivery. Returns once the item is
    /// durable; delivery happens in the background.
    pub async fn add(&self, index: u64, item: T) -> Result<()> {
        let namespace = self.namespace();
        {
            // a concurrent mark_processed must not be overwritten
            let _guard = self.inner.mark_lock.lock().await;
            let existing = self.inner.store.get_queue_record::<T>(namespace, index)?;
            if matches!(existing, Some(ref record) if record.processed) {
                log::debug!("queue {}: item {} already processed", namespace, index);
            } else {
                let mut tx = self.inner.store.begin_transaction();
                tx.set_queue_record(namespace, &ProcessingRecord::new(index, item))?;
                tx.commit()
                    .with_context(|| format!("queue {}: persist item {}", namespace, index))?;
            }
        }
        self.spawn_attempt(index);
        Ok(())
    }

    /// Mark `index` processed and schedule delivery of `index + 1`.
    ///
    /// Marking an index that is already processed is a no-op.
    pub async fn mark_processed(&self, index: u64) -> Result<(), QueueError> {
        let namespace = self.namespace();
        {
            let _guard = self.inner.mark_lock.lock().await;
            let expected = self.next_index()?;
            if index < expected {
                return Ok(());
            }
            if index > expected {
                return Err(QueueError::OutOfOrder {
                    namespace: namespace.to_string(),
                    index,
                    expected,
                });
            }
            let mut record = self
                .inner
                .store
                .get_queue_record::<T>(namespace, index)?
                .ok_or_else(|| QueueError::MissingItem {
                    namespace: namespace.to_string(),
                    index,
                })?;
            record.processed = true;

            let mut tx = self.inner.store.begin_transaction();
            tx.set_queue_record(namespace, &record)?;
            tx.set_queue_cursor(namespace, index);
            tx.commit()?;
        }
        QUEUE_METRICS.processed(namespace);
        log::debug!("queue {}: processed {}", namespace, index);
        self.spawn_attempt(index + 1);
        Ok(())
    }

    /// [`mark_processed`](Self::mark_processed) for handlers whose side
    /// effect must not be repeated: store failures are retried with the
    /// queue's backoff until they succeed or the queue shuts down.
    pub async fn mark_processed_retrying(&self, index: u64) -> Result<(), QueueError> {
        let options = &self.inner.options;
        let backoff = ExponentialBackoff::new(options.retry_base).with_max_sleep(options.retry_max);
        retry_store_errors(&self.inner.closing, backoff, || self.mark_processed(index)).await
    }

    fn spawn_attempt(&self, index: u64) {
        if self.inner.closing.is_cancelled() {
            log::debug!("queue {}: closing, skip delivery of {}", self.namespace(), index);
            return;
        }
        let queue = self.clone();
        self.inner
            .tasks
            .spawn(async move { queue.attempt(index).await });
    }

    #[tracing::instrument(skip(self), fields(queue = %self.namespace()))]
    async fn attempt(&self, mut index: u64) {
        let options = &self.inner.options;
        let mut backoff =
            ExponentialBackoff::new(options.retry_base).with_max_sleep(options.retry_max);
        let mut owned = false;
        loop {
            let mut dispatched = self.inner.dispatched.lock().await;
            if self.inner.closing.is_cancelled() {
                return;
            }
            let err = match self.try_dispatch(&mut dispatched, index, owned).await {
                Ok(Step::Done) => return,
                Ok(Step::Cascade(next)) => {
                    index = next;
                    owned = false;
                    continue;
                }
                Err(err) => err,
            };
            // Keep the claim across the backoff so no other attempt delivers
            // this index meanwhile.
            owned = *dispatched == Some(index);
            drop(dispatched);

            let attempts = backoff.attempts() + 1;
            if matches!(options.max_attempts, Some(max) if attempts >= max) {
                self.report_fatal(index, attempts, &err);
                return;
            }

            let wait = backoff.next_sleep();
            QUEUE_METRICS.retry(&options.namespace);
            log::warn!(
                "queue {}: deliver {} failed (attempt {}), retry in {:?}: {:#}",
                options.namespace,
                index,
                attempts,
                wait,
                err
            );
            tokio::select! {
                _ = sleep(wait) => {}
                _ = self.inner.closing.cancelled() => return,
            }
        }
    }

    async fn try_dispatch(
        &self,
        dispatched: &mut Option<u64>,
        index: u64,
        owned: bool,
    ) -> Result<Step> {
        let next = self.next_index()?;
        if index < next {
            return Ok(Step::Cascade(next));
        }
        if index > next {
            // the predecessor's mark_processed retriggers this index
            return Ok(Step::Done);
        }
        if *dispatched == Some(index) && !owned {
            return Ok(Step::Done);
        }
        let record = match self.inner.store.get_queue_record::<T>(self.namespace(), index)? {
            Some(record) => record,
            // add() retriggers once it arrives
            None => return Ok(Step::Done),
        };

        *dispatched = Some(index);
        QUEUE_METRICS.dispatched(self.namespace());
        self.inner
            .handler
            .handle(self, index, record.payload)
            .await
            .with_context(|| format!("handle item {}", index))?;
        Ok(Step::Done)
    }
}
