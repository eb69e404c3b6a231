use anyhow::Result;
use relay_db::{KVStoreRead, KVStoreWrite, WriteBatch};
use relay_types::{
    queue::ProcessingRecord,
    submission::SubmissionState,
    verifier::{DivergenceRecord, VerifierCursor},
};
use serde::Serialize;

use crate::schema::*;
use crate::store_impl::Store;
use crate::traits::ChainStore;

/// Buffers writes and applies them atomically on [`StoreTransaction::commit`].
///
/// Reads go to the committed state; pending writes are not visible until
/// commit. Dropping without commit discards the writes.
pub struct StoreTransaction {
    store: Store,
    batch: WriteBatch,
}

impl KVStoreRead for StoreTransaction {
    fn get(&self, col: Col, key: &[u8]) -> relay_db::Result<Option<Vec<u8>>> {
        self.store.get(col, key)
    }
}

impl ChainStore for StoreTransaction {}

impl StoreTransaction {
    pub(crate) fn new(store: Store) -> Self {
        StoreTransaction {
            store,
            batch: WriteBatch::new(),
        }
    }

    pub fn commit(self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        self.store.as_inner().write(self.batch)?;
        Ok(())
    }

    pub fn rollback(&mut self) {
        self.batch.clear()
    }

    pub fn insert_raw(&mut self, col: Col, key: &[u8], value: &[u8]) {
        self.batch.put(col, key, value)
    }

    pub fn delete(&mut self, col: Col, key: &[u8]) {
        self.batch.delete(col, key)
    }

    fn insert_json<T: Serialize>(&mut self, col: Col, key: &[u8], value: &T) -> Result<()> {
        let raw = serde_json::to_vec(value)?;
        self.insert_raw(col, key, &raw);
        Ok(())
    }

    pub fn set_queue_record<T: Serialize>(
        &mut self,
        namespace: &str,
        record: &ProcessingRecord<T>,
    ) -> Result<()> {
        self.insert_json(
            COLUMN_QUEUE,
            &queue_record_key(namespace, record.index),
            record,
        )
    }

    pub fn set_queue_cursor(&mut self, namespace: &str, last_processed: u64) {
        self.insert_raw(
            COLUMN_META,
            &queue_cursor_key(namespace),
            &last_processed.to_be_bytes(),
        )
    }

    pub fn set_submission_state(&mut self, batch_number: u64, state: &SubmissionState) -> Result<()> {
        self.insert_json(COLUMN_SUBMISSION, &batch_number.to_be_bytes(), state)
    }

    pub fn set_producer_cursor(&mut self, next_block: u64, next_batch: u64) {
        self.insert_raw(
            COLUMN_META,
            META_PRODUCER_NEXT_BLOCK_KEY,
            &next_block.to_be_bytes(),
        );
        self.insert_raw(
            COLUMN_META,
            META_PRODUCER_NEXT_BATCH_KEY,
            &next_batch.to_be_bytes(),
        );
    }

    pub fn set_l1_sync_cursor(&mut self, last_scanned_block: u64, next_queue_index: u64) {
        self.insert_raw(
            COLUMN_META,
            META_L1_SYNC_LAST_SCANNED_BLOCK_KEY,
            &last_scanned_block.to_be_bytes(),
        );
        self.insert_raw(
            COLUMN_META,
            META_L1_SYNC_NEXT_QUEUE_INDEX_KEY,
            &next_queue_index.to_be_bytes(),
        );
    }

    pub fn set_verifier_cursor(&mut self, cursor: &VerifierCursor) -> Result<()> {
        self.insert_json(COLUMN_META, META_VERIFIER_CURSOR_KEY, cursor)
    }

    /// Keep the record by height and as the latest one.
    pub fn insert_divergence(&mut self, record: &DivergenceRecord) -> Result<()> {
        self.insert_json(COLUMN_DIVERGENCE, &record.height.to_be_bytes(), record)?;
        self.insert_json(COLUMN_META, META_LATEST_DIVERGENCE_KEY, record)
    }
}
