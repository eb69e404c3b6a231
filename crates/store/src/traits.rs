//! Typed reads shared by [`crate::Store`] and [`crate::StoreTransaction`].

use anyhow::{Context, Result};
use relay_db::KVStoreRead;
use relay_types::{
    queue::ProcessingRecord,
    submission::SubmissionState,
    verifier::{DivergenceRecord, VerifierCursor},
};
use serde::de::DeserializeOwned;

use crate::schema::*;

pub(crate) fn decode_u64(raw: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| anyhow::anyhow!("expect 8 bytes, got {}", raw.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

pub trait ChainStore: KVStoreRead {
    fn get_u64(&self, col: Col, key: &[u8]) -> Result<Option<u64>> {
        match self.get(col, key)? {
            Some(raw) => Ok(Some(decode_u64(&raw)?)),
            None => Ok(None),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, col: Col, key: &[u8]) -> Result<Option<T>> {
        match self.get(col, key)? {
            Some(raw) => {
                let value = serde_json::from_slice(&raw).with_context(|| {
                    format!("decode value of column {} key {}", col, String::from_utf8_lossy(key))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn get_queue_record<T: DeserializeOwned>(
        &self,
        namespace: &str,
        index: u64,
    ) -> Result<Option<ProcessingRecord<T>>> {
        self.get_json(COLUMN_QUEUE, &queue_record_key(namespace, index))
    }

    /// Last processed index of a queue, `None` if nothing was processed.
    fn get_queue_cursor(&self, namespace: &str) -> Result<Option<u64>> {
        self.get_u64(COLUMN_META, &queue_cursor_key(namespace))
    }

    fn get_submission_state(&self, batch_number: u64) -> Result<Option<SubmissionState>> {
        self.get_json(COLUMN_SUBMISSION, &batch_number.to_be_bytes())
    }

    fn get_producer_next_block(&self) -> Result<Option<u64>> {
        self.get_u64(COLUMN_META, META_PRODUCER_NEXT_BLOCK_KEY)
    }

    fn get_producer_next_batch(&self) -> Result<Option<u64>> {
        self.get_u64(COLUMN_META, META_PRODUCER_NEXT_BATCH_KEY)
    }

    fn get_l1_sync_last_scanned_block(&self) -> Result<Option<u64>> {
        self.get_u64(COLUMN_META, META_L1_SYNC_LAST_SCANNED_BLOCK_KEY)
    }

    fn get_l1_sync_next_queue_index(&self) -> Result<Option<u64>> {
        self.get_u64(COLUMN_META, META_L1_SYNC_NEXT_QUEUE_INDEX_KEY)
    }

    fn get_verifier_cursor(&self) -> Result<VerifierCursor> {
        Ok(self
            .get_json(COLUMN_META, META_VERIFIER_CURSOR_KEY)?
            .unwrap_or_default())
    }

    fn get_latest_divergence(&self) -> Result<Option<DivergenceRecord>> {
        self.get_json(COLUMN_META, META_LATEST_DIVERGENCE_KEY)
    }

    fn get_divergence(&self, height: u64) -> Result<Option<DivergenceRecord>> {
        self.get_json(COLUMN_DIVERGENCE, &height.to_be_bytes())
    }
}
