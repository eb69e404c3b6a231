//! Storage implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_config::StoreConfig;
use relay_db::{migrate::check_db_version, KVStore, KVStoreRead, MemoryDB, RocksDB};
use tempfile::TempDir;

use crate::schema::{Col, COLUMNS};
use crate::traits::ChainStore;
use crate::transaction::StoreTransaction;

/// Shared handle to the durable store. Cloning is cheap; every clone sees
/// the same data.
#[derive(Clone)]
pub struct Store {
    db: Arc<dyn KVStore>,
    _temp_dir: Option<Arc<TempDir>>,
}

impl Store {
    /// Open RocksDB at `config.path`, or a volatile in-memory store when the
    /// path is empty.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            log::warn!("store path is empty, using a volatile in-memory store");
            return Ok(Self::in_memory());
        }
        let db = RocksDB::open(config, COLUMNS)
            .with_context(|| format!("open store at {}", config.path.display()))?;
        check_db_version(&db)?;
        Ok(Self::new(db))
    }

    pub fn new<DB: KVStore + 'static>(db: DB) -> Self {
        Store {
            db: Arc::new(db),
            _temp_dir: None,
        }
    }

    pub fn open_tmp() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let config = StoreConfig {
            path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let db = RocksDB::open(&config, COLUMNS)?;
        Ok(Self {
            db: Arc::new(db),
            _temp_dir: Some(dir.into()),
        })
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryDB::new())
    }

    pub fn begin_transaction(&self) -> StoreTransaction {
        StoreTransaction::new(self.clone())
    }

    pub(crate) fn as_inner(&self) -> &dyn KVStore {
        self.db.as_ref()
    }
}

impl KVStoreRead for Store {
    fn get(&self, col: Col, key: &[u8]) -> relay_db::Result<Option<Vec<u8>>> {
        self.db.get(col, key)
    }
}

impl ChainStore for Store {}

#[cfg(test)]
mod tests {
    use relay_types::submission::{SubmissionState, SubmissionStatus};

    use super::*;

    #[test]
    fn test_open_tmp_round_trip() {
        let store = Store::open_tmp().unwrap();
        let mut tx = store.begin_transaction();
        tx.set_submission_state(
            3,
            &SubmissionState {
                status: SubmissionStatus::Sent,
                submission_tx_hash: Some([7u8; 32].into()),
            },
        )
        .unwrap();
        tx.set_producer_cursor(10, 4);
        tx.commit().unwrap();

        let state = store.get_submission_state(3).unwrap().unwrap();
        assert_eq!(state.status, SubmissionStatus::Sent);
        assert_eq!(store.get_producer_next_block().unwrap(), Some(10));
        assert_eq!(store.get_producer_next_batch().unwrap(), Some(4));
        assert_eq!(store.get_submission_state(4).unwrap(), None);
    }

    #[test]
    fn test_clones_share_data() {
        let store = Store::in_memory();
        let other = store.clone();
        let mut tx = other.begin_transaction();
        tx.set_l1_sync_cursor(99, 5);
        tx.commit().unwrap();
        assert_eq!(store.get_l1_sync_last_scanned_block().unwrap(), Some(99));
        assert_eq!(store.get_l1_sync_next_queue_index().unwrap(), Some(5));
    }

    #[test]
    fn test_open_empty_path_is_in_memory() {
        let store = Store::open(&StoreConfig::default()).unwrap();
        assert_eq!(store.get_queue_cursor("anything").unwrap(), None);
    }
}
