//! RocksDB backend, one column family per [`Col`].

use std::sync::Arc;

use relay_config::StoreConfig;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, WriteOptions, DB};

use crate::error::Error;
use crate::kv::{KVStoreRead, KVStoreWrite};
use crate::schema::{column_name, Col};
use crate::write_batch::{WriteBatch, WriteOp};
use crate::Result;

#[derive(Clone)]
pub struct RocksDB {
    pub(crate) inner: Arc<DB>,
}

impl RocksDB {
    pub fn open(config: &StoreConfig, columns: u32) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = (0..columns)
            .map(|c| ColumnFamilyDescriptor::new(column_name(c as Col), Options::default()));
        log::debug!("opening db at {}", config.path.display());
        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors).map_err(|err| {
            Error::from(format!(
                "failed to open database at {}: {}",
                config.path.display(),
                err.into_string()
            ))
        })?;

        if !config.options.is_empty() {
            let rocksdb_options: Vec<(&str, &str)> = config
                .options
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            db.set_options(&rocksdb_options)?;
        }

        Ok(RocksDB {
            inner: Arc::new(db),
        })
    }

    pub fn inner(&self) -> &DB {
        &self.inner
    }
}

pub(crate) fn cf_handle(db: &DB, col: Col) -> Result<&ColumnFamily> {
    db.cf_handle(&column_name(col))
        .ok_or_else(|| Error::from(format!("column {} not found", col)))
}

impl KVStoreRead for RocksDB {
    fn get(&self, col: Col, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = cf_handle(&self.inner, col)?;
        Ok(self.inner.get_cf(cf, key)?)
    }
}

impl KVStoreWrite for RocksDB {
    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut inner = rocksdb::WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { col, key, value } => {
                    inner.put_cf(cf_handle(&self.inner, col)?, key, value)
                }
                WriteOp::Delete { col, key } => inner.delete_cf(cf_handle(&self.inner, col)?, key),
            }
        }
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        self.inner.write_opt(inner, &opts)?;
        Ok(())
    }
}
