use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Error;
use crate::kv::{KVStoreRead, KVStoreWrite};
use crate::schema::Col;
use crate::write_batch::{WriteBatch, WriteOp};
use crate::Result;

type Table = HashMap<(Col, Vec<u8>), Vec<u8>>;

/// Volatile backend. Clones share the same table.
#[derive(Clone, Default)]
pub struct MemoryDB {
    inner: Arc<RwLock<Table>>,
}

impl MemoryDB {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KVStoreRead for MemoryDB {
    fn get(&self, col: Col, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let table = self
            .inner
            .read()
            .map_err(|_| Error::from("memory db lock poisoned"))?;
        Ok(table.get(&(col, key.to_vec())).cloned())
    }
}

impl KVStoreWrite for MemoryDB {
    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| Error::from("memory db lock poisoned"))?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { col, key, value } => {
                    table.insert((col, key), value);
                }
                WriteOp::Delete { col, key } => {
                    table.remove(&(col, key));
                }
            }
        }
        Ok(())
    }
}
