use crate::error::Error;
use crate::schema::Col;
use crate::write_batch::WriteBatch;

pub trait KVStoreRead {
    fn get(&self, col: Col, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;
}

pub trait KVStoreWrite {
    /// Apply every operation of `batch` atomically. The write is durable
    /// once this returns.
    fn write(&self, batch: WriteBatch) -> Result<(), Error>;

    fn insert_raw(&self, col: Col, key: &[u8], value: &[u8]) -> Result<(), Error> {
        let mut batch = WriteBatch::new();
        batch.put(col, key, value);
        self.write(batch)
    }

    fn delete(&self, col: Col, key: &[u8]) -> Result<(), Error> {
        let mut batch = WriteBatch::new();
        batch.delete(col, key);
        self.write(batch)
    }
}

pub trait KVStore: KVStoreRead + KVStoreWrite + Send + Sync {}

impl<T: KVStoreRead + KVStoreWrite + Send + Sync> KVStore for T {}
