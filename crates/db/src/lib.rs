//! Low level key/value storage.
//!
//! Two backends share the same interface: [`RocksDB`] for production and
//! [`MemoryDB`] for tests and throwaway runs. Every mutation goes through a
//! [`WriteBatch`] so that multi-key updates land atomically.

pub mod db;
pub mod error;
pub mod kv;
pub mod memory_db;
pub mod migrate;
pub mod schema;
pub mod write_batch;

// re-exports
pub use crate::db::RocksDB;
pub use crate::error::Error;
pub use crate::kv::{KVStore, KVStoreRead, KVStoreWrite};
pub use crate::memory_db::MemoryDB;
pub use crate::write_batch::{WriteBatch, WriteOp};
pub use rocksdb::Error as DBError;

pub type Result<T, E = Error> = std::result::Result<T, E>;
