//! The schema include constants define the low level database column families.

/// Column families alias type
pub type Col = u8;
/// Total column number
pub const COLUMNS: u32 = 4;
/// Column store meta data: cursors and versions
pub const COLUMN_META: Col = 0;
/// Column store queue records, `{namespace}/{index in big endian}` -> record
pub const COLUMN_QUEUE: Col = 1;
/// Column store submission state, batch number (in big endian) -> state
pub const COLUMN_SUBMISSION: Col = 2;
/// Column store located divergences, height (in big endian) -> record
pub const COLUMN_DIVERGENCE: Col = 3;

/// Next L2 block the batch producer reads.
pub const META_PRODUCER_NEXT_BLOCK_KEY: &[u8] = b"PRODUCER_NEXT_BLOCK";
/// Number assigned to the next produced batch.
pub const META_PRODUCER_NEXT_BATCH_KEY: &[u8] = b"PRODUCER_NEXT_BATCH";
/// Last L1 block scanned for enqueued transactions.
pub const META_L1_SYNC_LAST_SCANNED_BLOCK_KEY: &[u8] = b"L1_SYNC_LAST_SCANNED_BLOCK";
/// Next queue index expected from L1.
pub const META_L1_SYNC_NEXT_QUEUE_INDEX_KEY: &[u8] = b"L1_SYNC_NEXT_QUEUE_INDEX";
/// Highest state batch verified against the replica.
pub const META_VERIFIER_CURSOR_KEY: &[u8] = b"VERIFIER_CURSOR";
/// Most recently located divergence.
pub const META_LATEST_DIVERGENCE_KEY: &[u8] = b"LATEST_DIVERGENCE";
/// Tracks the current database version.
pub const MIGRATION_VERSION_KEY: &[u8] = b"db-version";

/// Meta key holding the last processed index of a queue.
pub fn queue_cursor_key(namespace: &str) -> Vec<u8> {
    format!("queue/{}/last_processed", namespace).into_bytes()
}

/// Key of a queue record. Indices are big endian so records of one queue
/// sort by index.
pub fn queue_record_key(namespace: &str, index: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(namespace.len() + 1 + 8);
    key.extend_from_slice(namespace.as_bytes());
    key.push(b'/');
    key.extend_from_slice(&index.to_be_bytes());
    key
}

pub fn column_name(col: Col) -> String {
    col.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_record_keys_sort_by_index() {
        let a = queue_record_key("batches", 1);
        let b = queue_record_key("batches", 256);
        assert!(a < b);
        assert_ne!(queue_record_key("a", 1), queue_record_key("b", 1));
    }
}
