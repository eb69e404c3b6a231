//! Records read from or written to the L1 and L2 chains.

use serde::{Deserialize, Serialize};

use crate::{Address, RawTransaction, H256};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOrigin {
    /// Ordered by the sequencer; the raw transaction travels in the batch.
    Sequencer,
    /// Enqueued on L1; only counted in the batch.
    L1,
}

/// A transaction in the canonical L2 transaction chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Transaction {
    /// Position in the canonical transaction chain.
    pub index: u64,
    pub queue_origin: QueueOrigin,
    pub timestamp: u64,
    pub l1_block_number: u64,
    pub raw: RawTransaction,
    pub queue_index: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Block {
    pub number: u64,
    pub hash: H256,
    pub state_root: H256,
    pub timestamp: u64,
    pub transactions: Vec<L2Transaction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: u64,
    pub hash: H256,
    pub state_root: H256,
    pub timestamp: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: H256,
    pub block_number: u64,
    /// False if the transaction was included but reverted.
    pub status: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    /// `None` matches any topic at that position.
    pub topics: Vec<Option<H256>>,
    pub from_block: u64,
    pub to_block: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: RawTransaction,
    pub block_number: u64,
    pub transaction_hash: H256,
    pub log_index: u64,
}

/// A transaction enqueued on L1 for inclusion on L2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedTransaction {
    pub queue_index: u64,
    pub l1_block_number: u64,
    pub timestamp: u64,
    pub data: RawTransaction,
}

/// State roots committed to L1 in one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBatch {
    pub batch_index: u64,
    pub prev_total_elements: u64,
    pub roots: Vec<H256>,
}

impl StateBatch {
    /// L2 height whose state root is committed at `position`.
    pub fn height_of(&self, position: usize) -> u64 {
        self.prev_total_elements + 1 + position as u64
    }
}
