//! JSON shapes of the Ethereum JSON-RPC responses we read. Quantities are
//! kept as strings and parsed on conversion.

use anyhow::{anyhow, Result};
use relay_types::{
    chain::{BlockHeader, L2Block, L2Transaction, Log, QueueOrigin, TxReceipt},
    Address, RawTransaction, H256,
};
use serde::{Deserialize, Serialize};

use crate::utils::{parse_quantity_u64, to_quantity};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
    pub transaction_hash: H256,
    pub block_number: Option<String>,
    pub status: Option<String>,
}

impl RpcReceipt {
    /// `None` while the receipt has no block yet.
    pub fn into_receipt(self) -> Result<Option<TxReceipt>> {
        let block_number = match self.block_number {
            Some(ref n) => parse_quantity_u64(n)?,
            None => return Ok(None),
        };
        let status = match self.status.as_deref() {
            Some(s) => parse_quantity_u64(s)? == 1,
            // pre-byzantium receipts carry no status
            None => true,
        };
        Ok(Some(TxReceipt {
            transaction_hash: self.transaction_hash,
            block_number,
            status,
        }))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: RawTransaction,
    pub block_number: String,
    pub transaction_hash: H256,
    pub log_index: String,
}

impl RpcLog {
    pub fn into_log(self) -> Result<Log> {
        Ok(Log {
            address: self.address,
            topics: self.topics,
            data: self.data,
            block_number: parse_quantity_u64(&self.block_number)?,
            transaction_hash: self.transaction_hash,
            log_index: parse_quantity_u64(&self.log_index)?,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcLogFilter {
    pub address: Address,
    pub topics: Vec<Option<H256>>,
    pub from_block: String,
    pub to_block: String,
}

impl From<&relay_types::chain::LogFilter> for RpcLogFilter {
    fn from(filter: &relay_types::chain::LogFilter) -> Self {
        RpcLogFilter {
            address: filter.address,
            topics: filter.topics.clone(),
            from_block: to_quantity(filter.from_block),
            to_block: to_quantity(filter.to_block),
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct RpcTransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: RawTransaction,
}

/// Transaction object of an L2 node. Besides the standard fields it carries
/// the rollup extensions `queueOrigin`, `l1Timestamp`, `l1BlockNumber`,
/// `queueIndex` and `rawTransaction`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcL2Transaction {
    pub queue_origin: QueueOrigin,
    pub l1_timestamp: String,
    pub l1_block_number: String,
    pub queue_index: Option<String>,
    #[serde(default)]
    pub raw_transaction: RawTransaction,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcBlock<Tx> {
    pub number: String,
    pub hash: H256,
    pub state_root: H256,
    pub timestamp: String,
    #[serde(default = "Vec::new")]
    pub transactions: Vec<Tx>,
}

impl<Tx> RpcBlock<Tx> {
    pub fn header(&self) -> Result<BlockHeader> {
        Ok(BlockHeader {
            number: parse_quantity_u64(&self.number)?,
            hash: self.hash,
            state_root: self.state_root,
            timestamp: parse_quantity_u64(&self.timestamp)?,
        })
    }
}

impl RpcBlock<RpcL2Transaction> {
    /// One transaction per L2 block; the transaction at height `h` has
    /// canonical index `h - 1`.
    pub fn into_l2_block(self) -> Result<L2Block> {
        let header = self.header()?;
        let mut transactions = Vec::with_capacity(self.transactions.len());
        for (i, tx) in self.transactions.into_iter().enumerate() {
            let first_index = header
                .number
                .checked_sub(1)
                .ok_or_else(|| anyhow!("L2 genesis block carries no canonical transactions"))?;
            let queue_index = match tx.queue_index {
                Some(ref q) => Some(parse_quantity_u64(q)?),
                None => None,
            };
            transactions.push(L2Transaction {
                index: first_index + i as u64,
                queue_origin: tx.queue_origin,
                timestamp: parse_quantity_u64(&tx.l1_timestamp)?,
                l1_block_number: parse_quantity_u64(&tx.l1_block_number)?,
                raw: tx.raw_transaction,
                queue_index,
            });
        }
        Ok(L2Block {
            number: header.number,
            hash: header.hash,
            state_root: header.state_root,
            timestamp: header.timestamp,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_l2_block() {
        let block: RpcBlock<RpcL2Transaction> = serde_json::from_value(json!({
            "number": "0x5",
            "hash": format!("0x{}", "11".repeat(32)),
            "stateRoot": format!("0x{}", "22".repeat(32)),
            "timestamp": "0x64",
            "transactions": [{
                "queueOrigin": "l1",
                "l1Timestamp": "0x63",
                "l1BlockNumber": "0x9",
                "queueIndex": "0x2",
                "rawTransaction": "0xdead"
            }]
        }))
        .unwrap();
        let block = block.into_l2_block().unwrap();
        assert_eq!(block.number, 5);
        assert_eq!(block.timestamp, 100);
        let tx = &block.transactions[0];
        assert_eq!(tx.index, 4);
        assert_eq!(tx.queue_origin, QueueOrigin::L1);
        assert_eq!(tx.timestamp, 99);
        assert_eq!(tx.l1_block_number, 9);
        assert_eq!(tx.queue_index, Some(2));
        assert_eq!(tx.raw.as_bytes(), &[0xde, 0xad]);
    }

    #[test]
    fn test_pending_receipt() {
        let receipt: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "33".repeat(32)),
            "blockNumber": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(receipt.into_receipt().unwrap(), None);

        let receipt: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "33".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x0"
        }))
        .unwrap();
        let receipt = receipt.into_receipt().unwrap().unwrap();
        assert_eq!(receipt.block_number, 16);
        assert!(!receipt.status);
    }
}
