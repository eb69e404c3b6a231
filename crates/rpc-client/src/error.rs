use relay_types::H256;
use thiserror::Error;

// NOTE: Error only for [client].request() not to_result()
#[derive(Error, Debug)]
#[error("{client} error, method: {method} error: {source}")]
pub struct RPCRequestError {
    pub client: &'static str,
    pub method: String,
    pub source: anyhow::Error,
}

impl RPCRequestError {
    pub fn new<E: Into<anyhow::Error>>(client: &'static str, method: String, source: E) -> Self {
        RPCRequestError {
            client,
            method,
            source: source.into(),
        }
    }
}

/// The transaction was included but reverted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transaction {tx_hash} reverted in block {block_number}")]
pub struct TransactionReverted {
    pub tx_hash: H256,
    pub block_number: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transaction {tx_hash} not confirmed after {waited_secs}s")]
pub struct ConfirmationTimeout {
    pub tx_hash: H256,
    pub waited_secs: u64,
}
