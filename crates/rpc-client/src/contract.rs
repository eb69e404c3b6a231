//! Rollup contract events and calldata.
//!
//! ```text
//! event TransactionEnqueued(uint256 indexed queueIndex, uint256 timestamp, bytes data)
//! event StateBatchAppended(uint256 indexed batchIndex, uint256 prevTotalElements, bytes32[] roots)
//! function appendSequencerBatch()  // the encoded batch follows the selector
//! ```

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ethabi::{ParamType, Token};
use relay_types::{
    chain::{EnqueuedTransaction, Log, LogFilter, StateBatch},
    Address, H256,
};

use crate::traits::{EnqueueSource, L1Client, StateBatchSource};

fn transaction_enqueued_params() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bytes,
    ]
}

fn state_batch_appended_params() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Array(Box::new(ParamType::FixedBytes(32))),
    ]
}

pub fn transaction_enqueued_topic() -> H256 {
    H256::from(ethabi::long_signature("TransactionEnqueued", &transaction_enqueued_params()).0)
}

pub fn state_batch_appended_topic() -> H256 {
    H256::from(ethabi::long_signature("StateBatchAppended", &state_batch_appended_params()).0)
}

/// Calldata of `appendSequencerBatch()` carrying `encoded_batch`.
pub fn append_sequencer_batch_calldata(encoded_batch: &[u8]) -> Vec<u8> {
    let selector = ethabi::short_signature("appendSequencerBatch", &[]);
    let mut data = Vec::with_capacity(selector.len() + encoded_batch.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(encoded_batch);
    data
}

/// Indexed uint256 topic.
pub fn uint_topic(value: u64) -> H256 {
    let mut buf = [0u8; 32];
    buf[24..].copy_from_slice(&value.to_be_bytes());
    H256::from(buf)
}

fn topic_to_u64(topic: &H256) -> Result<u64> {
    let bytes = topic.as_slice();
    if bytes[..24].iter().any(|b| *b != 0) {
        bail!("indexed value {} overflows u64", topic);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[24..]);
    Ok(u64::from_be_bytes(buf))
}

fn token_to_u64(token: Token) -> Result<u64> {
    match token {
        Token::Uint(n) if n <= ethabi::Uint::from(u64::MAX) => Ok(n.low_u64()),
        Token::Uint(n) => Err(anyhow!("uint {} overflows u64", n)),
        other => Err(anyhow!("expect uint, got {:?}", other)),
    }
}

pub fn parse_transaction_enqueued(log: &Log) -> Result<EnqueuedTransaction> {
    let queue_index = log
        .topics
        .get(1)
        .ok_or_else(|| anyhow!("TransactionEnqueued without queue index topic"))
        .and_then(topic_to_u64)?;
    let mut tokens = ethabi::decode(
        &[ParamType::Uint(256), ParamType::Bytes],
        log.data.as_bytes(),
    )
    .context("decode TransactionEnqueued data")?
    .into_iter();
    let timestamp = token_to_u64(tokens.next().ok_or_else(|| anyhow!("missing timestamp"))?)?;
    let data = match tokens.next() {
        Some(Token::Bytes(data)) => data,
        other => bail!("expect bytes, got {:?}", other),
    };
    Ok(EnqueuedTransaction {
        queue_index,
        l1_block_number: log.block_number,
        timestamp,
        data: data.into(),
    })
}

pub fn parse_state_batch_appended(log: &Log) -> Result<StateBatch> {
    let batch_index = log
        .topics
        .get(1)
        .ok_or_else(|| anyhow!("StateBatchAppended without batch index topic"))
        .and_then(topic_to_u64)?;
    let mut tokens = ethabi::decode(
        &[
            ParamType::Uint(256),
            ParamType::Array(Box::new(ParamType::FixedBytes(32))),
        ],
        log.data.as_bytes(),
    )
    .context("decode StateBatchAppended data")?
    .into_iter();
    let prev_total_elements =
        token_to_u64(tokens.next().ok_or_else(|| anyhow!("missing prevTotalElements"))?)?;
    let roots = match tokens.next() {
        Some(Token::Array(roots)) => roots
            .into_iter()
            .map(|root| match root {
                Token::FixedBytes(bytes) => H256::from_slice(&bytes).map_err(Into::into),
                other => Err(anyhow!("expect bytes32, got {:?}", other)),
            })
            .collect::<Result<Vec<_>>>()?,
        other => bail!("expect bytes32[], got {:?}", other),
    };
    Ok(StateBatch {
        batch_index,
        prev_total_elements,
        roots,
    })
}

/// Reads rollup contract events through an [`L1Client`].
pub struct ContractEvents {
    client: Arc<dyn L1Client>,
    enqueue_address: Address,
    state_commitment_address: Address,
}

impl ContractEvents {
    pub fn new(
        client: Arc<dyn L1Client>,
        enqueue_address: Address,
        state_commitment_address: Address,
    ) -> Self {
        ContractEvents {
            client,
            enqueue_address,
            state_commitment_address,
        }
    }
}

#[async_trait]
impl EnqueueSource for ContractEvents {
    async fn get_enqueued(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EnqueuedTransaction>> {
        let filter = LogFilter {
            address: self.enqueue_address,
            topics: vec![Some(transaction_enqueued_topic())],
            from_block,
            to_block,
        };
        let mut enqueued = self
            .client
            .get_logs(&filter)
            .await?
            .iter()
            .map(parse_transaction_enqueued)
            .collect::<Result<Vec<_>>>()?;
        enqueued.sort_by_key(|tx| tx.queue_index);
        Ok(enqueued)
    }
}

#[async_trait]
impl StateBatchSource for ContractEvents {
    async fn get_state_batch(&self, batch_index: u64) -> Result<Option<StateBatch>> {
        let to_block = self.client.block_number().await?;
        let filter = LogFilter {
            address: self.state_commitment_address,
            topics: vec![
                Some(state_batch_appended_topic()),
                Some(uint_topic(batch_index)),
            ],
            from_block: 0,
            to_block,
        };
        let logs = self.client.get_logs(&filter).await?;
        match logs.first() {
            Some(log) => Ok(Some(parse_state_batch_appended(log)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(topics: Vec<H256>, data: Vec<u8>) -> Log {
        Log {
            address: Address::zero(),
            topics,
            data: data.into(),
            block_number: 77,
            transaction_hash: H256::zero(),
            log_index: 0,
        }
    }

    #[test]
    fn test_parse_transaction_enqueued() {
        let data = ethabi::encode(&[Token::Uint(1234u64.into()), Token::Bytes(vec![1, 2, 3])]);
        let log = log(vec![transaction_enqueued_topic(), uint_topic(9)], data);
        let tx = parse_transaction_enqueued(&log).unwrap();
        assert_eq!(tx.queue_index, 9);
        assert_eq!(tx.timestamp, 1234);
        assert_eq!(tx.l1_block_number, 77);
        assert_eq!(tx.data.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_parse_state_batch_appended() {
        let roots = vec![[1u8; 32], [2u8; 32]];
        let data = ethabi::encode(&[
            Token::Uint(10u64.into()),
            Token::Array(
                roots
                    .iter()
                    .map(|r| Token::FixedBytes(r.to_vec()))
                    .collect(),
            ),
        ]);
        let log = log(vec![state_batch_appended_topic(), uint_topic(3)], data);
        let batch = parse_state_batch_appended(&log).unwrap();
        assert_eq!(batch.batch_index, 3);
        assert_eq!(batch.prev_total_elements, 10);
        assert_eq!(batch.roots, vec![H256::from([1u8; 32]), H256::from([2u8; 32])]);
        assert_eq!(batch.height_of(1), 12);
    }

    #[test]
    fn test_reject_truncated_event() {
        let log = log(vec![transaction_enqueued_topic()], vec![0u8; 10]);
        assert!(parse_transaction_enqueued(&log).is_err());
    }

    #[test]
    fn test_calldata_prefix() {
        let data = append_sequencer_batch_calldata(&[0xaa, 0xbb]);
        assert_eq!(data.len(), 6);
        assert_eq!(&data[4..], &[0xaa, 0xbb]);
        assert_eq!(&data[..4], &ethabi::short_signature("appendSequencerBatch", &[]));
    }
}
