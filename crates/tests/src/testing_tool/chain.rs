//! In-memory chains implementing the relay client traits.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use ethabi::Token;
use relay_rpc_client::{
    contract::{state_batch_appended_topic, transaction_enqueued_topic, uint_topic},
    L1Client, L2Client,
};
use relay_types::{
    chain::{
        BlockHeader, BlockTag, EnqueuedTransaction, L2Block, L2Transaction, Log, LogFilter,
        QueueOrigin, TxReceipt,
    },
    Address, RawTransaction, H256,
};

pub fn enqueue_address() -> Address {
    Address::from([0xe1; 20])
}

pub fn state_commitment_address() -> Address {
    Address::from([0x5c; 20])
}

pub fn canonical_chain_address() -> Address {
    Address::from([0xcc; 20])
}

#[derive(Clone, Debug)]
pub struct SentTx {
    pub to: Address,
    pub data: Vec<u8>,
    pub hash: H256,
    pub block_number: u64,
}

#[derive(Default)]
struct L1State {
    tip: u64,
    logs: Vec<Log>,
    sent: Vec<SentTx>,
    gas_price: u128,
}

/// Every sent transaction is mined in a new block.
#[derive(Default)]
pub struct MockL1 {
    state: Mutex<L1State>,
}

impl MockL1 {
    pub fn mine(&self, blocks: u64) {
        self.state.lock().unwrap().tip += blocks;
    }

    pub fn tip(&self) -> u64 {
        self.state.lock().unwrap().tip
    }

    pub fn set_gas_price(&self, gas_price: u128) {
        self.state.lock().unwrap().gas_price = gas_price;
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    fn push_log(&self, address: Address, topics: Vec<H256>, data: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.tip += 1;
        let log = Log {
            address,
            topics,
            data: data.into(),
            block_number: state.tip,
            transaction_hash: H256::from([state.logs.len() as u8; 32]),
            log_index: 0,
        };
        state.logs.push(log);
    }

    /// Emit `TransactionEnqueued` in a new block.
    pub fn enqueue(&self, queue_index: u64, timestamp: u64, data: &[u8]) {
        let data = ethabi::encode(&[Token::Uint(timestamp.into()), Token::Bytes(data.to_vec())]);
        self.push_log(
            enqueue_address(),
            vec![transaction_enqueued_topic(), uint_topic(queue_index)],
            data,
        );
    }

    /// Emit `StateBatchAppended` in a new block.
    pub fn append_state_batch(&self, batch_index: u64, prev_total_elements: u64, roots: &[H256]) {
        let data = ethabi::encode(&[
            Token::Uint(prev_total_elements.into()),
            Token::Array(
                roots
                    .iter()
                    .map(|root| Token::FixedBytes(root.as_slice().to_vec()))
                    .collect(),
            ),
        ]);
        self.push_log(
            state_commitment_address(),
            vec![state_batch_appended_topic(), uint_topic(batch_index)],
            data,
        );
    }
}

#[async_trait]
impl L1Client for MockL1 {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.tip())
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn send_transaction(&self, to: Address, data: Vec<u8>) -> Result<H256> {
        let mut state = self.state.lock().unwrap();
        state.tip += 1;
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&(state.sent.len() as u64 + 1).to_be_bytes());
        let hash = H256::from(hash);
        let block_number = state.tip;
        state.sent.push(SentTx {
            to,
            data,
            hash,
            block_number,
        });
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: H256) -> Result<Option<TxReceipt>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sent
            .iter()
            .find(|tx| tx.hash == tx_hash)
            .map(|tx| TxReceipt {
                transaction_hash: tx.hash,
                block_number: tx.block_number,
                status: true,
            }))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let state = self.state.lock().unwrap();
        let logs = state
            .logs
            .iter()
            .filter(|log| log.address == filter.address)
            .filter(|log| (filter.from_block..=filter.to_block).contains(&log.block_number))
            .filter(|log| {
                filter
                    .topics
                    .iter()
                    .enumerate()
                    .all(|(i, topic)| match topic {
                        Some(topic) => log.topics.get(i) == Some(topic),
                        None => true,
                    })
            })
            .cloned()
            .collect();
        Ok(logs)
    }

    async fn get_block(&self, tag: BlockTag) -> Result<Option<BlockHeader>> {
        let tip = self.tip();
        let number = match tag {
            BlockTag::Latest => tip,
            BlockTag::Number(n) if n <= tip => n,
            BlockTag::Number(_) => return Ok(None),
        };
        Ok(Some(BlockHeader {
            number,
            hash: H256::zero(),
            state_root: H256::zero(),
            timestamp: number,
        }))
    }
}

/// State root of an L2 block. Chains with different `fork` tags agree below
/// `fork_height` only.
pub fn state_root(number: u64, fork: u8, fork_height: u64) -> H256 {
    let mut root = [0u8; 32];
    root[..8].copy_from_slice(&number.to_be_bytes());
    if number >= fork_height {
        root[31] = fork;
    }
    H256::from(root)
}

struct L2State {
    blocks: Vec<L2Block>,
    fork: u8,
    fork_height: u64,
    fail_enqueued: bool,
}

/// One transaction per block; block 0 is an empty genesis.
pub struct MockL2 {
    state: Mutex<L2State>,
}

impl Default for MockL2 {
    fn default() -> Self {
        Self::forked(0, u64::MAX)
    }
}

impl MockL2 {
    pub fn forked(fork: u8, fork_height: u64) -> Self {
        let genesis = L2Block {
            number: 0,
            hash: H256::zero(),
            state_root: state_root(0, fork, fork_height),
            timestamp: 0,
            transactions: vec![],
        };
        MockL2 {
            state: Mutex::new(L2State {
                blocks: vec![genesis],
                fork,
                fork_height,
                fail_enqueued: false,
            }),
        }
    }

    pub fn set_fail_enqueued(&self, fail: bool) {
        self.state.lock().unwrap().fail_enqueued = fail;
    }

    pub fn blocks(&self) -> Vec<L2Block> {
        self.state.lock().unwrap().blocks.clone()
    }

    fn push(
        &self,
        origin: QueueOrigin,
        timestamp: u64,
        l1_block_number: u64,
        raw: RawTransaction,
        queue_index: Option<u64>,
    ) {
        let mut state = self.state.lock().unwrap();
        let number = state.blocks.len() as u64;
        let block = L2Block {
            number,
            hash: H256::from([number as u8; 32]),
            state_root: state_root(number, state.fork, state.fork_height),
            timestamp,
            transactions: vec![L2Transaction {
                index: number - 1,
                queue_origin: origin,
                timestamp,
                l1_block_number,
                raw,
                queue_index,
            }],
        };
        state.blocks.push(block);
    }

    pub fn push_sequencer_tx(&self, timestamp: u64, l1_block_number: u64, raw: &[u8]) {
        self.push(QueueOrigin::Sequencer, timestamp, l1_block_number, raw.into(), None);
    }
}

#[async_trait]
impl L2Client for MockL2 {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().blocks.len() as u64 - 1)
    }

    async fn get_block(&self, tag: BlockTag) -> Result<Option<L2Block>> {
        let state = self.state.lock().unwrap();
        let block = match tag {
            BlockTag::Latest => state.blocks.last(),
            BlockTag::Number(n) => state.blocks.get(n as usize),
        };
        Ok(block.cloned())
    }

    async fn submit_enqueued(&self, tx: &EnqueuedTransaction) -> Result<()> {
        if self.state.lock().unwrap().fail_enqueued {
            bail!("sequencer rejects enqueued transactions");
        }
        self.push(
            QueueOrigin::L1,
            tx.timestamp,
            tx.l1_block_number,
            tx.data.clone(),
            Some(tx.queue_index),
        );
        Ok(())
    }
}
