use anyhow::Result;
use async_trait::async_trait;
use relay_types::{
    chain::{
        BlockHeader, BlockTag, EnqueuedTransaction, L2Block, Log, LogFilter, StateBatch,
        TxReceipt,
    },
    Address, H256,
};

/// The coordinating chain.
#[async_trait]
pub trait L1Client: Send + Sync {
    async fn block_number(&self) -> Result<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128>;

    /// Send a transaction from the node-managed sender account.
    async fn send_transaction(&self, to: Address, data: Vec<u8>) -> Result<H256>;

    async fn get_transaction_receipt(&self, tx_hash: H256) -> Result<Option<TxReceipt>>;

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>>;

    async fn get_block(&self, tag: BlockTag) -> Result<Option<BlockHeader>>;
}

/// The execution chain.
#[async_trait]
pub trait L2Client: Send + Sync {
    async fn block_number(&self) -> Result<u64>;

    /// Block with its transactions.
    async fn get_block(&self, tag: BlockTag) -> Result<Option<L2Block>>;

    /// Hand a transaction enqueued on L1 to the sequencer.
    async fn submit_enqueued(&self, tx: &EnqueuedTransaction) -> Result<()>;
}

/// State roots computed by an L2 node, addressed by height.
#[async_trait]
pub trait StateRootProvider: Send + Sync {
    async fn latest_height(&self) -> Result<u64>;

    async fn state_root_at(&self, height: u64) -> Result<Option<H256>>;
}

/// State batches committed to L1.
#[async_trait]
pub trait StateBatchSource: Send + Sync {
    async fn get_state_batch(&self, batch_index: u64) -> Result<Option<StateBatch>>;
}

/// Transactions enqueued on L1 for L2.
#[async_trait]
pub trait EnqueueSource: Send + Sync {
    /// Enqueued transactions in `[from_block, to_block]`, ordered by queue
    /// index.
    async fn get_enqueued(&self, from_block: u64, to_block: u64)
        -> Result<Vec<EnqueuedTransaction>>;
}

#[async_trait]
impl<T: L2Client + ?Sized> StateRootProvider for T {
    async fn latest_height(&self) -> Result<u64> {
        self.block_number().await
    }

    async fn state_root_at(&self, height: u64) -> Result<Option<H256>> {
        let block = self.get_block(BlockTag::Number(height)).await?;
        Ok(block.map(|b| b.state_root))
    }
}
