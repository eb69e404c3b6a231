use anyhow::Result;
use async_jsonrpc_client::{HttpClient, Params as ClientParams, Transport};
use async_trait::async_trait;
use relay_types::{
    chain::{BlockHeader, BlockTag, EnqueuedTransaction, L2Block, Log, LogFilter, TxReceipt},
    Address, H256,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;

use crate::{
    error::RPCRequestError,
    eth_types::{RpcBlock, RpcL2Transaction, RpcLog, RpcLogFilter, RpcReceipt, RpcTransactionRequest},
    traits::{L1Client, L2Client},
    utils::{parse_quantity, parse_quantity_u64, to_quantity, to_result, DEFAULT_HTTP_TIMEOUT},
};

/// Ethereum JSON-RPC client. Serves as the L1 client (transactions are sent
/// from `sender`, an account managed by the node) and as the L2 client.
#[derive(Clone)]
pub struct EthRpcClient {
    client: HttpClient,
    name: &'static str,
    sender: Address,
}

fn block_tag(tag: BlockTag) -> String {
    match tag {
        BlockTag::Latest => "latest".to_string(),
        BlockTag::Number(n) => to_quantity(n),
    }
}

impl EthRpcClient {
    pub fn new(client: HttpClient, name: &'static str, sender: Address) -> Self {
        EthRpcClient {
            client,
            name,
            sender,
        }
    }

    pub fn with_url(url: &str, name: &'static str, sender: Address) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build(url)?;
        Ok(Self::new(client, name, sender))
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<ClientParams>,
    ) -> Result<T> {
        let response = self
            .client
            .request(method, params)
            .await
            .map_err(|err| RPCRequestError::new(self.name, method.to_string(), err))?;
        let response_str = response.to_string();
        match to_result::<T>(response) {
            Ok(r) => Ok(r),
            Err(err) => {
                log::error!(
                    "[{}] Failed to parse response, method: {}, response: {}",
                    self.name,
                    method,
                    response_str
                );
                Err(err)
            }
        }
    }

    async fn eth_block_number(&self) -> Result<u64> {
        let number: String = self.request("eth_blockNumber", None).await?;
        parse_quantity_u64(&number)
    }
}

#[async_trait]
impl L1Client for EthRpcClient {
    async fn block_number(&self) -> Result<u64> {
        self.eth_block_number().await
    }

    async fn gas_price(&self) -> Result<u128> {
        let price: String = self.request("eth_gasPrice", None).await?;
        parse_quantity(&price)
    }

    #[tracing::instrument(skip(self, data), fields(len = data.len()))]
    async fn send_transaction(&self, to: Address, data: Vec<u8>) -> Result<H256> {
        let request = RpcTransactionRequest {
            from: self.sender,
            to,
            data: data.into(),
        };
        self.request(
            "eth_sendTransaction",
            Some(ClientParams::Array(vec![json!(request)])),
        )
        .await
    }

    async fn get_transaction_receipt(&self, tx_hash: H256) -> Result<Option<TxReceipt>> {
        let receipt: Option<RpcReceipt> = self
            .request(
                "eth_getTransactionReceipt",
                Some(ClientParams::Array(vec![json!(tx_hash)])),
            )
            .await?;
        match receipt {
            Some(receipt) => receipt.into_receipt(),
            None => Ok(None),
        }
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let logs: Vec<RpcLog> = self
            .request(
                "eth_getLogs",
                Some(ClientParams::Array(vec![json!(RpcLogFilter::from(filter))])),
            )
            .await?;
        logs.into_iter().map(RpcLog::into_log).collect()
    }

    async fn get_block(&self, tag: BlockTag) -> Result<Option<BlockHeader>> {
        let block: Option<RpcBlock<IgnoredAny>> = self
            .request(
                "eth_getBlockByNumber",
                Some(ClientParams::Array(vec![json!(block_tag(tag)), json!(false)])),
            )
            .await?;
        block.map(|b| b.header()).transpose()
    }
}

#[async_trait]
impl L2Client for EthRpcClient {
    async fn block_number(&self) -> Result<u64> {
        self.eth_block_number().await
    }

    async fn get_block(&self, tag: BlockTag) -> Result<Option<L2Block>> {
        let block: Option<RpcBlock<RpcL2Transaction>> = self
            .request(
                "eth_getBlockByNumber",
                Some(ClientParams::Array(vec![json!(block_tag(tag)), json!(true)])),
            )
            .await?;
        block.map(RpcBlock::into_l2_block).transpose()
    }

    async fn submit_enqueued(&self, tx: &EnqueuedTransaction) -> Result<()> {
        let _: serde_json::Value = self
            .request(
                "rollup_submitEnqueuedTransaction",
                Some(ClientParams::Array(vec![json!(tx)])),
            )
            .await?;
        Ok(())
    }
}
