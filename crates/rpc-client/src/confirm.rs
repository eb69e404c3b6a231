use std::time::Duration;

use anyhow::Result;
use relay_types::{chain::TxReceipt, H256};
use tokio::time::Instant;

use crate::{
    error::{ConfirmationTimeout, TransactionReverted},
    traits::L1Client,
};

/// Poll until `tx_hash` is buried under `confirmations` blocks.
///
/// Fails with [`TransactionReverted`] as soon as a reverted receipt shows up
/// and with [`ConfirmationTimeout`] once `timeout` elapses.
pub async fn wait_for_confirmations<C: L1Client + ?Sized>(
    client: &C,
    tx_hash: H256,
    confirmations: u64,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<TxReceipt> {
    let started = Instant::now();
    loop {
        if let Some(receipt) = client.get_transaction_receipt(tx_hash).await? {
            if !receipt.status {
                return Err(TransactionReverted {
                    tx_hash,
                    block_number: receipt.block_number,
                }
                .into());
            }
            let tip = client.block_number().await?;
            let depth = (tip + 1).saturating_sub(receipt.block_number);
            if depth >= confirmations {
                return Ok(receipt);
            }
            log::debug!(
                "tx {} has {}/{} confirmations",
                tx_hash,
                depth,
                confirmations
            );
        }

        if started.elapsed() >= timeout {
            return Err(ConfirmationTimeout {
                tx_hash,
                waited_secs: started.elapsed().as_secs(),
            }
            .into());
        }
        tokio::time::sleep(poll_interval).await;
    }
}
