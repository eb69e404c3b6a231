use std::time::Duration;

use relay_config::{BatchSubmitterConfig, L1Config, L1SyncConfig, QueueConfig};

use super::chain::{canonical_chain_address, enqueue_address, state_commitment_address};

pub fn l1_config() -> L1Config {
    L1Config {
        canonical_chain_address: canonical_chain_address(),
        state_commitment_address: state_commitment_address(),
        enqueue_address: enqueue_address(),
        confirmations: 1,
        confirmation_timeout_secs: 0,
        poll_tx_interval_ms: 1,
        ..Default::default()
    }
}

pub fn queue_config() -> QueueConfig {
    QueueConfig {
        retry_base_ms: 1,
        retry_max_ms: 4,
    }
}

pub fn submitter_config(max_batch_size: u64) -> BatchSubmitterConfig {
    BatchSubmitterConfig {
        enabled: true,
        max_batch_size,
        max_batch_age_secs: 0,
        ..Default::default()
    }
}

pub fn l1_sync_config() -> L1SyncConfig {
    L1SyncConfig {
        enabled: true,
        max_relay_attempts: 3,
        ..Default::default()
    }
}

pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
