use std::{collections::HashMap, net::SocketAddr, path::PathBuf, time::Duration};

use relay_types::Address;
use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid config: {0}")]
pub struct ConfigError(pub String);

macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(ConfigError(format!($($arg)+)));
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub trace: Option<Trace>,
    pub metrics_listen: Option<SocketAddr>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub l1: L1Config,
    #[serde(default)]
    pub l2: L2Config,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub batch_submitter: BatchSubmitterConfig,
    #[serde(default)]
    pub l1_sync: L1SyncConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trace {
    /// Emit log lines as JSON objects.
    Json,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Empty path opens a volatile in-memory store.
    #[serde(default)]
    pub path: PathBuf,
    /// Extra RocksDB options applied after opening.
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct L1Config {
    pub rpc_url: String,
    /// Node-managed account used as the sender of submissions.
    pub sender: Address,
    pub canonical_chain_address: Address,
    pub state_commitment_address: Address,
    pub enqueue_address: Address,
    pub confirmations: u64,
    pub confirmation_timeout_secs: u64,
    pub poll_tx_interval_ms: u64,
}

impl Default for L1Config {
    fn default() -> Self {
        L1Config {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            sender: Address::zero(),
            canonical_chain_address: Address::zero(),
            state_commitment_address: Address::zero(),
            enqueue_address: Address::zero(),
            confirmations: DEFAULT_CONFIRMATIONS,
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            poll_tx_interval_ms: DEFAULT_POLL_TX_INTERVAL_MS,
        }
    }
}

impl L1Config {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_tx_interval(&self) -> Duration {
        Duration::from_millis(self.poll_tx_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct L2Config {
    /// Sequencer endpoint.
    pub rpc_url: String,
    /// Independently executing replica.
    pub replica_url: String,
}

impl Default for L2Config {
    fn default() -> Self {
        L2Config {
            rpc_url: "http://127.0.0.1:8547".to_string(),
            replica_url: "http://127.0.0.1:8549".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
            retry_max_ms: DEFAULT_RETRY_MAX_MS,
        }
    }
}

impl QueueConfig {
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }

    pub fn retry_max(&self) -> Duration {
        Duration::from_millis(self.retry_max_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSubmitterConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    /// First L2 block to batch.
    pub start_block: u64,
    /// Number of the first batch.
    pub start_batch: u64,
    pub min_batch_size: u64,
    pub max_batch_size: u64,
    pub max_batch_age_secs: u64,
    pub compression: bool,
    pub max_gas_price_gwei: u64,
}

impl Default for BatchSubmitterConfig {
    fn default() -> Self {
        BatchSubmitterConfig {
            enabled: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            start_block: 1,
            start_batch: 0,
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_age_secs: DEFAULT_MAX_BATCH_AGE_SECS,
            compression: false,
            max_gas_price_gwei: DEFAULT_MAX_GAS_PRICE_GWEI,
        }
    }
}

impl BatchSubmitterConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_batch_age(&self) -> Duration {
        Duration::from_secs(self.max_batch_age_secs)
    }

    pub fn max_gas_price_wei(&self) -> u128 {
        self.max_gas_price_gwei as u128 * 1_000_000_000
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct L1SyncConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    /// First L1 block to scan for enqueued transactions.
    pub start_block: u64,
    pub start_queue_index: u64,
    pub logs_range: u64,
    pub max_relay_attempts: u32,
}

impl Default for L1SyncConfig {
    fn default() -> Self {
        L1SyncConfig {
            enabled: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            start_block: 0,
            start_queue_index: 0,
            logs_range: DEFAULT_LOGS_RANGE,
            max_relay_attempts: DEFAULT_MAX_RELAY_ATTEMPTS,
        }
    }
}

impl L1SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub start_batch: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            enabled: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            start_batch: 0,
        }
    }
}

impl VerifierConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthCheckConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub divergence_cooldown_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        HealthCheckConfig {
            enabled: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            divergence_cooldown_secs: DEFAULT_DIVERGENCE_COOLDOWN_SECS,
        }
    }
}

impl HealthCheckConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn divergence_cooldown(&self) -> Duration {
        Duration::from_secs(self.divergence_cooldown_secs)
    }
}

impl Config {
    /// Validate once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_config!(
            self.queue.retry_base_ms > 0 && self.queue.retry_base_ms <= self.queue.retry_max_ms,
            "queue.retry_base_ms must be in 1..=retry_max_ms"
        );

        let submitter = &self.batch_submitter;
        if submitter.enabled {
            ensure_config!(
                submitter.poll_interval_ms > 0,
                "batch_submitter.poll_interval_ms must be positive"
            );
            ensure_config!(
                submitter.min_batch_size > 0 && submitter.min_batch_size <= submitter.max_batch_size,
                "batch_submitter.min_batch_size must be in 1..=max_batch_size"
            );
            ensure_config!(
                submitter.max_batch_size <= MAX_U24,
                "batch_submitter.max_batch_size exceeds {}",
                MAX_U24
            );
            ensure_config!(
                !self.l1.rpc_url.is_empty() && !self.l2.rpc_url.is_empty(),
                "batch_submitter requires l1.rpc_url and l2.rpc_url"
            );
            ensure_config!(
                !self.l1.canonical_chain_address.is_zero(),
                "batch_submitter requires l1.canonical_chain_address"
            );
        }
        if submitter.enabled || self.l1_sync.enabled {
            ensure_config!(self.l1.confirmations > 0, "l1.confirmations must be positive");
            ensure_config!(
                self.l1.poll_tx_interval_ms > 0,
                "l1.poll_tx_interval_ms must be positive"
            );
        }

        let sync = &self.l1_sync;
        if sync.enabled {
            ensure_config!(
                sync.poll_interval_ms > 0,
                "l1_sync.poll_interval_ms must be positive"
            );
            ensure_config!(sync.logs_range > 0, "l1_sync.logs_range must be positive");
            ensure_config!(
                sync.max_relay_attempts > 0,
                "l1_sync.max_relay_attempts must be positive"
            );
            ensure_config!(
                !self.l1.enqueue_address.is_zero(),
                "l1_sync requires l1.enqueue_address"
            );
        }

        if self.verifier.enabled {
            ensure_config!(
                self.verifier.poll_interval_ms > 0,
                "verifier.poll_interval_ms must be positive"
            );
            ensure_config!(
                !self.l2.replica_url.is_empty(),
                "verifier requires l2.replica_url"
            );
            ensure_config!(
                !self.l1.state_commitment_address.is_zero(),
                "verifier requires l1.state_commitment_address"
            );
        }

        if self.health_check.enabled {
            ensure_config!(
                self.health_check.poll_interval_ms > 0,
                "health_check.poll_interval_ms must be positive"
            );
            ensure_config!(
                !self.l2.rpc_url.is_empty() && !self.l2.replica_url.is_empty(),
                "health_check requires l2.rpc_url and l2.replica_url"
            );
        }

        Ok(())
    }
}
