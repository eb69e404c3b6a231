/// Largest value a 3-byte wire field can carry.
pub const MAX_U24: u64 = (1 << 24) - 1;
/// Largest value a 5-byte wire field can carry.
pub const MAX_U40: u64 = (1 << 40) - 1;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_CONFIRMATIONS: u64 = 6;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POLL_TX_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_RETRY_BASE_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_MS: u64 = 32_000;
pub const DEFAULT_MIN_BATCH_SIZE: u64 = 1;
pub const DEFAULT_MAX_BATCH_SIZE: u64 = 500;
pub const DEFAULT_MAX_BATCH_AGE_SECS: u64 = 60;
pub const DEFAULT_MAX_GAS_PRICE_GWEI: u64 = 200;
pub const DEFAULT_LOGS_RANGE: u64 = 2_000;
pub const DEFAULT_MAX_RELAY_ATTEMPTS: u32 = 10;
pub const DEFAULT_DIVERGENCE_COOLDOWN_SECS: u64 = 300;
