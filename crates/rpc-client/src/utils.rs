use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_jsonrpc_client::Output;
use serde::de::DeserializeOwned;
use serde_json::from_value;

pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// convert json output to result
pub(crate) fn to_result<T: DeserializeOwned>(output: Output) -> Result<T> {
    match output {
        Output::Success(success) => Ok(from_value(success.result)?),
        Output::Failure(failure) => Err(anyhow!("JSONRPC error: {}", failure.error)),
    }
}

/// Parse an Ethereum JSON-RPC quantity such as `0x1a`.
pub(crate) fn parse_quantity(s: &str) -> Result<u128> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("quantity {} lacks 0x prefix", s))?;
    if digits.is_empty() {
        return Err(anyhow!("empty quantity"));
    }
    u128::from_str_radix(digits, 16).with_context(|| format!("parse quantity {}", s))
}

pub(crate) fn parse_quantity_u64(s: &str) -> Result<u64> {
    let value = parse_quantity(s)?;
    u64::try_from(value).map_err(|_| anyhow!("quantity {} overflows u64", s))
}

pub(crate) fn to_quantity(n: u64) -> String {
    format!("{:#x}", n)
}
