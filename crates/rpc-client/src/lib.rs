//! Chain clients consumed by the relayer.
//!
//! The relay components only see the traits in [`traits`]; [`EthRpcClient`]
//! implements them over Ethereum style JSON-RPC.

pub mod confirm;
pub mod contract;
pub mod error;
pub mod eth_client;
mod eth_types;
pub mod traits;
mod utils;

pub use contract::ContractEvents;
pub use eth_client::EthRpcClient;
pub use traits::{EnqueueSource, L1Client, L2Client, StateBatchSource, StateRootProvider};
