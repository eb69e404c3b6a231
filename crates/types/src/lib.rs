//! Domain types shared by every relay component.
//!
//! Byte-like values (`H256`, `Address`, `RawTransaction`) serialize as
//! `0x`-prefixed lowercase hex strings.

mod fixed_bytes;

pub mod batch;
pub mod chain;
pub mod queue;
pub mod submission;
pub mod verifier;

pub use bytes;
pub use fixed_bytes::{Address, FromHexError, H256, RawTransaction};
