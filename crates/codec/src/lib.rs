//! Sequencer batch wire format.
//!
//! ```text
//! header  = [start index: 5][total elements: 3][context count: 3]
//! context = [sequenced: 3][queued: 3][timestamp: 5][block number: 5]
//! tx      = [length: 3][raw bytes]
//! ```
//!
//! All integers are big endian. A compressed batch starts with a sentinel
//! context whose block number is 0 and whose timestamp tags the compression
//! type; every byte after the sentinel is compressed.

pub mod builder;
mod codec;
mod compression;
mod error;

pub use codec::{decode, encode, BatchType, CONTEXT_SIZE, HEADER_SIZE};
pub use compression::MAX_INFLATED_SIZE;
pub use error::CodecError;
