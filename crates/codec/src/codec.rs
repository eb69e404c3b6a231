use std::borrow::Cow;

use relay_types::{
    batch::{Batch, BatchContext},
    RawTransaction,
};

use crate::compression::{deflate, inflate, MAX_INFLATED_SIZE};
use crate::error::CodecError;

const START_INDEX_WIDTH: usize = 5;
const TOTAL_ELEMENTS_WIDTH: usize = 3;
const CONTEXT_COUNT_WIDTH: usize = 3;
const NUM_ITEMS_WIDTH: usize = 3;
const TIMESTAMP_WIDTH: usize = 5;
const BLOCK_NUMBER_WIDTH: usize = 5;
const TX_LENGTH_WIDTH: usize = 3;

pub const HEADER_SIZE: usize = START_INDEX_WIDTH + TOTAL_ELEMENTS_WIDTH + CONTEXT_COUNT_WIDTH;
pub const CONTEXT_SIZE: usize =
    NUM_ITEMS_WIDTH * 2 + TIMESTAMP_WIDTH + BLOCK_NUMBER_WIDTH;

/// Timestamp of the sentinel context of a zlib compressed batch.
const ZLIB_TAG: u64 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchType {
    /// Plain layout, no sentinel.
    Legacy,
    /// Sentinel context followed by a zlib stream.
    Zlib,
}

fn put_uint(
    buf: &mut Vec<u8>,
    field: &'static str,
    value: u64,
    width: usize,
) -> Result<(), CodecError> {
    if value >> (width * 8) != 0 {
        return Err(CodecError::FieldOverflow {
            field,
            value,
            width,
        });
    }
    buf.extend_from_slice(&value.to_be_bytes()[8 - width..]);
    Ok(())
}

fn put_context(buf: &mut Vec<u8>, context: &BatchContext) -> Result<(), CodecError> {
    put_uint(buf, "sequenced count", context.num_sequenced, NUM_ITEMS_WIDTH)?;
    put_uint(buf, "queued count", context.num_queued, NUM_ITEMS_WIDTH)?;
    put_uint(buf, "timestamp", context.timestamp, TIMESTAMP_WIDTH)?;
    put_uint(buf, "block number", context.block_number, BLOCK_NUMBER_WIDTH)?;
    Ok(())
}

/// Encode `batch`. The codec does not check that contexts and transactions
/// agree, see [`Batch::validate`].
pub fn encode(batch: &Batch, batch_type: BatchType) -> Result<Vec<u8>, CodecError> {
    let tx_bytes: usize = batch
        .transactions
        .iter()
        .map(|tx| TX_LENGTH_WIDTH + tx.len())
        .sum();
    let mut buf = Vec::with_capacity(HEADER_SIZE + CONTEXT_SIZE * (batch.contexts.len() + 1));

    put_uint(
        &mut buf,
        "start index",
        batch.should_start_at_element,
        START_INDEX_WIDTH,
    )?;
    put_uint(
        &mut buf,
        "total elements",
        batch.total_elements_to_append,
        TOTAL_ELEMENTS_WIDTH,
    )?;

    let sentinel = match batch_type {
        BatchType::Legacy => {
            if matches!(batch.contexts.first(), Some(c) if c.block_number == 0) {
                return Err(CodecError::AmbiguousSentinel);
            }
            None
        }
        BatchType::Zlib => Some(BatchContext {
            timestamp: ZLIB_TAG,
            ..Default::default()
        }),
    };
    let context_count = batch.contexts.len() as u64 + sentinel.is_some() as u64;
    put_uint(&mut buf, "context count", context_count, CONTEXT_COUNT_WIDTH)?;
    if let Some(ref sentinel) = sentinel {
        put_context(&mut buf, sentinel)?;
    }

    let mut body = Vec::with_capacity(CONTEXT_SIZE * batch.contexts.len() + tx_bytes);
    for context in &batch.contexts {
        put_context(&mut body, context)?;
    }
    for tx in &batch.transactions {
        put_uint(&mut body, "transaction length", tx.len() as u64, TX_LENGTH_WIDTH)?;
        body.extend_from_slice(tx.as_bytes());
    }

    match batch_type {
        BatchType::Legacy => buf.extend_from_slice(&body),
        BatchType::Zlib => {
            // a body the decoder would refuse to inflate
            if body.len() > MAX_INFLATED_SIZE {
                return Err(CodecError::PayloadTooLarge {
                    size: body.len(),
                    limit: MAX_INFLATED_SIZE,
                });
            }
            buf.extend_from_slice(&deflate(&body)?)
        }
    }
    Ok(buf)
}

#[derive(Clone)]
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::malformed(format!(
                "{} needs {} bytes at offset {}, {} left",
                what,
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_uint(&mut self, width: usize, what: &str) -> Result<u64, CodecError> {
        let bytes = self.read_bytes(width, what)?;
        let mut buf = [0u8; 8];
        buf[8 - width..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    fn read_context(&mut self) -> Result<BatchContext, CodecError> {
        Ok(BatchContext {
            num_sequenced: self.read_uint(NUM_ITEMS_WIDTH, "sequenced count")?,
            num_queued: self.read_uint(NUM_ITEMS_WIDTH, "queued count")?,
            timestamp: self.read_uint(TIMESTAMP_WIDTH, "timestamp")?,
            block_number: self.read_uint(BLOCK_NUMBER_WIDTH, "block number")?,
        })
    }
}

pub fn decode(data: &[u8]) -> Result<Batch, CodecError> {
    if data.len() < HEADER_SIZE {
        return Err(CodecError::malformed(format!(
            "{} bytes is shorter than the {} byte header",
            data.len(),
            HEADER_SIZE
        )));
    }
    let mut reader = Reader::new(data);
    let should_start_at_element = reader.read_uint(START_INDEX_WIDTH, "start index")?;
    let total_elements_to_append = reader.read_uint(TOTAL_ELEMENTS_WIDTH, "total elements")?;
    let mut context_count = reader.read_uint(CONTEXT_COUNT_WIDTH, "context count")?;

    let mut sentinel_reader = reader.clone();
    let body: Cow<'_, [u8]> = if context_count > 0 {
        let first = sentinel_reader.read_context()?;
        if first.block_number == 0 {
            if first.timestamp != ZLIB_TAG {
                return Err(CodecError::malformed(format!(
                    "unknown batch type {}",
                    first.timestamp
                )));
            }
            context_count -= 1;
            Cow::Owned(inflate(sentinel_reader.rest())?)
        } else {
            Cow::Borrowed(reader.rest())
        }
    } else {
        Cow::Borrowed(reader.rest())
    };

    let mut reader = Reader::new(&body);
    let capacity = std::cmp::min(context_count as usize, reader.remaining() / CONTEXT_SIZE);
    let mut contexts = Vec::with_capacity(capacity);
    for _ in 0..context_count {
        contexts.push(reader.read_context()?);
    }

    let mut transactions = Vec::new();
    while reader.remaining() > 0 {
        let len = reader.read_uint(TX_LENGTH_WIDTH, "transaction length")? as usize;
        let raw = reader.read_bytes(len, "transaction")?;
        transactions.push(RawTransaction::from(raw));
    }

    Ok(Batch {
        should_start_at_element,
        total_elements_to_append,
        contexts,
        transactions,
    })
}
