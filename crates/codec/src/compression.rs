use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::error::CodecError;

/// Largest zlib body the decoder inflates, 16 MiB. The encoder refuses to
/// compress anything larger.
pub const MAX_INFLATED_SIZE: usize = 16 * 1024 * 1024;

pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|err| CodecError::Compression(err.to_string()))?;
    encoder
        .finish()
        .map_err(|err| CodecError::Compression(err.to_string()))
}

pub(crate) fn inflate(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = ZlibDecoder::new(data).take(MAX_INFLATED_SIZE as u64 + 1);
    let mut buf = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|err| CodecError::Compression(err.to_string()))?;
    if buf.len() > MAX_INFLATED_SIZE {
        return Err(CodecError::PayloadTooLarge {
            size: buf.len(),
            limit: MAX_INFLATED_SIZE,
        });
    }
    Ok(buf)
}
