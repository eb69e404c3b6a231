use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed batch: {0}")]
    MalformedBatch(String),
    #[error("{field} {value} does not fit in {width} bytes")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: usize,
    },
    #[error("first context has block number 0, which reads as a compression sentinel")]
    AmbiguousSentinel,
    #[error("payload of {size} bytes exceeds the {limit} byte compression limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("compression: {0}")]
    Compression(String),
}

impl CodecError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::MalformedBatch(msg.into())
    }
}
