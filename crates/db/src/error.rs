use thiserror::Error;

/// DB Error
#[derive(Error, Debug, Clone)]
#[error("DB error {message}")]
pub struct Error {
    pub message: String,
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error { message: msg }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error {
            message: msg.to_string(),
        }
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error {
            message: err.into_string(),
        }
    }
}
