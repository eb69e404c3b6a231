use std::{fmt, str::FromStr};

use bytes::Bytes;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FromHexError {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid length, expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn strip_prefix(s: &str) -> Result<&str, FromHexError> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(FromHexError::MissingPrefix)
}

macro_rules! impl_fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn zero() -> Self {
                $name([0u8; $len])
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            pub fn from_slice(s: &[u8]) -> Result<Self, FromHexError> {
                if s.len() != $len {
                    return Err(FromHexError::InvalidLength {
                        expected: $len,
                        actual: s.len(),
                    });
                }
                let mut inner = [0u8; $len];
                inner.copy_from_slice(s);
                Ok($name(inner))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(inner: [u8; $len]) -> Self {
                $name(inner)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(h: $name) -> Self {
                h.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut inner = [0u8; $len];
                let s = strip_prefix(s)?;
                if s.len() != $len * 2 {
                    return Err(FromHexError::InvalidLength {
                        expected: $len,
                        actual: s.len() / 2,
                    });
                }
                hex::decode_to_slice(s, &mut inner)?;
                Ok($name(inner))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

impl_fixed_bytes!(H256, 32);
impl_fixed_bytes!(Address, 20);

/// Opaque signed transaction bytes as carried inside a batch.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawTransaction(Bytes);

impl RawTransaction {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        RawTransaction(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RawTransaction {
    fn from(v: Vec<u8>) -> Self {
        RawTransaction(v.into())
    }
}

impl From<&[u8]> for RawTransaction {
    fn from(v: &[u8]) -> Self {
        RawTransaction(Bytes::copy_from_slice(v))
    }
}

impl fmt::Display for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for RawTransaction {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RawTransaction(hex::decode(strip_prefix(s)?)?.into()))
    }
}

impl Serialize for RawTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RawTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
