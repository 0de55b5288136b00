//! Value definitions
//!
//! The closed set of scalar types a caller can put on the wire.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{HsError, Result};

/// A scalar argument for a command field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The protocol's explicit null, written as the single marker byte
    Null,

    /// Raw bytes, escaped byte by byte
    Bytes(Bytes),

    /// UTF-8 text, escaped as its bytes
    Text(String),

    /// Integer, written as decimal ASCII
    Int(i64),
}

impl Value {
    /// Build a value from a CLI style argument.
    ///
    /// - `\N` is null
    /// - `int:<decimal>` is an integer
    /// - `hex:<digits>` is raw bytes
    /// - `text:<anything>` is text, for text that would otherwise look tagged
    /// - anything else is taken as text verbatim
    pub fn parse_tagged(arg: &str) -> Result<Self> {
        if arg == "\\N" {
            return Ok(Value::Null);
        }
        if let Some(digits) = arg.strip_prefix("int:") {
            return digits.trim().parse::<i64>().map(Value::Int).map_err(|e| {
                HsError::Encoding(format!("invalid integer {:?}: {}", digits, e))
            });
        }
        if let Some(hex) = arg.strip_prefix("hex:") {
            return decode_hex(hex).map(|b| Value::Bytes(Bytes::from(b)));
        }
        if let Some(text) = arg.strip_prefix("text:") {
            return Ok(Value::Text(text.to_string()));
        }
        Ok(Value::Text(arg.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(HsError::Encoding(format!(
            "hex value has odd length {}",
            hex.len()
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| HsError::Encoding(format!("invalid hex digits in {:?}", hex)))
        })
        .collect()
}

impl FromStr for Value {
    type Err = HsError;

    fn from_str(s: &str) -> Result<Self> {
        Value::parse_tagged(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("\\N"),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Int(i as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u16, u32);

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        // Counts on the wire never come close to i64::MAX
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
