//! Decoded fields and lines

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

use super::Value;

/// One decoded field of a line
///
/// Null and empty are distinct: `Field::Null` came from the marker byte,
/// `Field::Value` with no bytes came from two adjacent delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Null,
    Value(Bytes),
}

impl Field {
    /// An empty (non-null) field
    pub fn empty() -> Self {
        Field::Value(Bytes::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Raw field bytes, `None` for null
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::Null => None,
            Field::Value(b) => Some(b),
        }
    }

    /// Field content as UTF-8, `None` for null or invalid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Field content with invalid UTF-8 replaced, `None` for null
    pub fn to_string_lossy(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }

    /// Turn a decoded field back into a value that encodes to the same bytes
    pub fn into_value(self) -> Value {
        match self {
            Field::Null => Value::Null,
            Field::Value(b) => Value::Bytes(b),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Value(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Field {
    fn from(b: Vec<u8>) -> Self {
        Field::Value(Bytes::from(b))
    }
}

impl PartialEq<str> for Field {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == Some(other.as_bytes())
    }
}

impl PartialEq<&str> for Field {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Null => f.write_str("\\N"),
            Field::Value(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// A fully decoded, terminated line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    fields: Vec<Field>,
}

impl Line {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

impl Deref for Line {
    type Target = [Field];

    fn deref(&self) -> &[Field] {
        &self.fields
    }
}

impl From<Vec<Field>> for Line {
    fn from(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

impl IntoIterator for Line {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
