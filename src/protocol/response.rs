//! Response validation
//!
//! Splits a decoded line into status, count and payload.

use crate::error::{HsError, Result};
use super::Field;

/// Status code the server sends on success
pub const STATUS_OK: &str = "0";

/// A successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The field after the status; its meaning depends on the command
    pub count: Field,

    /// Everything after the count field
    pub payload: Vec<Field>,
}

impl Response {
    /// Validate a decoded line.
    ///
    /// Fails with `MalformedResponse` for fewer than two fields and with
    /// `Server` when the status is anything but `"0"`.
    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        if fields.len() < 2 {
            return Err(HsError::MalformedResponse {
                fields: fields.len(),
            });
        }

        let mut fields = fields.into_iter();
        let status = fields.next().unwrap_or_else(Field::empty);
        let count = fields.next().unwrap_or_else(Field::empty);

        if status != STATUS_OK {
            let message = fields.next().map(|f| f.to_string());
            return Err(HsError::server(status.to_string(), message));
        }

        Ok(Self {
            count,
            payload: fields.collect(),
        })
    }

    /// The count field read as a decimal number
    pub fn column_count(&self) -> Option<usize> {
        self.count.as_str().and_then(|s| s.parse().ok())
    }

    /// Payload split into rows of `column_count()` fields.
    ///
    /// With no usable column count the whole payload is one row.
    pub fn rows(&self) -> Vec<&[Field]> {
        if self.payload.is_empty() {
            return Vec::new();
        }
        match self.column_count() {
            Some(n) if n > 0 => self.payload.chunks(n).collect(),
            _ => vec![&self.payload[..]],
        }
    }

    pub fn into_payload(self) -> Vec<Field> {
        self.payload
    }
}

/// Validate a decoded line and return only its payload fields
pub fn validate_response(fields: Vec<Field>) -> Result<Vec<Field>> {
    Response::from_fields(fields).map(Response::into_payload)
}
