//! Error types for the HandlerSocket client
//!
//! Provides a unified error type for all codec and client operations.

use thiserror::Error;

use crate::protocol::DecoderState;

/// Result type alias using HsError
pub type Result<T> = std::result::Result<T, HsError>;

/// Unified error type for HandlerSocket operations
#[derive(Debug, Error)]
pub enum HsError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Underlying I/O failure, including end-of-stream before a line terminator
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("illegal byte 0x{byte:02x} in state {state}")]
    Decode { byte: u8, state: DecoderState },

    // -------------------------------------------------------------------------
    // Response Errors
    // -------------------------------------------------------------------------
    #[error("{}", server_error_message(.code, .message))]
    Server {
        code: String,
        message: Option<String>,
    },

    #[error("response of insufficient length: {fields} field(s)")]
    MalformedResponse { fields: usize },

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("connection is desynchronized and must be reopened")]
    Desynchronized,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn server_error_message(code: &str, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("HandlerSocket error {}: {}", code, message),
        None => format!("HandlerSocket error {}", code),
    }
}

impl HsError {
    /// Create an error for a server-reported status
    pub fn server(code: impl Into<String>, message: Option<String>) -> Self {
        Self::Server {
            code: code.into(),
            message,
        }
    }

    /// True when the byte stream is still aligned after this error.
    ///
    /// Only a server-reported status leaves the connection usable; every other
    /// fault means the connection has to be closed and rebuilt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HsError::Server { .. })
    }

    /// True for an end-of-stream reached before a line terminator
    pub fn is_eof(&self) -> bool {
        matches!(self, HsError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
