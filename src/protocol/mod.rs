//! Protocol Module
//!
//! Line-oriented, byte-stuffed wire format for the HandlerSocket protocol.
//!
//! ## Line Format
//! ```text
//! ┌─────────┬──────┬─────────┬──────┬─────┬─────────┬──────┐
//! │ Field 0 │ 0x09 │ Field 1 │ 0x09 │ ... │ Field N │ 0x0A │
//! └─────────┴──────┴─────────┴──────┴─────┴─────────┴──────┘
//! ```
//!
//! ### Byte Roles
//! - 0x00: null marker (a whole field on its own)
//! - 0x01: escape introducer, followed by one byte in 0x40..=0x4F
//! - 0x09: field separator
//! - 0x0A: line terminator
//! - 0x10..=0xFF: literal field bytes
//!
//! Bytes 0x00..=0x0F inside a field are written as `0x01, byte + 0x40`.
//!
//! ### Response Format
//! ```text
//! status \t count [\t payload ...] \n
//! ```
//! A status of `0` is success; otherwise the third field, when present, is
//! the error message.
//!
//! Requests may be pipelined. Responses carry no identifiers and come back in
//! the order the requests were sent.

mod command;
mod decoder;
mod encoder;
mod field;
mod response;
mod value;

pub use command::{Command, CommandType, FIND_IN_OP};
pub use decoder::{decode_line, step, DecoderState, LineDecoder, Step};
pub use encoder::{encode_fields, put_escaped, put_fields, put_value, write_fields};
pub use field::{Field, Line};
pub use response::{validate_response, Response, STATUS_OK};
pub use value::Value;

// =============================================================================
// Byte Constants
// =============================================================================

/// Null field marker
pub const NULL_MARKER: u8 = 0x00;

/// Escape introducer
pub const ESCAPE: u8 = 0x01;

/// Field and segment separator
pub const SEPARATOR: u8 = 0x09;

/// Line terminator
pub const TERMINATOR: u8 = 0x0A;

/// Added to a low byte when it is escaped
pub const ESCAPE_OFFSET: u8 = 0x40;

/// Highest byte value that must be escaped
pub const MAX_ESCAPED_BYTE: u8 = 0x0F;

/// Byte written after the last field of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Terminator {
    /// More segments of the same command follow
    Separator = SEPARATOR,

    /// The command ends here
    LineEnd = TERMINATOR,
}

impl Terminator {
    pub fn byte(self) -> u8 {
        self as u8
    }
}
