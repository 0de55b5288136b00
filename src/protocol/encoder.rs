//! Field encoder
//!
//! Serializes values into escaped, separator-joined wire bytes.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use super::{Terminator, Value, ESCAPE, ESCAPE_OFFSET, MAX_ESCAPED_BYTE, NULL_MARKER, SEPARATOR};

/// Append `bytes` with every byte <= 0x0F escaped as `ESCAPE, byte + 0x40`
pub fn put_escaped<B: BufMut>(buf: &mut B, bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        // Copy the literal run in one go, then escape the byte that ended it
        let run = rest
            .iter()
            .position(|&b| b <= MAX_ESCAPED_BYTE)
            .unwrap_or(rest.len());
        buf.put_slice(&rest[..run]);

        if let Some(&low) = rest.get(run) {
            buf.put_u8(ESCAPE);
            buf.put_u8(low + ESCAPE_OFFSET);
            rest = &rest[run + 1..];
        } else {
            rest = &[];
        }
    }
}

/// Append a single encoded value (no delimiter)
pub fn put_value<B: BufMut>(buf: &mut B, value: &Value) {
    match value {
        Value::Null => buf.put_u8(NULL_MARKER),
        Value::Bytes(b) => put_escaped(buf, b),
        Value::Text(s) => put_escaped(buf, s.as_bytes()),
        Value::Int(i) => put_escaped(buf, i.to_string().as_bytes()),
    }
}

/// Append `values` joined by the separator, followed by `end`.
///
/// An empty list writes nothing at all, not even `end`.
pub fn put_fields<B: BufMut>(buf: &mut B, values: &[Value], end: Terminator) {
    let Some((last, init)) = values.split_last() else {
        return;
    };

    for value in init {
        put_value(buf, value);
        buf.put_u8(SEPARATOR);
    }
    put_value(buf, last);
    buf.put_u8(end.byte());
}

/// Encode `values` into a fresh buffer
pub fn encode_fields(values: &[Value], end: Terminator) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(values));
    put_fields(&mut buf, values, end);
    buf.freeze()
}

/// Encode `values` and write them to a stream.
///
/// The writer is not flushed so several commands can be pipelined. If the
/// write fails part way, the stream holds a partial command and must be
/// treated as desynchronized.
pub fn write_fields<W: Write>(writer: &mut W, values: &[Value], end: Terminator) -> Result<()> {
    let bytes = encode_fields(values, end);
    writer.write_all(&bytes)?;
    Ok(())
}

fn encoded_len_hint(values: &[Value]) -> usize {
    values
        .iter()
        .map(|v| match v {
            Value::Null => 1,
            Value::Bytes(b) => b.len(),
            Value::Text(s) => s.len(),
            Value::Int(_) => 20,
        })
        .sum::<usize>()
        + values.len()
}
