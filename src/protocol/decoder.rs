//! Line decoder
//!
//! A byte-at-a-time state machine that turns one terminated line into its
//! fields, undoing the escaping applied by the encoder.
//!
//! ## States
//! ```text
//!                 0x00                      0x09 / 0x0A
//!   START_FIELD ───────> NULL_PENDING ───────────────> emit null
//!      │  │ 0x09 ─> emit empty
//!      │  │ 0x01
//!      │  └────────> ESCAPE_PENDING ──0x40..=0x4F──> IN_FIELD
//!      │ literal                                       │ 0x09 / 0x0A
//!      └──────────────────────────────> IN_FIELD ──────┴──> emit field
//! ```
//! A terminator ends the line. Any byte without a transition is a fault and
//! the stream position is undefined afterwards.

use std::fmt;
use std::io::{self, BufRead};

use bytes::{BufMut, BytesMut};

use crate::error::{HsError, Result};
use super::{
    Field, Line, ESCAPE, ESCAPE_OFFSET, MAX_ESCAPED_BYTE, NULL_MARKER, SEPARATOR, TERMINATOR,
};

/// Decoder position within the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Nothing decoded for the current field yet
    #[default]
    StartField,

    /// At least one byte of the current field decoded
    InField,

    /// Escape introducer consumed, waiting for its payload byte
    EscapePending,

    /// Null marker consumed, waiting for a delimiter
    NullPending,
}

impl DecoderState {
    pub fn name(&self) -> &'static str {
        match self {
            DecoderState::StartField => "START_FIELD",
            DecoderState::InField => "IN_FIELD",
            DecoderState::EscapePending => "ESCAPE_PENDING",
            DecoderState::NullPending => "NULL_PENDING",
        }
    }
}

impl fmt::Display for DecoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of feeding one byte to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep reading in the given state
    Next(DecoderState),

    /// A field ended at a separator; decoding resumes in `StartField`
    Field(Field),

    /// The last field of the line ended at the terminator
    LineEnd(Field),
}

/// Apply one transition.
///
/// `acc` holds the bytes of the field being decoded. It is drained whenever
/// a non-null field is emitted.
pub fn step(state: DecoderState, byte: u8, acc: &mut BytesMut) -> Result<Step> {
    use DecoderState::*;

    let step = match (state, byte) {
        (StartField, NULL_MARKER) => Step::Next(NullPending),
        (StartField, ESCAPE) => Step::Next(EscapePending),
        (StartField, SEPARATOR) => Step::Field(Field::empty()),
        (StartField | InField, b) if b > MAX_ESCAPED_BYTE => {
            acc.put_u8(b);
            Step::Next(InField)
        }

        (InField, ESCAPE) => Step::Next(EscapePending),
        (InField, SEPARATOR) => Step::Field(take_field(acc)),
        (InField, TERMINATOR) => Step::LineEnd(take_field(acc)),

        (EscapePending, b) if (ESCAPE_OFFSET..=ESCAPE_OFFSET + MAX_ESCAPED_BYTE).contains(&b) => {
            acc.put_u8(b - ESCAPE_OFFSET);
            Step::Next(InField)
        }

        (NullPending, SEPARATOR) => Step::Field(Field::Null),
        (NullPending, TERMINATOR) => Step::LineEnd(Field::Null),

        (state, byte) => return Err(HsError::Decode { byte, state }),
    };

    Ok(step)
}

fn take_field(acc: &mut BytesMut) -> Field {
    Field::Value(acc.split().freeze())
}

/// Incremental decoder for a single line
#[derive(Debug, Default)]
pub struct LineDecoder {
    state: DecoderState,
    acc: BytesMut,
    fields: Vec<Field>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Number of fields completed so far on the current line
    pub fn fields_decoded(&self) -> usize {
        self.fields.len()
    }

    /// Feed one byte, returning the line once its terminator is consumed.
    ///
    /// On a fault the decoder is reset; the caller must not continue reading
    /// the same stream.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>> {
        match step(self.state, byte, &mut self.acc) {
            Ok(Step::Next(next)) => {
                self.state = next;
                Ok(None)
            }
            Ok(Step::Field(field)) => {
                self.fields.push(field);
                self.state = DecoderState::StartField;
                Ok(None)
            }
            Ok(Step::LineEnd(field)) => {
                self.fields.push(field);
                self.state = DecoderState::StartField;
                Ok(Some(Line::new(std::mem::take(&mut self.fields))))
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Feed bytes until a line completes.
    ///
    /// Returns how many bytes were consumed; bytes after the terminator
    /// are left for the next line.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<(usize, Option<Line>)> {
        for (i, &byte) in chunk.iter().enumerate() {
            if let Some(line) = self.feed(byte)? {
                return Ok((i + 1, Some(line)));
            }
        }
        Ok((chunk.len(), None))
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::StartField;
        self.acc.clear();
        self.fields.clear();
    }
}

/// Read exactly one terminated line from `reader`.
///
/// Blocks until the terminator arrives. End of stream before that is an
/// `UnexpectedEof` I/O error.
pub fn decode_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<Line> {
    let mut decoder = LineDecoder::new();

    loop {
        let (consumed, line) = {
            let chunk = match reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if chunk.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "stream ended in state {} after {} field(s)",
                        decoder.state(),
                        decoder.fields_decoded()
                    ),
                )
                .into());
            }

            decoder.decode(chunk)?
        };

        reader.consume(consumed);

        if let Some(line) = line {
            tracing::trace!("Decoded line with {} field(s)", line.len());
            return Ok(line);
        }
    }
}
