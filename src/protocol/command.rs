//! Command definitions
//!
//! Fixed field layouts for the requests a client sends. Each command is a
//! sequence of segments written with the field encoder; only the last
//! non-empty segment carries the line terminator.

use bytes::{BufMut, Bytes, BytesMut};

use super::{put_fields, Terminator, Value};

/// Operator used by `FindIn`, the only one the server accepts with `@`
pub const FIND_IN_OP: &str = "=";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Auth,
    OpenIndex,
    Find,
    FindMulti,
    FindIn,
    Insert,
    Raw,
}

/// A request to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with a shared secret
    Auth { secret: String },

    /// Bind index `id` to a table index and column list (comma separated)
    OpenIndex {
        id: u32,
        db: String,
        table: String,
        index: String,
        columns: String,
    },

    /// Look up rows by comparing `keys` with `op`
    Find { id: u32, op: String, keys: Vec<Value> },

    /// `Find` with a row limit and offset
    FindMulti {
        id: u32,
        op: String,
        keys: Vec<Value>,
        limit: u32,
        offset: u32,
    },

    /// Equality lookup where column `column` takes each of `values`
    FindIn {
        id: u32,
        keys: Vec<Value>,
        limit: u32,
        offset: u32,
        column: u32,
        values: Vec<Value>,
    },

    /// Insert one row
    Insert { id: u32, values: Vec<Value> },

    /// Any single line of fields
    Raw { values: Vec<Value> },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Auth { .. } => CommandType::Auth,
            Command::OpenIndex { .. } => CommandType::OpenIndex,
            Command::Find { .. } => CommandType::Find,
            Command::FindMulti { .. } => CommandType::FindMulti,
            Command::FindIn { .. } => CommandType::FindIn,
            Command::Insert { .. } => CommandType::Insert,
            Command::Raw { .. } => CommandType::Raw,
        }
    }

    fn segments(&self) -> Vec<Vec<Value>> {
        match self {
            Command::Auth { secret } => {
                vec![vec!["A".into(), "1".into(), secret.as_str().into()]]
            }
            Command::OpenIndex {
                id,
                db,
                table,
                index,
                columns,
            } => vec![vec![
                "P".into(),
                (*id).into(),
                db.as_str().into(),
                table.as_str().into(),
                index.as_str().into(),
                columns.as_str().into(),
            ]],
            Command::Find { id, op, keys } => vec![
                vec![(*id).into(), op.as_str().into(), keys.len().into()],
                keys.clone(),
            ],
            Command::FindMulti {
                id,
                op,
                keys,
                limit,
                offset,
            } => vec![
                vec![(*id).into(), op.as_str().into(), keys.len().into()],
                keys.clone(),
                vec![(*limit).into(), (*offset).into()],
            ],
            Command::FindIn {
                id,
                keys,
                limit,
                offset,
                column,
                values,
            } => vec![
                vec![(*id).into(), FIND_IN_OP.into(), keys.len().into()],
                keys.clone(),
                vec![
                    (*limit).into(),
                    (*offset).into(),
                    "@".into(),
                    (*column).into(),
                    values.len().into(),
                ],
                values.clone(),
            ],
            Command::Insert { id, values } => vec![
                vec![(*id).into(), "+".into(), values.len().into()],
                values.clone(),
            ],
            Command::Raw { values } => vec![values.clone()],
        }
    }

    /// Append the encoded command, terminator included
    pub fn put_into<B: BufMut>(&self, buf: &mut B) {
        let segments: Vec<Vec<Value>> = self
            .segments()
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            let end = if i == last {
                Terminator::LineEnd
            } else {
                Terminator::Separator
            };
            put_fields(buf, segment, end);
        }
    }

    /// Encode the command into a fresh buffer
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.put_into(&mut buf);
        buf.freeze()
    }
}
