//! Client Connection
//!
//! Sends commands to a server and reads back their responses.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use bytes::BytesMut;

use crate::config::ClientConfig;
use crate::error::{HsError, Result};
use crate::protocol::{decode_line, Command, Field, Response, Value};

/// A single connection to a HandlerSocket server
///
/// Not safe to share between writers without external locking: command
/// bytes from two callers must not interleave.
pub struct Client {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered so commands can be pipelined)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Commands sent whose responses have not been read
    pending: usize,

    /// Set once the byte stream can no longer be trusted
    desynchronized: bool,

    /// Reused encode buffer
    scratch: BytesMut,
}

impl Client {
    /// Connect to the server named in `config`.
    ///
    /// If the config carries an auth secret the auth command is sent and its
    /// response checked before returning.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = open_stream(config)?;
        let mut client = Self::from_stream(stream, config)?;

        if let Some(secret) = &config.auth_secret {
            client.auth(secret)?;
            client.flush()?;
            client.response()?;
            tracing::debug!("Authenticated with {}", client.peer_addr);
        }

        Ok(client)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &ClientConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            pending: 0,
            desynchronized: false,
            scratch: BytesMut::new(),
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Buffer a command for sending
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.ensure_synchronized()?;

        self.scratch.clear();
        command.put_into(&mut self.scratch);
        if self.scratch.is_empty() {
            return Err(HsError::Encoding(format!(
                "{:?} command has no fields",
                command.command_type()
            )));
        }

        tracing::trace!(
            "Sending {:?} to {} ({} bytes)",
            command.command_type(),
            self.peer_addr,
            self.scratch.len()
        );

        let result = self.writer.write_all(&self.scratch).map_err(HsError::from);
        self.track(result)?;
        self.pending += 1;
        Ok(())
    }

    pub fn auth(&mut self, secret: &str) -> Result<()> {
        self.send(&Command::Auth {
            secret: secret.to_string(),
        })
    }

    /// Bind `id` to `db.table` using `index`, returning `columns`
    pub fn open_index(
        &mut self,
        id: u32,
        db: &str,
        table: &str,
        index: &str,
        columns: &[&str],
    ) -> Result<()> {
        self.send(&Command::OpenIndex {
            id,
            db: db.to_string(),
            table: table.to_string(),
            index: index.to_string(),
            columns: columns.join(","),
        })
    }

    pub fn find(&mut self, id: u32, op: &str, keys: Vec<Value>) -> Result<()> {
        self.send(&Command::Find {
            id,
            op: op.to_string(),
            keys,
        })
    }

    pub fn find_multi(
        &mut self,
        id: u32,
        op: &str,
        keys: Vec<Value>,
        limit: u32,
        offset: u32,
    ) -> Result<()> {
        self.send(&Command::FindMulti {
            id,
            op: op.to_string(),
            keys,
            limit,
            offset,
        })
    }

    /// Find rows whose `column` equals any of `values`
    pub fn find_in(
        &mut self,
        id: u32,
        keys: Vec<Value>,
        limit: u32,
        offset: u32,
        column: u32,
        values: Vec<Value>,
    ) -> Result<()> {
        self.send(&Command::FindIn {
            id,
            keys,
            limit,
            offset,
            column,
            values,
        })
    }

    pub fn insert(&mut self, id: u32, values: Vec<Value>) -> Result<()> {
        self.send(&Command::Insert { id, values })
    }

    /// Push buffered commands onto the socket
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_synchronized()?;
        let result = self.writer.flush().map_err(HsError::from);
        self.track(result)
    }

    // =========================================================================
    // Responses
    // =========================================================================

    /// Read the response to the oldest unanswered command
    pub fn read_response(&mut self) -> Result<Response> {
        self.ensure_synchronized()?;

        let result = decode_line(&mut self.reader)
            .and_then(|line| {
                self.pending = self.pending.saturating_sub(1);
                Response::from_fields(line.into_fields())
            });

        if let Err(HsError::Server { code, .. }) = &result {
            tracing::debug!("Server {} returned status {}", self.peer_addr, code);
        }
        self.track(result)
    }

    /// Read the next response and return its payload fields
    pub fn response(&mut self) -> Result<Vec<Field>> {
        self.read_response().map(Response::into_payload)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Number of commands sent whose responses have not been read
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Flush what is buffered and shut the socket down
    pub fn close(mut self) -> Result<()> {
        if !self.desynchronized {
            self.writer.flush()?;
        }
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("Closed connection to {}", self.peer_addr);
        Ok(())
    }

    fn ensure_synchronized(&self) -> Result<()> {
        if self.desynchronized {
            return Err(HsError::Desynchronized);
        }
        Ok(())
    }

    /// Poison the client on any error that leaves the stream misaligned
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !e.is_recoverable() {
                tracing::warn!("Connection to {} desynchronized: {}", self.peer_addr, e);
                self.desynchronized = true;
            }
        }
        result
    }
}

fn open_stream(config: &ClientConfig) -> Result<TcpStream> {
    let timeout = match config.connect_timeout() {
        Some(timeout) => timeout,
        None => return Ok(TcpStream::connect(config.addr.as_str())?),
    };

    let mut last_err = None;
    for addr in config.addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(e.into()),
        None => Err(HsError::Config(format!(
            "address {} did not resolve",
            config.addr
        ))),
    }
}
