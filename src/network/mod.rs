//! Network Module
//!
//! Blocking TCP transport for the protocol codec.
//!
//! ## Model
//! - One socket per client, split into a buffered reader and writer
//! - Commands are buffered until `flush`, so several can be pipelined
//! - Responses are read back strictly in send order
//! - Any fault other than a server-reported status poisons the client

mod client;

pub use client::Client;
