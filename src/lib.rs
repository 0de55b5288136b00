//! # handlersocket
//!
//! Client-side codec and blocking TCP client for the HandlerSocket
//! key-value protocol:
//! - Field encoder with byte stuffing for control bytes
//! - State-machine line decoder that keeps null and empty fields apart
//! - Response validation for server status codes
//! - Pipelined client with strict FIFO response ordering
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐                     ┌──────────────────┐
//! │  Command builder │                     │     Caller       │
//! └────────┬─────────┘                     └────────▲─────────┘
//!          │ values                                 │ payload fields
//!          ▼                                        │
//! ┌──────────────────┐                     ┌────────┴─────────┐
//! │  Field Encoder   │                     │ Response checks  │
//! └────────┬─────────┘                     └────────▲─────────┘
//!          │ bytes                                  │ fields
//!          ▼                                        │
//! ┌──────────────────┐      TCP stream     ┌────────┴─────────┐
//! │    BufWriter     │ ──────────────────> │   Line Decoder   │
//! └──────────────────┘   (via the server)  └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HsError, Result};
pub use config::ClientConfig;
pub use network::Client;
pub use protocol::{Command, Field, Line, Response, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
