//! Adapter link error types

use std::io;

/// Adapter link result type
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter link errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Handshake rejected: {0}")]
    Rejected(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Adapter error: {0}")]
    Remote(String),
}
