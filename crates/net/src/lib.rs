//! Usher adapter link
//!
//! Wire protocol and TCP client for the external platform adapter: the
//! process that owns the actual chat-platform connection and renders
//! widgets. Messages are JSON, length-prefixed, over one TCP stream.

pub mod client;
pub mod error;
pub mod frame;
pub mod protocol;

pub use client::AdapterClient;
pub use error::{Error, Result};
pub use protocol::{Control, Embed, EmbedField, Event, HistoryEntry, Message, Request, Response};
