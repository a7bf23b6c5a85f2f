//! Usher Core Library
//!
//! Ticket models, the permission matrix, and SQLite storage for the Usher
//! support-ticket bot.

pub mod error;
pub mod models;
pub mod permissions;
pub mod storage;

pub use error::{Error, Result};
pub use models::*;
pub use permissions::*;
pub use storage::{
    AuditRepository, AuditStore, Database, SettingsRepository, SettingsStore, StatusCounts,
    Storage, TicketRepository, TicketStore,
};
