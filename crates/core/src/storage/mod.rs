//! SQLite storage layer for Usher

mod audit;
mod migrations;
mod settings;
mod tickets;
mod traits;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;
use crate::models::{
    ChannelId, GuildId, GuildSettings, Priority, Ticket, TicketAction, TicketLogEntry,
    TicketStatus, UserId,
};

pub use audit::AuditStore;
pub use settings::SettingsStore;
pub use tickets::{StatusCounts, TicketStore};
pub use traits::{AuditRepository, SettingsRepository, Storage, TicketRepository};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get ticket store
    pub fn tickets(&self) -> TicketStore<'_> {
        TicketStore::new(&self.conn)
    }

    /// Get guild settings store
    pub fn settings(&self) -> SettingsStore<'_> {
        SettingsStore::new(&self.conn)
    }

    /// Get audit log store
    pub fn audit(&self) -> AuditStore<'_> {
        AuditStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl TicketRepository for Database {
    fn create_ticket(&self, user: UserId, channel: ChannelId, priority: Priority) -> Result<i64> {
        self.tickets().create(user, channel, priority)
    }

    fn find_ticket_by_channel(&self, channel: ChannelId) -> Result<Option<Ticket>> {
        self.tickets().find_by_channel(channel)
    }

    fn set_ticket_status(&self, channel: ChannelId, status: TicketStatus) -> Result<bool> {
        self.tickets().set_status(channel, status)
    }

    fn set_ticket_assignee(&self, channel: ChannelId, user: UserId) -> Result<bool> {
        self.tickets().set_assignee(channel, user)
    }

    fn touch_ticket_activity(&self, channel: ChannelId) -> Result<bool> {
        self.tickets().touch_activity(channel)
    }

    fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        self.tickets().list_by_status(status)
    }

    fn list_tickets_by_user(&self, user: UserId) -> Result<Vec<Ticket>> {
        self.tickets().list_by_user(user)
    }

    fn count_tickets_by_status(&self) -> Result<StatusCounts> {
        self.tickets().count_by_status()
    }

    fn list_inactive_open_tickets(&self, threshold_hours: i64) -> Result<Vec<ChannelId>> {
        self.tickets().list_inactive_open(threshold_hours)
    }

    fn count_tickets_created_since(&self, user: UserId, since: DateTime<Utc>) -> Result<u64> {
        self.tickets().count_created_since(user, since)
    }
}

impl SettingsRepository for Database {
    fn guild_settings(&self, guild: GuildId) -> Result<GuildSettings> {
        self.settings().get(guild)
    }

    fn save_guild_settings(&self, settings: &GuildSettings) -> Result<()> {
        self.settings().save(settings)
    }
}

impl AuditRepository for Database {
    fn record_ticket_action(
        &self,
        ticket_id: i64,
        action: TicketAction,
        performed_by: Option<UserId>,
    ) -> Result<i64> {
        self.audit().record(ticket_id, action, performed_by)
    }

    fn list_ticket_actions(&self, ticket_id: i64) -> Result<Vec<TicketLogEntry>> {
        self.audit().list_for_ticket(ticket_id)
    }
}
