//! Storage repository traits
//!
//! These traits define the storage interface, allowing callers (the desk,
//! the sweeper) to be exercised against mocks as well as SQLite.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    ChannelId, GuildId, GuildSettings, Priority, Ticket, TicketAction, TicketLogEntry,
    TicketStatus, UserId,
};
use crate::storage::StatusCounts;

/// Ticket repository operations
pub trait TicketRepository {
    /// Insert a new open ticket, returning its id
    fn create_ticket(&self, user: UserId, channel: ChannelId, priority: Priority) -> Result<i64>;

    /// Get the ticket for a channel
    fn find_ticket_by_channel(&self, channel: ChannelId) -> Result<Option<Ticket>>;

    /// Update status by channel key; false when the channel is unknown
    fn set_ticket_status(&self, channel: ChannelId, status: TicketStatus) -> Result<bool>;

    /// Set the assigned staff member; false when the channel is unknown
    fn set_ticket_assignee(&self, channel: ChannelId, user: UserId) -> Result<bool>;

    /// Bump last activity; false when the channel is unknown
    fn touch_ticket_activity(&self, channel: ChannelId) -> Result<bool>;

    /// List tickets with the given status
    fn list_tickets_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>>;

    /// List tickets opened by a user
    fn list_tickets_by_user(&self, user: UserId) -> Result<Vec<Ticket>>;

    /// Count tickets per status
    fn count_tickets_by_status(&self) -> Result<StatusCounts>;

    /// Channels of open tickets idle longer than the threshold
    fn list_inactive_open_tickets(&self, threshold_hours: i64) -> Result<Vec<ChannelId>>;

    /// Tickets opened by a user since the given instant
    fn count_tickets_created_since(&self, user: UserId, since: DateTime<Utc>) -> Result<u64>;
}

/// Guild settings repository operations
pub trait SettingsRepository {
    /// Load settings, falling back to defaults for unknown guilds
    fn guild_settings(&self, guild: GuildId) -> Result<GuildSettings>;

    /// Insert or replace settings
    fn save_guild_settings(&self, settings: &GuildSettings) -> Result<()>;
}

/// Audit log repository operations
pub trait AuditRepository {
    /// Append an action to the audit trail
    fn record_ticket_action(
        &self,
        ticket_id: i64,
        action: TicketAction,
        performed_by: Option<UserId>,
    ) -> Result<i64>;

    /// All recorded actions for a ticket
    fn list_ticket_actions(&self, ticket_id: i64) -> Result<Vec<TicketLogEntry>>;
}

/// Combined storage interface
pub trait Storage: TicketRepository + SettingsRepository + AuditRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: TicketRepository + SettingsRepository + AuditRepository {}
