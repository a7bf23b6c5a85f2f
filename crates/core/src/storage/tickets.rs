//! Ticket storage operations

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::{ChannelId, Priority, Ticket, TicketStatus, UserId};

/// Open/closed tallies for the stats command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub open: u64,
    pub closed: u64,
}

pub struct TicketStore<'a> {
    conn: &'a Connection,
}

impl<'a> TicketStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new open ticket and return its store-assigned id.
    ///
    /// `created_at` and `last_activity` start equal. The caller creates the
    /// platform channel before calling this, so a failed insert never leaves
    /// an orphan row behind.
    pub fn create(&self, user_id: UserId, channel_id: ChannelId, priority: Priority) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO tickets (user_id, channel_id, status, priority, created_at, last_activity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user_id.as_i64(),
                channel_id.as_i64(),
                TicketStatus::Open.as_str(),
                priority.as_str(),
                now,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get the ticket for a channel
    pub fn find_by_channel(&self, channel_id: ChannelId) -> Result<Option<Ticket>> {
        let mut stmt = self.conn.prepare(
            "SELECT ticket_id, user_id, channel_id, status, priority, assigned_to,
                    created_at, last_activity
             FROM tickets WHERE channel_id = ?1",
        )?;

        let ticket = stmt
            .query_row(params![channel_id.as_i64()], Self::map_ticket)
            .optional()?;

        Ok(ticket)
    }

    /// Update status by channel key. Returns false if no such channel.
    pub fn set_status(&self, channel_id: ChannelId, status: TicketStatus) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE tickets SET status = ?1 WHERE channel_id = ?2",
            params![status.as_str(), channel_id.as_i64()],
        )?;
        Ok(affected > 0)
    }

    /// Set (or reassign) the staff member handling a ticket.
    /// Returns false if no such channel.
    pub fn set_assignee(&self, channel_id: ChannelId, user_id: UserId) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE tickets SET assigned_to = ?1 WHERE channel_id = ?2",
            params![user_id.as_i64(), channel_id.as_i64()],
        )?;
        Ok(affected > 0)
    }

    /// Bump `last_activity` to now. Returns false if no such channel.
    pub fn touch_activity(&self, channel_id: ChannelId) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE tickets SET last_activity = ?1 WHERE channel_id = ?2",
            params![Utc::now().to_rfc3339(), channel_id.as_i64()],
        )?;
        Ok(affected > 0)
    }

    /// List tickets with the given status, oldest first
    pub fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        let mut stmt = self.conn.prepare(
            "SELECT ticket_id, user_id, channel_id, status, priority, assigned_to,
                    created_at, last_activity
             FROM tickets WHERE status = ?1 ORDER BY ticket_id",
        )?;

        let tickets = stmt
            .query_map(params![status.as_str()], Self::map_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// List all tickets opened by a user, oldest first
    pub fn list_by_user(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        let mut stmt = self.conn.prepare(
            "SELECT ticket_id, user_id, channel_id, status, priority, assigned_to,
                    created_at, last_activity
             FROM tickets WHERE user_id = ?1 ORDER BY ticket_id",
        )?;

        let tickets = stmt
            .query_map(params![user_id.as_i64()], Self::map_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Count tickets per status
    pub fn count_by_status(&self) -> Result<StatusCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM tickets GROUP BY status")?;

        let mut counts = StatusCounts::default();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            match TicketStatus::parse(&status) {
                Some(TicketStatus::Open) => counts.open = count as u64,
                Some(TicketStatus::Closed) => counts.closed = count as u64,
                None => {}
            }
        }

        Ok(counts)
    }

    /// Channels of open tickets idle for longer than `threshold_hours`
    pub fn list_inactive_open(&self, threshold_hours: i64) -> Result<Vec<ChannelId>> {
        let cutoff = Utc::now() - Duration::hours(threshold_hours);
        self.list_inactive_open_before(cutoff)
    }

    /// Channels of open tickets with `last_activity` strictly before `cutoff`.
    /// A ticket whose last activity equals the cutoff is NOT inactive.
    pub fn list_inactive_open_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<ChannelId>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_id FROM tickets
             WHERE status = ?1 AND last_activity < ?2
             ORDER BY last_activity",
        )?;

        let channels = stmt
            .query_map(
                params![TicketStatus::Open.as_str(), cutoff.to_rfc3339()],
                |row| Ok(ChannelId::from_i64(row.get(0)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(channels)
    }

    /// How many tickets a user has opened since `since` (rate limiting)
    pub fn count_created_since(&self, user_id: UserId, since: DateTime<Utc>) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE user_id = ?1 AND created_at >= ?2",
            params![user_id.as_i64(), since.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn map_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
        let created_at = parse_timestamp(&row.get::<_, String>(6)?);
        // Rows from the first-generation schema have no last_activity
        let last_activity = row
            .get::<_, Option<String>>(7)?
            .map(|s| parse_timestamp(&s))
            .unwrap_or(created_at);

        Ok(Ticket {
            id: row.get(0)?,
            user_id: UserId::from_i64(row.get(1)?),
            channel_id: ChannelId::from_i64(row.get(2)?),
            status: TicketStatus::parse(&row.get::<_, String>(3)?)
                .unwrap_or(TicketStatus::Open),
            priority: Priority::parse(&row.get::<_, String>(4)?),
            assigned_to: row.get::<_, Option<i64>>(5)?.map(UserId::from_i64),
            created_at,
            last_activity,
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

trait OptionalExt<T> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
