//! Ticket audit log persistence

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::{TicketAction, TicketLogEntry, UserId};

pub struct AuditStore<'a> {
    conn: &'a Connection,
}

impl<'a> AuditStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append an action to the audit trail
    pub fn record(
        &self,
        ticket_id: i64,
        action: TicketAction,
        performed_by: Option<UserId>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO ticket_logs (ticket_id, action, performed_by, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                ticket_id,
                action.as_str(),
                performed_by.map(|u| u.as_i64()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All recorded actions for a ticket, oldest first
    pub fn list_for_ticket(&self, ticket_id: i64) -> Result<Vec<TicketLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, ticket_id, action, performed_by, timestamp
             FROM ticket_logs WHERE ticket_id = ?1 ORDER BY log_id",
        )?;

        let entries = stmt
            .query_map(params![ticket_id], |row| {
                Ok(TicketLogEntry {
                    id: row.get(0)?,
                    ticket_id: row.get(1)?,
                    action: TicketAction::parse(&row.get::<_, String>(2)?)
                        .unwrap_or(TicketAction::Created),
                    performed_by: row.get::<_, Option<i64>>(3)?.map(UserId::from_i64),
                    timestamp: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
