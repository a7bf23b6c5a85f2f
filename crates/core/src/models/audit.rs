//! Ticket audit trail models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Actions recorded against a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketAction {
    Created,
    Assigned,
    Closed,
    Warned,
}

impl TicketAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketAction::Created => "created",
            TicketAction::Assigned => "assigned",
            TicketAction::Closed => "closed",
            TicketAction::Warned => "warned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(TicketAction::Created),
            "assigned" => Some(TicketAction::Assigned),
            "closed" => Some(TicketAction::Closed),
            "warned" => Some(TicketAction::Warned),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit log row. `performed_by` is None for system actions
/// (the inactivity sweeper).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLogEntry {
    pub id: i64,
    pub ticket_id: i64,
    pub action: TicketAction,
    pub performed_by: Option<UserId>,
    pub timestamp: DateTime<Utc>,
}
