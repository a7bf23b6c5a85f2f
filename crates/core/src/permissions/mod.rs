//! Permission matrix for desk operations

use serde::{Deserialize, Serialize};

/// Effective role of an actor, resolved by the app from platform role checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeskRole {
    /// Guild administrator
    Admin = 3,
    /// Holder of the configured staff role
    Staff = 2,
    /// Everyone else
    Member = 1,
}

impl DeskRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeskRole::Admin => "Administrator",
            DeskRole::Staff => "Staff",
            DeskRole::Member => "Member",
        }
    }
}

/// Actions that can be performed against the ticket desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskAction {
    // Setup
    PostPanel,

    // Requester-side
    OpenTicket,
    ListOwnTickets,

    // Staff-side
    AssignTicket,
    CloseTicket,
    ViewStats,
}

/// Permission matrix for desk roles
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if a role has permission to perform an action
    pub fn can_perform(role: DeskRole, action: DeskAction) -> bool {
        match action {
            // Panel setup - Admin only
            DeskAction::PostPanel => role == DeskRole::Admin,

            // Ticket management - Staff and above
            DeskAction::AssignTicket => role >= DeskRole::Staff,
            DeskAction::CloseTicket => role >= DeskRole::Staff,
            DeskAction::ViewStats => role >= DeskRole::Staff,

            // Self-service - anyone
            DeskAction::OpenTicket => role >= DeskRole::Member,
            DeskAction::ListOwnTickets => role >= DeskRole::Member,
        }
    }
}
