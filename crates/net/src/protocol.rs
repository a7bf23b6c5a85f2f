//! Adapter protocol message types
//!
//! The platform adapter is a separate process that owns the actual chat
//! client (gateway connection, widget rendering, API rate limiting). Usher
//! speaks to it over a TCP link: JSON-serialized, length-prefixed messages.
//!
//! Requests flow bot -> adapter and are answered by a `Response` carrying
//! the same `seq`. Events flow adapter -> bot unprompted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use usher_core::{ChannelId, RoleId, UserId};

/// One message from a channel's history, oldest-first in `Response::History`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub content: String,
}

/// An embed attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default)]
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Interactive controls the adapter renders under a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    OpenTicket,
    CloseTicket,
    AssignTicket,
}

/// Requests the bot sends to the adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Request {
    /// Create a channel under `category`, visible only to `allow_users`
    /// and `allow_roles`
    CreateChannel {
        category: ChannelId,
        name: String,
        allow_users: Vec<UserId>,
        allow_roles: Vec<RoleId>,
    },

    /// Send a message, optionally with an embed, controls, and a role mention
    SendMessage {
        channel: ChannelId,
        content: String,
        #[serde(default)]
        embed: Option<Embed>,
        #[serde(default)]
        controls: Vec<Control>,
        #[serde(default)]
        mention_role: Option<RoleId>,
    },

    /// Send a direct message to a user (failure replies to modal
    /// submissions, which have no channel)
    SendDirectMessage { user: UserId, content: String },

    /// Deliver a file attachment
    SendFile {
        channel: ChannelId,
        filename: String,
        contents: String,
    },

    /// Fetch the full message history of a channel
    FetchHistory { channel: ChannelId },

    /// Delete a channel
    DeleteChannel { channel: ChannelId },

    /// Count live channels under a category
    CountCategoryChannels { category: ChannelId },

    /// Does the user hold the given role?
    HasRole { user: UserId, role: RoleId },

    /// Does the user have administrator permissions?
    IsAdmin { user: UserId },
}

/// Responses the adapter sends back
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Response {
    ChannelCreated { channel: ChannelId },
    Ack,
    History { entries: Vec<HistoryEntry> },
    ChannelCount { count: u64 },
    RoleCheck { value: bool },
    Error { message: String },
}

/// Events the adapter pushes when users interact with the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    /// An admin invoked the panel command in a channel
    PanelRequested { channel: ChannelId, user: UserId },

    /// A user submitted the ticket-creation modal
    TicketSubmitted {
        user: UserId,
        subject: String,
        description: String,
        priority: String,
    },

    /// A user pressed one of the rendered controls
    ControlPressed {
        channel: ChannelId,
        user: UserId,
        control: Control,
    },

    /// A message was posted in a channel. Not emitted for the bot's own
    /// messages; this is the activity signal for the inactivity sweep.
    ChannelMessage { channel: ChannelId, user: UserId },

    /// A user invoked the stats command
    StatsRequested { channel: ChannelId, user: UserId },

    /// A user invoked the mytickets command
    MyTicketsRequested { channel: ChannelId, user: UserId },
}

/// Adapter link messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Bot authenticates with the adapter
    Hello { token: String },

    /// Adapter accepts the handshake
    HelloAccepted,

    /// Adapter rejects the handshake
    HelloRejected { reason: String },

    /// Bot request; the adapter answers with a `Response` of the same `seq`
    Request { seq: u64, request: Request },

    /// Adapter answer to a request
    Response { seq: u64, response: Response },

    /// Unprompted platform event
    Event { event: Event },

    /// Ping to keep connection alive
    Ping,

    /// Pong response to ping
    Pong,
}
