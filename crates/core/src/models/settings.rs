//! Per-guild settings

use serde::{Deserialize, Serialize};

use super::GuildId;

/// Hours of inactivity before the sweeper warns an open ticket
pub const DEFAULT_AUTO_CLOSE_HOURS: i64 = 48;

/// Tickets a single user may open per rolling hour
pub const DEFAULT_TICKETS_PER_HOUR: u32 = 1;

/// Settings for one guild. Absent rows read back as defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub guild_id: GuildId,
    pub language: String,
    pub auto_close_hours: i64,
    pub tickets_per_hour: u32,
}

impl GuildSettings {
    pub fn defaults_for(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            language: "en".to_string(),
            auto_close_hours: DEFAULT_AUTO_CLOSE_HOURS,
            tickets_per_hour: DEFAULT_TICKETS_PER_HOUR,
        }
    }
}
