//! Platform identifier newtypes
//!
//! The chat platform hands out u64 snowflakes for users, channels, roles,
//! and guilds. Wrapping them keeps the store and gateway signatures honest.
//! SQLite has no unsigned 64-bit column, so values round-trip through i64.

use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn as_i64(self) -> i64 {
                self.0 as i64
            }

            pub fn from_i64(value: i64) -> Self {
                Self(value as u64)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake_id!(
    /// A platform user
    UserId
);
snowflake_id!(
    /// A platform channel (ticket channels, the transcript channel, categories)
    ChannelId
);
snowflake_id!(
    /// A platform role (the staff role)
    RoleId
);
snowflake_id!(
    /// A platform guild/community
    GuildId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i64_roundtrip() {
        // Snowflakes above i64::MAX must survive the signed round-trip
        let id = ChannelId(u64::MAX - 7);
        assert_eq!(ChannelId::from_i64(id.as_i64()), id);
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId(42).to_string(), "42");
    }
}
