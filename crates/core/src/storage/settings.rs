//! Guild settings persistence

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::{GuildId, GuildSettings};

pub struct SettingsStore<'a> {
    conn: &'a Connection,
}

impl<'a> SettingsStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load settings for a guild; guilds without a row get the defaults.
    pub fn get(&self, guild_id: GuildId) -> Result<GuildSettings> {
        let result = self.conn.query_row(
            "SELECT language, auto_close_hours, tickets_per_hour
             FROM guild_settings WHERE guild_id = ?1",
            params![guild_id.as_i64()],
            |row| {
                Ok(GuildSettings {
                    guild_id,
                    language: row.get(0)?,
                    auto_close_hours: row.get(1)?,
                    tickets_per_hour: row.get::<_, i64>(2)? as u32,
                })
            },
        );

        match result {
            Ok(settings) => Ok(settings),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Ok(GuildSettings::defaults_for(guild_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace settings for a guild
    pub fn save(&self, settings: &GuildSettings) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO guild_settings
             (guild_id, language, auto_close_hours, tickets_per_hour)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                settings.guild_id.as_i64(),
                settings.language,
                settings.auto_close_hours,
                settings.tickets_per_hour as i64,
            ],
        )?;
        Ok(())
    }

    /// Adjust the inactivity threshold for a guild
    pub fn set_auto_close_hours(&self, guild_id: GuildId, hours: i64) -> Result<()> {
        let mut settings = self.get(guild_id)?;
        settings.auto_close_hours = hours;
        self.save(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_AUTO_CLOSE_HOURS, DEFAULT_TICKETS_PER_HOUR};
    use crate::storage::Database;

    #[test]
    fn test_missing_guild_reads_defaults() {
        let db = Database::open_in_memory().unwrap();
        let settings = db.settings().get(GuildId(1)).unwrap();

        assert_eq!(settings.language, "en");
        assert_eq!(settings.auto_close_hours, DEFAULT_AUTO_CLOSE_HOURS);
        assert_eq!(settings.tickets_per_hour, DEFAULT_TICKETS_PER_HOUR);
    }

    #[test]
    fn test_save_and_reload() {
        let db = Database::open_in_memory().unwrap();
        let mut settings = GuildSettings::defaults_for(GuildId(2));
        settings.language = "es".to_string();
        settings.tickets_per_hour = 3;
        db.settings().save(&settings).unwrap();

        let loaded = db.settings().get(GuildId(2)).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_set_auto_close_hours() {
        let db = Database::open_in_memory().unwrap();
        db.settings().set_auto_close_hours(GuildId(3), 12).unwrap();

        let loaded = db.settings().get(GuildId(3)).unwrap();
        assert_eq!(loaded.auto_close_hours, 12);
        // Untouched fields keep their defaults
        assert_eq!(loaded.tickets_per_hour, DEFAULT_TICKETS_PER_HOUR);
    }
}
