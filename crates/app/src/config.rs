//! Bot configuration
//!
//! Loaded from a TOML file under the platform config directory, or from the
//! path in `USHER_CONFIG`. The adapter token may be supplied via
//! `USHER_TOKEN` instead of the file.

use std::net::SocketAddr;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use usher_core::{ChannelId, Error, GuildId, Result, RoleId};

const DEFAULT_SWEEP_INTERVAL_HOURS: u64 = 24;
const DEFAULT_CLOSE_GRACE_SECS: u64 = 5;

/// Bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address of the platform adapter process
    pub adapter_addr: SocketAddr,

    /// Adapter authentication token
    #[serde(default)]
    pub token: String,

    /// The guild this bot serves
    pub guild: GuildId,

    /// Category tickets channels are created under. Left unset until an
    /// admin configures it; ticket creation fails cleanly without it.
    #[serde(default)]
    pub ticket_category: Option<ChannelId>,

    /// Role granting staff permissions
    #[serde(default)]
    pub staff_role: Option<RoleId>,

    /// Channel transcripts are delivered to on close; unset skips them
    #[serde(default)]
    pub transcript_channel: Option<ChannelId>,

    /// Hours between inactivity sweeps
    #[serde(default = "default_sweep_interval_hours")]
    pub sweep_interval_hours: u64,

    /// Seconds the closure confirmation stays visible before the channel
    /// is deleted
    #[serde(default = "default_close_grace_secs")]
    pub close_grace_secs: u64,
}

fn default_sweep_interval_hours() -> u64 {
    DEFAULT_SWEEP_INTERVAL_HOURS
}

fn default_close_grace_secs() -> u64 {
    DEFAULT_CLOSE_GRACE_SECS
}

impl Config {
    /// Load configuration from the default location (or `USHER_CONFIG`)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Cannot read config {}: {}", path.display(), e))
        })?;

        let mut config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Configuration(format!("Invalid config: {}", e)))?;

        // Environment override keeps the token out of the file
        if let Ok(token) = std::env::var("USHER_TOKEN") {
            config.token = token;
        }

        if config.token.is_empty() {
            return Err(Error::Configuration(
                "No adapter token (set `token` in the config or USHER_TOKEN)".to_string(),
            ));
        }

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("USHER_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("dev", "usher", "usher").ok_or_else(|| {
            Error::Configuration("Could not determine config directory".to_string())
        })?;

        Ok(dirs.config_dir().join("usher.toml"))
    }

    /// Directory the database lives in
    pub fn data_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "usher", "usher")
            .ok_or_else(|| Error::Configuration("Could not determine data directory".to_string()))?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
