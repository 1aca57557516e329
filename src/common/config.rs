//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment < CLI

use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::remote::{Credentials, Endpoint};

/// Fixed remote layout shared by every client of the same server.
pub const BASE_DIRECTORY: &str = "savestates";
/// Dolphin save-state slot 1 suffix.
pub const SLOT_SUFFIX: &str = ".s01";
pub const DEFAULT_PORT: u16 = 21;
/// Remote hosts can be slow to wake from sleep; give them two minutes.
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 120;

/// Built-in registry of supported games: title, Dolphin game id.
pub const KNOWN_GAMES: [(&str, &str); 1] = [("Legend of Zelda: Twilight Princess", "GZ2E01")];

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "savepass")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("savepass.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Ordered dial candidates, `host` or `host:port`.
    pub hosts: Vec<String>,
    /// Default port for hosts listed without one.
    pub port: u16,
    pub base_dir: String,
    pub dial_timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            port: DEFAULT_PORT,
            base_dir: BASE_DIRECTORY.to_string(),
            dial_timeout_secs: DEFAULT_DIAL_TIMEOUT_SECS,
        }
    }
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub username: String,
    pub password: String,
    pub game_id: String,
    pub channel: u32,
    /// Overrides OS-specific save-state directory discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    pub remote: RemoteSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            game_id: KNOWN_GAMES[0].1.to_string(),
            channel: 1,
            save_dir: None,
            remote: RemoteSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Ordered endpoint list; fails when no host is configured at all.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        ensure!(
            !self.remote.hosts.is_empty(),
            "No server hosts configured; run `savepass config set --host <host>`"
        );
        self.remote
            .hosts
            .iter()
            .map(|spec| {
                Endpoint::parse(spec, self.remote.port)
                    .with_context(|| format!("Invalid host entry in config: {spec:?}"))
            })
            .collect()
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.dial_timeout_secs)
    }

    /// Validates field shapes. Host presence is checked lazily by
    /// `endpoints()` so that `config set` still works on a fresh install.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.game_id.trim().is_empty(),
            "Invalid config: game_id must not be empty"
        );
        ensure!(
            !self.remote.base_dir.trim().is_empty(),
            "Invalid config: remote.base_dir must not be empty"
        );
        ensure!(
            self.remote.dial_timeout_secs >= 1,
            "Invalid config: remote.dial_timeout_secs must be >= 1"
        );
        for spec in &self.remote.hosts {
            ensure!(
                Endpoint::parse(spec, self.remote.port).is_some(),
                "Invalid config: bad host entry {spec:?}"
            );
        }
        Ok(())
    }
}

/// Runtime overrides from CLI flags, applied after all config layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub channel: Option<u32>,
    pub game: Option<String>,
}

/// Loads config from defaults/file/env.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();

    let config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("SAVEPASS_").split("__"))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}

/// Applies runtime overrides to a loaded config.
pub fn apply_overrides(mut config: AppConfig, overrides: &ConfigOverrides) -> AppConfig {
    if let Some(channel) = overrides.channel {
        config.channel = channel;
    }
    if let Some(game) = &overrides.game {
        config.game_id = resolve_game_id(game);
    }
    config
}

/// Persists the config back to the TOML file, creating parents as needed.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let rendered =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(&path, rendered)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Accepts either a known game title (case-insensitive) or a raw game id.
pub fn resolve_game_id(input: &str) -> String {
    for (title, id) in KNOWN_GAMES {
        if title.eq_ignore_ascii_case(input.trim()) {
            return id.to_string();
        }
    }
    input.trim().to_string()
}
