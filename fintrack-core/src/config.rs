//! Configuration management
//!
//! Settings live in `settings.json` inside the FinTrack directory:
//! ```json
//! {
//!   "server": { "host": "localhost", "port": 3000 },
//!   "network": { "readTimeoutMs": 10000, "maxReconnectAttempts": 3, "initialBackoffMs": 1000 }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    server: ServerSettings,
    #[serde(default)]
    network: NetworkSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    read_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_reconnect_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_backoff_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// FinTrack client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upper bound on waiting for one response line
    pub read_timeout: Duration,
    /// Connect attempts per reconnect cycle
    pub max_reconnect_attempts: u32,
    /// First backoff delay; doubles for every further attempt
    pub initial_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl Config {
    /// Load config from the FinTrack directory
    ///
    /// The server address can be overridden with FINTRACK_HOST and
    /// FINTRACK_PORT (for CI/testing).
    pub fn load(fintrack_dir: &Path) -> Result<Self> {
        let raw = read_settings(fintrack_dir)?;
        let defaults = Config::default();

        let host = match std::env::var("FINTRACK_HOST") {
            Ok(host) if !host.trim().is_empty() => host.trim().to_string(),
            _ => raw.server.host.unwrap_or(defaults.host),
        };

        let port = match std::env::var("FINTRACK_PORT") {
            Ok(port) => port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("FINTRACK_PORT is not a valid port: {}", port)))?,
            Err(_) => raw.server.port.unwrap_or(defaults.port),
        };

        let config = Self {
            host,
            port,
            read_timeout: raw
                .network
                .read_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.read_timeout),
            max_reconnect_attempts: raw
                .network
                .max_reconnect_attempts
                .unwrap_or(defaults.max_reconnect_attempts),
            initial_backoff: raw
                .network
                .initial_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to the FinTrack directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, fintrack_dir: &Path) -> Result<()> {
        let mut settings = read_settings(fintrack_dir)?;

        settings.server.host = Some(self.host.clone());
        settings.server.port = Some(self.port);
        settings.network.read_timeout_ms = Some(self.read_timeout.as_millis() as u64);
        settings.network.max_reconnect_attempts = Some(self.max_reconnect_attempts);
        settings.network.initial_backoff_ms = Some(self.initial_backoff.as_millis() as u64);

        let content = serde_json::to_string_pretty(&settings)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(fintrack_dir.join(SETTINGS_FILE), content)
            .map_err(|e| Error::Config(format!("Failed to write settings: {}", e)))?;
        Ok(())
    }

    /// `host:port` for socket connects
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("server host cannot be empty".to_string()));
        }
        if self.max_reconnect_attempts == 0 {
            return Err(Error::Config(
                "maxReconnectAttempts must be at least 1".to_string(),
            ));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::Config("readTimeoutMs must be positive".to_string()));
        }
        Ok(())
    }
}

fn read_settings(fintrack_dir: &Path) -> Result<SettingsFile> {
    let settings_path = fintrack_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .map_err(|e| Error::Config(format!("Failed to read {:?}: {}", settings_path, e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid {:?}: {}", settings_path, e)))
}
