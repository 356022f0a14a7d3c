use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Attempts after which a queue item is parked.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Seconds between timer-driven passes.
    pub sync_interval: u64,
    pub max_retry: u32,
    /// Seconds between queue depth polls for status subscribers.
    pub pending_poll_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            remote: RemoteConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: None,
                request_timeout: 30,
            },
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = default_data_dir().join("liftlog.db");
        Self {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            max_connections: 5,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            sync_interval: 10,
            max_retry: MAX_RETRY_ATTEMPTS,
            pending_poll_interval: 5,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval)
    }

    pub fn pending_poll(&self) -> Duration {
        Duration::from_secs(self.pending_poll_interval)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("LIFTLOG_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = lookup("LIFTLOG_DB_MAX_CONNECTIONS").and_then(|v| parse_u32(&v)) {
            cfg.database.max_connections = value.max(1);
        }

        if let Some(v) = lookup("LIFTLOG_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = lookup("LIFTLOG_SYNC_INTERVAL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.sync.sync_interval = value.max(1);
        }
        if let Some(value) = lookup("LIFTLOG_SYNC_MAX_RETRY").and_then(|v| parse_u32(&v)) {
            cfg.sync.max_retry = value.max(1);
        }
        if let Some(value) = lookup("LIFTLOG_PENDING_POLL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.sync.pending_poll_interval = value.max(1);
        }

        if let Some(v) = lookup("LIFTLOG_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(v) = lookup("LIFTLOG_REMOTE_API_KEY") {
            let key = v.trim();
            cfg.remote.api_key = if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            };
        }
        if let Some(value) = lookup("LIFTLOG_REMOTE_TIMEOUT_SECS").and_then(|v| parse_u64(&v)) {
            cfg.remote.request_timeout = value.max(1);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.sync_interval == 0 {
            return Err("Sync interval must be greater than 0".to_string());
        }
        if self.sync.max_retry == 0 {
            return Err("Sync max_retry must be greater than 0".to_string());
        }
        if self.sync.pending_poll_interval == 0 {
            return Err("Pending poll interval must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("liftlog"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
