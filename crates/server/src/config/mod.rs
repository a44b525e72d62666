//! Configuration management for the topics server
//!
//! Configuration is stored in RON format. Every section has defaults, so an
//! empty `Config()` is a valid file.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub sessions: SessionSettings,

    #[serde(default)]
    pub topics: TopicSettings,
}

impl Config {
    /// Validate every section, returning the first problem found
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.database.validate()?;
        self.sessions.validate()?;
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Socket address the API binds to (e.g., "0.0.0.0:8000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl ServerSettings {
    fn validate(&self) -> Result<(), String> {
        if self.bind_addr.trim().is_empty() {
            return Err("server bind address cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

/// SQLite database settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseSettings {
    /// Directory holding `topics.db`; overridden by TOPICS_DB_PATH
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("database max_connections must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(".topics")),
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

/// Session lookup and expiry settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SessionSettings {
    /// Cookie carrying the session id when no bearer token is sent
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Sessions older than this no longer authenticate and are pruned
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

impl SessionSettings {
    fn validate(&self) -> Result<(), String> {
        if self.cookie_name.trim().is_empty() {
            return Err("session cookie name cannot be empty".to_string());
        }
        if self.prune_interval_secs == 0 {
            return Err("session prune interval must be at least 1 second".to_string());
        }
        Ok(())
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }

    /// Session lifetime as the signed seconds SQLite compares against.
    pub fn max_age_secs(&self) -> i64 {
        i64::try_from(self.ttl_secs).unwrap_or(i64::MAX)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl_secs(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

fn default_cookie_name() -> String {
    "topics_session".to_string()
}

fn default_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_prune_interval_secs() -> u64 {
    60 * 60
}

/// Topic submission settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct TopicSettings {
    /// Artificial latency before a submission is validated. Zero disables it.
    #[serde(default)]
    pub submit_delay_ms: u64,
}

impl TopicSettings {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}
