//! Configuration for the chat relay.

use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Server configuration, loadable from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address to bind the TCP listener to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Path of the chat history file, created (truncated) at startup.
    #[serde(default = "default_history_path")]
    pub history_path: String,
    /// Seconds between lobby-wide reminder announcements.
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3335".to_string()
}

fn default_history_path() -> String {
    "chat_history.txt".to_string()
}

fn default_reminder_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            history_path: default_history_path(),
            reminder_interval_secs: default_reminder_interval(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
