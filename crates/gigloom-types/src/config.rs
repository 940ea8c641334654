//! Client configuration types for Gigloom.
//!
//! `ClientConfig` represents the `config.toml` in the data directory that
//! controls the backend address, the reconnection policy, and the chat
//! session's de-duplication window.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
///
/// Loaded from `~/.gigloom/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the marketplace backend (REST and chat socket).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single REST request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Live messages with the same text and sender closer than this are
    /// treated as one.
    #[serde(default = "default_duplicate_window_ms")]
    pub duplicate_window_ms: u64,

    /// Capacity of the session event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_duplicate_window_ms() -> u64 {
    1000
}

fn default_event_buffer() -> usize {
    256
}

impl ClientConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_millis(self.duplicate_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            duplicate_window_ms: default_duplicate_window_ms(),
            event_buffer: default_event_buffer(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Bounded linear backoff for the chat socket.
///
/// The Nth retry waits `base_delay_ms * N`; after `max_attempts` failed
/// retries the session gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    2000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default_values() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.duplicate_window(), Duration::from_millis(1000));
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.base_delay_ms, 2000);
    }

    #[test]
    fn test_client_config_deserialize_with_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.event_buffer, 256);
        assert_eq!(config.reconnect, ReconnectConfig::default());
    }

    #[test]
    fn test_client_config_partial_reconnect_table() {
        let toml_str = r#"
base_url = "https://api.gigloom.example"

[reconnect]
max_attempts = 3
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://api.gigloom.example");
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.base_delay_ms, 2000);
    }
}
