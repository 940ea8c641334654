//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.gigloom/` by default)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use gigloom_types::config::ClientConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_VAR: &str = "GIGLOOM_DATA_DIR";

/// Load client configuration from `{data_dir}/config.toml`.
///
/// A missing file yields [`ClientConfig::default()`]; an unreadable or
/// unparsable one logs a warning and yields the default too.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `GIGLOOM_DATA_DIR` environment variable
/// 2. `~/.gigloom`
/// 3. `./.gigloom` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_VAR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".gigloom");
    }

    PathBuf::from(".gigloom")
}
