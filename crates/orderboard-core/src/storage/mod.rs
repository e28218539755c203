mod cache;
mod config;
pub mod database;

pub use cache::{ResourceCache, RESOURCES_KEY};
pub use config::{
    Config, NotificationsConfig, ResourcesConfig, SyncConfig, TimelineConfig, TimerConfig,
};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/orderboard[-dev]/` based on ORDERBOARD_ENV.
///
/// Set ORDERBOARD_ENV=dev to use development data directory.
/// ORDERBOARD_HOME overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ORDERBOARD_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ORDERBOARD_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("orderboard-dev")
            } else {
                base_dir.join("orderboard")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
