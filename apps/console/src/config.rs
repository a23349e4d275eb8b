//! Console configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `--db` on the command line overrides `LOGI_DB_PATH`.

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Shared string that unlocks rate changes. `None` disables them.
    pub admin_key: Option<String>,

    /// Connection pool size
    pub max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `LOGI_DB_PATH` - database file (default: platform data dir)
    /// - `LOGI_ADMIN_KEY` - admin string for `rates set`
    /// - `LOGI_MAX_CONNECTIONS` - pool size (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_path = match lookup("LOGI_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let admin_key = lookup("LOGI_ADMIN_KEY").filter(|key| !key.is_empty());

        let max_connections = lookup("LOGI_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue("LOGI_MAX_CONNECTIONS".to_string()))?;

        Ok(AppConfig {
            database_path,
            admin_key,
            max_connections,
        })
    }
}

/// Platform data directory for the database file.
///
/// - **macOS**: `~/Library/Application Support/com.logi.logi/logi.db`
/// - **Windows**: `%APPDATA%\logi\logi\data\logi.db`
/// - **Linux**: `~/.local/share/logi/logi.db`
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "logi", "logi").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("logi.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the app data directory; set LOGI_DB_PATH")]
    NoDataDir,
}
