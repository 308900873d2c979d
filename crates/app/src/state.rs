use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use service::ServiceConfig;

pub const APP_NAME: &str = "vdrive";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";

/// On-disk configuration, read from `config.toml` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds a directory listing stays servable from the cache.
    pub cache_expiration_secs: u64,
    /// Seconds between background sweeps of expired cache entries.
    pub cache_cleanup_interval_secs: u64,
    /// Default log level; `RUST_LOG` overrides it.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_expiration_secs: 60,
            cache_cleanup_interval_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

/// Resolved data directory layout plus the loaded configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// Default data directory (`~/.vdrive`).
    pub fn default_dir() -> Result<PathBuf, StateError> {
        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn resolve_dir(data_dir: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match data_dir {
            Some(dir) => Ok(dir),
            None => Self::default_dir(),
        }
    }

    /// Create a fresh data directory with a default config.
    pub fn init(data_dir: Option<PathBuf>) -> Result<Self, StateError> {
        let data_dir = Self::resolve_dir(data_dir)?;
        if data_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized(data_dir));
        }
        fs::create_dir_all(&data_dir)?;

        let config = AppConfig::default();
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        // The database file itself is created by the service on first use.
        let db_path = data_dir.join(DB_FILE_NAME);

        Ok(Self {
            data_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load an existing data directory.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self, StateError> {
        let data_dir = Self::resolve_dir(data_dir)?;
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::NotInitialized(data_dir));
        }
        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;
        let db_path = data_dir.join(DB_FILE_NAME);

        Ok(Self {
            data_dir,
            db_path,
            config_path,
            config,
        })
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            sqlite_path: Some(self.db_path.clone()),
            cache_expiration: Duration::from_secs(self.config.cache_expiration_secs),
            cache_cleanup_interval: Duration::from_secs(self.config.cache_cleanup_interval_secs),
            log_level: tracing::Level::from_str(&self.config.log_level)
                .unwrap_or(tracing::Level::INFO),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("data directory {} is not initialized; run 'vdrive init' first", .0.display())]
    NotInitialized(PathBuf),

    #[error("data directory {} is already initialized", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("store");

        let state = AppState::init(Some(target.clone())).unwrap();
        assert_eq!(state.config.cache_expiration_secs, 60);

        let loaded = AppState::load(Some(target.clone())).unwrap();
        assert_eq!(loaded.db_path, target.join(DB_FILE_NAME));

        assert!(matches!(
            AppState::init(Some(target)),
            Err(StateError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn load_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().join("missing"))),
            Err(StateError::NotInitialized(_))
        ));
    }
}
