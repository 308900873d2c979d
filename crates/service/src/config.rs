use std::path::PathBuf;
use std::time::Duration;

/// Static startup parameters, consumed once when the service state is
/// constructed. Not re-read at runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite account store; an in-memory database is used when
    /// unset.
    pub sqlite_path: Option<PathBuf>,
    /// How long a directory listing stays servable from the cache.
    pub cache_expiration: Duration,
    /// Interval between background sweeps of expired cache entries.
    pub cache_cleanup_interval: Duration,
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            cache_expiration: Duration::from_secs(60),
            cache_cleanup_interval: Duration::from_secs(120),
            log_level: tracing::Level::INFO,
        }
    }
}
