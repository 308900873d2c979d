use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use super::cache::DirCache;
use super::config::Config;
use super::database::{Database, DatabaseSetupError};
use super::registry::DriverRegistry;
use super::resolve::Resolver;

/// Shared service state: the account store, the directory cache with its
/// sweeper, the resolution engine, and the driver registry.
#[derive(Clone)]
pub struct State {
    database: Database,
    cache: Arc<DirCache>,
    resolver: Arc<Resolver>,
    registry: Arc<DriverRegistry>,
    shutdown_tx: Arc<watch::Sender<()>>,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        Self::from_config_with(config, DriverRegistry::with_defaults).await
    }

    /// Build state with a caller-supplied registry, so tests can wire in
    /// instrumented drivers against the shared resolver.
    pub async fn from_config_with(
        config: &Config,
        build_registry: impl FnOnce(Arc<Resolver>) -> DriverRegistry,
    ) -> Result<Self, StateSetupError> {
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => Url::parse(&format!("sqlite://{}", path.display()))
                .map_err(|_| StateSetupError::InvalidDatabaseUrl),
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        let cache = Arc::new(DirCache::new(config.cache_expiration));
        let resolver = Arc::new(Resolver::new(cache.clone()));
        let registry = Arc::new(build_registry(resolver.clone()));
        tracing::info!(drivers = ?registry.names(), "driver registry ready");

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let sweeper = cache.spawn_sweeper(config.cache_cleanup_interval, shutdown_rx);

        Ok(Self {
            database,
            cache,
            resolver,
            registry,
            shutdown_tx: Arc::new(shutdown_tx),
            sweeper: Arc::new(Mutex::new(Some(sweeper))),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn cache(&self) -> &Arc<DirCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.registry
    }

    /// Stop the cache sweeper. Idempotent; later clones observe the task as
    /// already taken.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "cache sweeper did not stop cleanly");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("invalid database URL")]
    InvalidDatabaseUrl,
}
