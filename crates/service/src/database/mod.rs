pub mod models;

use std::ops::Deref;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use url::Url;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    name           TEXT PRIMARY KEY,
    driver         TEXT NOT NULL,
    username       TEXT NOT NULL DEFAULT '',
    password       TEXT NOT NULL DEFAULT '',
    root_folder    TEXT NOT NULL DEFAULT '',
    status         TEXT NOT NULL DEFAULT '',
    drive_id       TEXT NOT NULL DEFAULT '',
    proxy          INTEGER NOT NULL DEFAULT 0,
    sort_by        TEXT NOT NULL DEFAULT 'name',
    sort_direction TEXT NOT NULL DEFAULT 'asc',
    updated_at     TEXT
)
"#;

/// SQLite-backed account store.
///
/// Writes are single statements, so each account record is updated
/// transactionally; no partial-field write is ever observable.
#[derive(Clone)]
pub struct Database(SqlitePool);

impl Database {
    pub async fn connect(url: &Url) -> Result<Self, DatabaseSetupError> {
        let options =
            SqliteConnectOptions::from_str(url.as_str())?.create_if_missing(true);
        // An in-memory database exists per connection; keep the pool at one
        // so every caller sees the same store.
        let max_connections = if url.as_str().contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self(pool))
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
