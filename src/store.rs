//! SQLite pool setup. The database file is created when missing.

use crate::error::{AppError, ConfigError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Pool size used by [`connect`].
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open a pool for `database_url` (e.g. `sqlite://admin.db`, `sqlite::memory:`), creating the file if needed.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    connect_with(database_url, DEFAULT_MAX_CONNECTIONS).await
}

pub async fn connect_with(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(ConfigError::Settings(format!("invalid DATABASE_URL: {}", e))))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await?;
    tracing::info!(database_url = %database_url, "database connected");
    Ok(pool)
}

/// True when the pool answers a trivial query.
pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").fetch_optional(pool).await.is_ok()
}
