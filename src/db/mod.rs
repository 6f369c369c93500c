pub mod category_repository;
pub mod todo_repository;

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool for `database_url`, creating the database file if needed.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    if database_url.contains(":memory:") {
        return connect_in_memory().await;
    }

    connect_with(SqliteConnectOptions::from_str(database_url)?, max_connections).await
}

/// Opens a file-backed pool. Writers that find the database locked wait up to
/// [`BUSY_TIMEOUT`] for the lock.
pub async fn connect_with(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = options.create_if_missing(true).busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Every in-memory connection is its own database, so the pool holds exactly
/// one connection and never recycles it.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339()
}
