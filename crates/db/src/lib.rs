//! SQLx-backed persistence plumbing: pool factory, scoped transactions, and
//! the module migration runner.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use gateway_kernel::settings::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod error;
pub mod migrate;
pub mod tx;

pub use error::{DbError, DbResult};
pub use migrate::run_migrations;
pub use tx::{Tx, TxMode};

/// Build a connection pool from the database settings.
///
/// In-memory databases live and die with their connection, so such URLs get
/// a single connection that is never recycled.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .foreign_keys(true);

    let pool_options = if is_in_memory(&settings.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .before_acquire(|conn, _meta| {
            Box::pin(async move {
                // Cleared here too: a read-only `Tx` dropped mid-scope leaves it set.
                sqlx::query("PRAGMA query_only = OFF")
                    .execute(&mut *conn)
                    .await?;
                Ok(true)
            })
        })
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(
        target: "gateway-db",
        url = %settings.url,
        max_connections = pool.options().get_max_connections(),
        "database pool ready"
    );

    Ok(pool)
}

/// Pool over a private in-memory database, used by tests and tooling.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    connect(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        ..DatabaseSettings::default()
    })
    .await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
