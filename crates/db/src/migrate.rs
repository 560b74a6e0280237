//! Applies module migrations and records them in `schema_migrations`.

use gateway_kernel::Migration;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

const CREATE_TRACKING_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration of the plan that has not been recorded yet.
///
/// Each migration runs in its own transaction together with its tracking row,
/// so a failing migration leaves neither partial schema nor a record behind.
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &SqlitePool, plan: &[(String, Migration)]) -> DbResult<usize> {
    sqlx::query(CREATE_TRACKING_TABLE).execute(pool).await?;

    let mut applied = 0;

    for (module, migration) in plan {
        let mut tx = pool.begin().await?;

        let already_applied: Option<(String,)> =
            sqlx::query_as("SELECT id FROM schema_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(&mut *tx)
                .await?;

        if already_applied.is_some() {
            tracing::debug!(target: "gateway-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;

        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(target: "gateway-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
