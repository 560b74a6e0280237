//! IPA gateway application library.
//!
//! Wires the book and public-user modules into the kernel's registry and
//! drives the server lifecycle.

use anyhow::Context;
use axum::Router;
use gateway_kernel::{InitCtx, ModuleRegistry, Settings};
use sqlx::SqlitePool;

pub mod modules;
pub mod utils;

/// Registry holding every gateway module.
pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;
    Ok(registry)
}

/// Apply pending migrations of every module; returns how many ran.
pub async fn migrate(registry: &ModuleRegistry, pool: &SqlitePool) -> anyhow::Result<usize> {
    let plan = registry.collect_migrations();
    let applied = gateway_db::run_migrations(pool, &plan)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, total = plan.len(), "migrations complete");
    Ok(applied)
}

/// Connect, migrate, and serve until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    gateway_telemetry::init(&settings.telemetry).context("failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "ipa-gateway bootstrap starting"
    );

    let registry = build_registry()?;
    let pool = gateway_db::connect(&settings.database).await?;
    migrate(&registry, &pool).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = gateway_http::start_server(&registry, &ctx, shutdown_signal()).await;

    registry.stop_modules().await?;
    pool.close().await;
    tracing::info!("ipa-gateway stopped");

    served
}

/// Fully migrated router over `pool`, as served by [`run`].
pub async fn app(settings: &Settings, pool: &SqlitePool) -> anyhow::Result<Router> {
    let registry = build_registry()?;
    migrate(&registry, pool).await?;

    let ctx = InitCtx { settings, db: pool };
    registry.init_modules(&ctx).await?;
    gateway_http::build_router(&registry, &ctx)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
