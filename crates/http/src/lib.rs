//! HTTP server facade for the gateway with Axum, error handling, pagination
//! headers, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use gateway_kernel::{InitCtx, ModuleRegistry};

pub mod error;
pub mod headers;
pub mod pagination;
pub mod router;

pub use error::AppError;
pub use headers::AlertHeaders;
pub use pagination::{pagination_headers, Pageable};
use router::RouterBuilder;

/// Start the HTTP server and serve until `shutdown` resolves
pub async fn start_server(
    registry: &ModuleRegistry,
    ctx: &InitCtx<'_>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let settings = ctx.settings;
    tracing::info!(
        "starting HTTP server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let app = build_router(registry, ctx).context("failed to build HTTP router")?;

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<Router> {
    let settings = ctx.settings;
    let alerts = AlertHeaders::new(&settings.application.name)?;

    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let module_name = module.name();
        let module_router = module
            .routes(ctx)
            .with_context(|| format!("failed to build routes for module '{module_name}'"))?;

        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module_router);
    }

    router_builder = router_builder.with_openapi(registry);

    // Layers wrap everything added above; the last one applied runs first.
    let router = router_builder
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors(&settings.cors, &alerts.exposed())?
        .with_tracing()
        .with_request_id()
        .build();

    Ok(router)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
