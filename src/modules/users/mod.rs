pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use gateway_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils;
use routes::PublicUserResource;
use service::UserService;

/// Read-only listing of activated accounts under `/api/users`.
pub struct UsersModule;

impl UsersModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for UsersModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let prefix = utils::log_prefix(self.name());
        tracing::info!(
            module = self.name(),
            %prefix,
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> anyhow::Result<Router> {
        let resource = PublicUserResource::new(
            UserService::new(ctx.db.clone()),
            ctx.settings.pagination.clone(),
        );
        Ok(routes::router(resource))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List activated users",
                        "tags": ["Users"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 0 } },
                            { "name": "size", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            {
                                "name": "sort",
                                "in": "query",
                                "description": "id or login, optionally followed by ,asc or ,desc",
                                "schema": { "type": "array", "items": { "type": "string" } }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Page of public users",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/PublicUser" }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Sort property outside id and login",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "PublicUser": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "login": { "type": "string" }
                        },
                        "required": ["id", "login"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_init",
                up: r#"
                    CREATE TABLE IF NOT EXISTS jhi_user (
                        id        INTEGER PRIMARY KEY AUTOINCREMENT,
                        login     TEXT NOT NULL UNIQUE,
                        activated INTEGER NOT NULL DEFAULT 0
                    );
                    "#,
            },
            Migration {
                id: "002_seed_accounts",
                up: r#"
                    INSERT OR IGNORE INTO jhi_user (login, activated) VALUES ('admin', 1);
                    INSERT OR IGNORE INTO jhi_user (login, activated) VALUES ('user', 1);
                    "#,
            },
        ]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UsersModule::new())
}
