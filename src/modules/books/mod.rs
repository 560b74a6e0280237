pub mod mapper;
pub mod models;
pub mod repository;
pub mod routes;
pub mod row_mapper;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use gateway_http::AlertHeaders;
use gateway_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils;
use routes::BookResource;
use service::BookService;

/// Book CRUD served under `/api/books`.
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let prefix = utils::log_prefix(self.name());
        tracing::info!(
            module = self.name(),
            %prefix,
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> anyhow::Result<Router> {
        let alerts = AlertHeaders::new(&ctx.settings.application.name)?;
        let resource = BookResource::new(
            BookService::new(ctx.db.clone()),
            alerts,
            ctx.settings.pagination.clone(),
        );
        Ok(routes::router(resource))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let book = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List a page of books",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 0 } },
                            { "name": "size", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            {
                                "name": "sort",
                                "in": "query",
                                "description": "property[,asc|desc]; may be repeated",
                                "schema": { "type": "array", "items": { "type": "string" } }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Page of books; X-Total-Count and Link describe the whole collection",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "400": { "description": "Unknown sort property", "content": error["content"] }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": { "required": true, "content": book },
                        "responses": {
                            "201": { "description": "Created", "content": book },
                            "400": { "description": "Payload already carries an id", "content": error["content"] }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "The book", "content": book },
                            "404": { "description": "No such book", "content": error["content"] }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": { "required": true, "content": book },
                        "responses": {
                            "200": { "description": "Updated", "content": book },
                            "400": { "description": "Id missing, mismatched or unknown", "content": error["content"] }
                        }
                    },
                    "patch": {
                        "summary": "Merge fields into a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/merge-patch+json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                },
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Updated", "content": book },
                            "400": { "description": "Id missing, mismatched or unknown", "content": error["content"] }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted, or already absent" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": ["integer", "null"], "format": "int64" },
                            "name": { "type": ["string", "null"] },
                            "description": { "type": ["string", "null"] },
                            "price": { "type": ["integer", "null"], "format": "int64" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS book (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    name        TEXT,
                    description TEXT,
                    price       INTEGER
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
