pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use biblio_db::Database;
use biblio_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils::{data_response, error_response, schema_ref};
use repository::BookRepository;

/// Books resource: CRUD over `/api/books`.
pub struct BooksModule {
    books: BookRepository,
}

impl BooksModule {
    pub fn new(db: Database) -> Self {
        Self {
            books: BookRepository::new(db),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.books.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": data_response(
                                "All books, ascending id",
                                json!({ "type": "array", "items": schema_ref("Book") })
                            )
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": schema_ref("CreateBook") } }
                        },
                        "responses": {
                            "201": data_response("Created book", schema_ref("Book")),
                            "400": error_response("Malformed body"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Show a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": data_response("Book", schema_ref("Book")),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": schema_ref("UpdateBook") } }
                        },
                        "responses": {
                            "200": data_response("Updated book", schema_ref("Book")),
                            "404": error_response("Book not found"),
                            "422": error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author_id": { "type": "integer", "format": "int64" },
                            "isbn": { "type": ["string", "null"] },
                            "published_year": { "type": ["integer", "null"] },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author_id", "created_at", "updated_at"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": models::TITLE_MAX_CHARS },
                            "author_id": { "type": "integer", "format": "int64" },
                            "isbn": { "type": "string", "description": "ISBN-10 or ISBN-13; hyphens allowed" },
                            "published_year": { "type": "integer" }
                        },
                        "required": ["title", "author_id"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "description": "Absent fields are unchanged; null clears isbn/published_year",
                        "properties": {
                            "title": { "type": "string", "maxLength": models::TITLE_MAX_CHARS },
                            "author_id": { "type": "integer", "format": "int64" },
                            "isbn": { "type": ["string", "null"] },
                            "published_year": { "type": ["integer", "null"] }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE books (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    title          TEXT    NOT NULL CHECK (length(trim(title)) > 0),
                    author_id      INTEGER NOT NULL REFERENCES authors (id) ON DELETE RESTRICT,
                    isbn           TEXT,
                    published_year INTEGER,
                    created_at     TEXT    NOT NULL,
                    updated_at     TEXT    NOT NULL
                );
                CREATE INDEX books_author_id ON books (author_id);
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
pub fn create_module(db: Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db))
}
