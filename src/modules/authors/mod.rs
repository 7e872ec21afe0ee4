pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use biblio_db::Database;
use biblio_kernel::settings::AuthorDeletePolicy;
use biblio_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::modules::books::repository::BookRepository;
use crate::utils::{data_response, error_response, schema_ref};
use repository::AuthorRepository;
use routes::AuthorsState;

/// Authors resource: CRUD over `/api/authors` plus the books of an author.
pub struct AuthorsModule {
    state: AuthorsState,
}

impl AuthorsModule {
    pub fn new(db: Database, delete_policy: AuthorDeletePolicy) -> Self {
        Self {
            state: AuthorsState {
                authors: AuthorRepository::new(db.clone()),
                books: BookRepository::new(db),
                delete_policy,
            },
        }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            delete_policy = ?self.state.delete_policy,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        let delete_conflict = match self.state.delete_policy {
            AuthorDeletePolicy::Restrict => "Author still owns books",
            AuthorDeletePolicy::Cascade => "Not returned: books are deleted with the author",
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "responses": {
                            "200": data_response(
                                "All authors, ascending id",
                                json!({ "type": "array", "items": schema_ref("Author") })
                            )
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": schema_ref("CreateAuthor") } }
                        },
                        "responses": {
                            "201": data_response("Created author", schema_ref("Author")),
                            "400": error_response("Malformed body"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Show an author",
                        "tags": ["Authors"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": data_response("Author", schema_ref("Author")),
                            "404": error_response("Author not found")
                        }
                    },
                    "put": {
                        "summary": "Update an author",
                        "tags": ["Authors"],
                        "parameters": id_param.clone(),
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": schema_ref("UpdateAuthor") } }
                        },
                        "responses": {
                            "200": data_response("Updated author", schema_ref("Author")),
                            "404": error_response("Author not found"),
                            "422": error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author",
                        "tags": ["Authors"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Author not found"),
                            "409": error_response(delete_conflict)
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "List the books of an author",
                        "tags": ["Authors", "Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": data_response(
                                "Books of the author, ascending id",
                                json!({ "type": "array", "items": schema_ref("Book") })
                            ),
                            "404": error_response("Author not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "bio": { "type": ["string", "null"] },
                            "birth_year": { "type": ["integer", "null"] },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "name", "created_at", "updated_at"]
                    },
                    "CreateAuthor": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "maxLength": models::NAME_MAX_CHARS },
                            "bio": { "type": "string", "maxLength": models::BIO_MAX_CHARS },
                            "birth_year": { "type": "integer" }
                        },
                        "required": ["name"]
                    },
                    "UpdateAuthor": {
                        "type": "object",
                        "description": "Absent fields are unchanged; null clears bio/birth_year",
                        "properties": {
                            "name": { "type": "string", "maxLength": models::NAME_MAX_CHARS },
                            "bio": { "type": ["string", "null"], "maxLength": models::BIO_MAX_CHARS },
                            "birth_year": { "type": ["integer", "null"] }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_authors",
            up: r#"
                CREATE TABLE authors (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    name       TEXT    NOT NULL CHECK (length(trim(name)) > 0),
                    bio        TEXT,
                    birth_year INTEGER,
                    created_at TEXT    NOT NULL,
                    updated_at TEXT    NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(db: Database, delete_policy: AuthorDeletePolicy) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(db, delete_policy))
}
