use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use biblio_http::error::AppError;
use biblio_http::extract::{PathId, Payload};
use biblio_kernel::settings::AuthorDeletePolicy;

use super::models::{Author, CreateAuthor, UpdateAuthor};
use super::repository::AuthorRepository;
use crate::modules::books::models::Book;
use crate::modules::books::repository::BookRepository;
use crate::utils::{self, Data};

/// Shared state of the author handlers.
#[derive(Clone)]
pub struct AuthorsState {
    pub authors: AuthorRepository,
    pub books: BookRepository,
    pub delete_policy: AuthorDeletePolicy,
}

/// Routes mounted under `/api/authors`, including `/{id}/books`.
pub fn router(state: AuthorsState) -> Router {
    tracing::debug!(
        target: "biblio.routes",
        prefix = %utils::log_prefix("authors"),
        delete_policy = ?state.delete_policy,
        "registering author routes"
    );

    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/{id}",
            get(show_author).put(update_author).delete(delete_author),
        )
        .route("/{id}/books", get(author_books))
        .with_state(state)
}

async fn list_authors(
    State(state): State<AuthorsState>,
) -> Result<Json<Data<Vec<Author>>>, AppError> {
    Ok(Data::new(state.authors.list().await?))
}

async fn create_author(
    State(state): State<AuthorsState>,
    Payload(input): Payload<CreateAuthor>,
) -> Result<impl IntoResponse, AppError> {
    let author = state.authors.create(input).await?;
    tracing::info!(author_id = author.id, "author created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/authors/{}", author.id))],
        Data::new(author),
    ))
}

async fn show_author(
    State(state): State<AuthorsState>,
    PathId(id): PathId,
) -> Result<Json<Data<Author>>, AppError> {
    Ok(Data::new(state.authors.get(id).await?))
}

async fn update_author(
    State(state): State<AuthorsState>,
    PathId(id): PathId,
    Payload(input): Payload<UpdateAuthor>,
) -> Result<Json<Data<Author>>, AppError> {
    let author = state.authors.update(id, input).await?;
    tracing::info!(author_id = author.id, "author updated");
    Ok(Data::new(author))
}

async fn delete_author(
    State(state): State<AuthorsState>,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    let deleted = state.authors.delete(id, state.delete_policy).await?;
    tracing::info!(
        author_id = id,
        books_deleted = deleted.books_deleted,
        policy = ?state.delete_policy,
        "author deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn author_books(
    State(state): State<AuthorsState>,
    PathId(id): PathId,
) -> Result<Json<Data<Vec<Book>>>, AppError> {
    Ok(Data::new(state.books.list_by_author(id).await?))
}
