use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use biblio_http::error::AppError;
use biblio_http::extract::{PathId, Payload};

use super::models::{Book, CreateBook, UpdateBook};
use super::repository::BookRepository;
use crate::utils::{self, Data};

/// Routes mounted under `/api/books`.
pub fn router(books: BookRepository) -> Router {
    tracing::debug!(
        target: "biblio.routes",
        prefix = %utils::log_prefix("books"),
        "registering book routes"
    );

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(show_book).put(update_book).delete(delete_book),
        )
        .with_state(books)
}

async fn list_books(State(books): State<BookRepository>) -> Result<Json<Data<Vec<Book>>>, AppError> {
    Ok(Data::new(books.list().await?))
}

async fn create_book(
    State(books): State<BookRepository>,
    Payload(input): Payload<CreateBook>,
) -> Result<impl IntoResponse, AppError> {
    let book = books.create(input).await?;
    tracing::info!(book_id = book.id, author_id = book.author_id, "book created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/books/{}", book.id))],
        Data::new(book),
    ))
}

async fn show_book(
    State(books): State<BookRepository>,
    PathId(id): PathId,
) -> Result<Json<Data<Book>>, AppError> {
    Ok(Data::new(books.get(id).await?))
}

async fn update_book(
    State(books): State<BookRepository>,
    PathId(id): PathId,
    Payload(input): Payload<UpdateBook>,
) -> Result<Json<Data<Book>>, AppError> {
    let book = books.update(id, input).await?;
    tracing::info!(book_id = book.id, "book updated");
    Ok(Data::new(book))
}

async fn delete_book(
    State(books): State<BookRepository>,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    books.delete(id).await?;
    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
