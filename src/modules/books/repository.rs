//! SQLite-backed book storage.
//!
//! # Invariants
//! - `author_id` of every stored book references an existing author; a
//!   missing author is reported as a validation error on the `author_id` field.

use biblio_db::Database;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{Book, CreateBook, UpdateBook};
use crate::modules::authors::repository::author_exists;
use crate::modules::error::{RepoError, RepoResult};
use crate::modules::validation::{Violations, NOT_FOUND};
use crate::utils::now_timestamp;

const ENTITY: &str = "book";

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author_id,
    isbn,
    published_year,
    created_at,
    updated_at
FROM books";

#[derive(Clone)]
pub struct BookRepository {
    db: Database,
}

impl BookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All books, ascending id.
    pub async fn list(&self) -> RepoResult<Vec<Book>> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id;"))?;
                let books = stmt
                    .query_map([], parse_book_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(books)
            })
            .await
    }

    /// Books owned by `author_id`, ascending id. Fails with not found when
    /// the author does not exist.
    pub async fn list_by_author(&self, author_id: i64) -> RepoResult<Vec<Book>> {
        self.db
            .call(move |conn| {
                if !author_exists(conn, author_id)? {
                    return Err(RepoError::NotFound {
                        entity: "author",
                        id: author_id,
                    });
                }

                let mut stmt = conn.prepare(&format!(
                    "{BOOK_SELECT_SQL} WHERE author_id = ?1 ORDER BY id;"
                ))?;
                let books = stmt
                    .query_map(params![author_id], parse_book_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(books)
            })
            .await
    }

    pub async fn get(&self, id: i64) -> RepoResult<Book> {
        self.db
            .call(move |conn| find_book(conn, id)?.ok_or(not_found(id)))
            .await
    }

    pub async fn create(&self, input: CreateBook) -> RepoResult<Book> {
        let mut violations = Violations::new(ENTITY);
        let new = input.check(&mut violations);
        let author_id = input.author_id;

        self.db
            .call(move |conn| {
                if let Some(author_id) = author_id {
                    if !author_exists(conn, author_id)? {
                        violations.add("author_id", NOT_FOUND);
                    }
                }
                let new = violations.resolve(new)?;

                let now = now_timestamp();
                conn.execute(
                    "INSERT INTO books (title, author_id, isbn, published_year, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
                    params![new.title, new.author_id, new.isbn, new.published_year, now],
                )?;

                Ok(Book {
                    id: conn.last_insert_rowid(),
                    title: new.title,
                    author_id: new.author_id,
                    isbn: new.isbn,
                    published_year: new.published_year,
                    created_at: now.clone(),
                    updated_at: now,
                })
            })
            .await
    }

    pub async fn update(&self, id: i64, input: UpdateBook) -> RepoResult<Book> {
        let mut violations = Violations::new(ENTITY);
        let changes = input.check(&mut violations);

        self.db
            .call(move |conn| {
                let mut book = find_book(conn, id)?.ok_or(not_found(id))?;

                if let Some(author_id) = changes.author_id {
                    if !author_exists(conn, author_id)? {
                        violations.add("author_id", NOT_FOUND);
                    }
                }
                violations.finish()?;

                changes.apply(&mut book);
                book.updated_at = now_timestamp();

                conn.execute(
                    "UPDATE books
                     SET title = ?1, author_id = ?2, isbn = ?3, published_year = ?4, updated_at = ?5
                     WHERE id = ?6;",
                    params![
                        book.title,
                        book.author_id,
                        book.isbn,
                        book.published_year,
                        book.updated_at,
                        book.id
                    ],
                )?;

                Ok(book)
            })
            .await
    }

    pub async fn delete(&self, id: i64) -> RepoResult<()> {
        self.db
            .call(move |conn| {
                let removed = conn.execute("DELETE FROM books WHERE id = ?1;", params![id])?;
                if removed == 0 {
                    return Err(not_found(id));
                }
                Ok(())
            })
            .await
    }
}

fn not_found(id: i64) -> RepoError {
    RepoError::NotFound { entity: ENTITY, id }
}

fn find_book(conn: &Connection, id: i64) -> RepoResult<Option<Book>> {
    let book = conn
        .query_row(
            &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
            params![id],
            parse_book_row,
        )
        .optional()?;
    Ok(book)
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author_id: row.get(2)?,
        isbn: row.get(3)?,
        published_year: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
