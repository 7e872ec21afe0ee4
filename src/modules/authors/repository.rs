//! SQLite-backed author storage.
//!
//! # Invariants
//! - Input is validated before the connection is locked.
//! - An author is never removed while books still reference it; the delete
//!   policy decides whether those books block the delete or go with it.

use biblio_db::Database;
use biblio_kernel::settings::AuthorDeletePolicy;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::json;

use super::models::{Author, CreateAuthor, UpdateAuthor};
use crate::modules::error::{RepoError, RepoResult};
use crate::modules::validation::Violations;
use crate::utils::now_timestamp;

const ENTITY: &str = "author";

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    bio,
    birth_year,
    created_at,
    updated_at
FROM authors";

/// Outcome of a successful author delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorDeleted {
    pub books_deleted: usize,
}

#[derive(Clone)]
pub struct AuthorRepository {
    db: Database,
}

impl AuthorRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All authors, ascending id.
    pub async fn list(&self) -> RepoResult<Vec<Author>> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY id;"))?;
                let authors = stmt
                    .query_map([], parse_author_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(authors)
            })
            .await
    }

    pub async fn get(&self, id: i64) -> RepoResult<Author> {
        self.db
            .call(move |conn| find_author(conn, id)?.ok_or(not_found(id)))
            .await
    }

    pub async fn create(&self, input: CreateAuthor) -> RepoResult<Author> {
        let mut violations = Violations::new(ENTITY);
        let new = input.check(&mut violations);
        let new = violations.resolve(new)?;

        self.db
            .call(move |conn| {
                let now = now_timestamp();
                conn.execute(
                    "INSERT INTO authors (name, bio, birth_year, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4);",
                    params![new.name, new.bio, new.birth_year, now],
                )?;

                Ok(Author {
                    id: conn.last_insert_rowid(),
                    name: new.name,
                    bio: new.bio,
                    birth_year: new.birth_year,
                    created_at: now.clone(),
                    updated_at: now,
                })
            })
            .await
    }

    pub async fn update(&self, id: i64, input: UpdateAuthor) -> RepoResult<Author> {
        let mut violations = Violations::new(ENTITY);
        let changes = input.check(&mut violations);

        self.db
            .call(move |conn| {
                let mut author = find_author(conn, id)?.ok_or(not_found(id))?;
                violations.finish()?;

                changes.apply(&mut author);
                author.updated_at = now_timestamp();

                conn.execute(
                    "UPDATE authors
                     SET name = ?1, bio = ?2, birth_year = ?3, updated_at = ?4
                     WHERE id = ?5;",
                    params![
                        author.name,
                        author.bio,
                        author.birth_year,
                        author.updated_at,
                        author.id
                    ],
                )?;

                Ok(author)
            })
            .await
    }

    /// Delete an author, honoring `policy` for books that still reference it.
    pub async fn delete(&self, id: i64, policy: AuthorDeletePolicy) -> RepoResult<AuthorDeleted> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                if !author_exists(&tx, id)? {
                    return Err(not_found(id));
                }

                let owned: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM books WHERE author_id = ?1;",
                    params![id],
                    |row| row.get(0),
                )?;

                let books_deleted = match policy {
                    AuthorDeletePolicy::Restrict if owned > 0 => {
                        return Err(RepoError::Conflict {
                            message: format!("author {} still owns {} book(s)", id, owned),
                            details: vec![json!({"field": "books", "count": owned})],
                        });
                    }
                    AuthorDeletePolicy::Restrict => 0,
                    AuthorDeletePolicy::Cascade => {
                        tx.execute("DELETE FROM books WHERE author_id = ?1;", params![id])?
                    }
                };

                tx.execute("DELETE FROM authors WHERE id = ?1;", params![id])?;
                tx.commit()?;

                Ok(AuthorDeleted { books_deleted })
            })
            .await
    }
}

fn not_found(id: i64) -> RepoError {
    RepoError::NotFound { entity: ENTITY, id }
}

pub(crate) fn find_author(conn: &Connection, id: i64) -> RepoResult<Option<Author>> {
    let author = conn
        .query_row(
            &format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"),
            params![id],
            parse_author_row,
        )
        .optional()?;
    Ok(author)
}

pub(crate) fn author_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM authors WHERE id = ?1);",
        params![id],
        |row| row.get(0),
    )
}

fn parse_author_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        bio: row.get(2)?,
        birth_year: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::{migrated_db, seed_book};

    fn named(name: &str) -> CreateAuthor {
        CreateAuthor {
            name: Some(name.to_string()),
            ..CreateAuthor::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let repo = AuthorRepository::new(migrated_db().await);

        let created = repo
            .create(CreateAuthor {
                name: Some("Italo Calvino".to_string()),
                bio: Some("Invisible Cities".to_string()),
                birth_year: Some(1923),
            })
            .await
            .unwrap();
        let loaded = repo.get(created.id).await.unwrap();

        assert_eq!(loaded, created);
        assert_eq!(loaded.name, "Italo Calvino");
        assert_eq!(loaded.birth_year, Some(1923));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let repo = AuthorRepository::new(migrated_db().await);
        let a = repo.create(named("Borges")).await.unwrap();
        let b = repo.create(named("Cortázar")).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn create_reports_every_violation() {
        let repo = AuthorRepository::new(migrated_db().await);
        let err = repo
            .create(CreateAuthor {
                name: None,
                bio: Some("x".repeat(2001)),
                birth_year: Some(9999),
            })
            .await
            .unwrap_err();

        match err {
            RepoError::Validation { violations, .. } => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["name", "bio", "birth_year"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_missing_author_is_not_found() {
        let repo = AuthorRepository::new(migrated_db().await);
        let err = repo.update(42, UpdateAuthor::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn update_changes_fields() {
        let repo = AuthorRepository::new(migrated_db().await);
        let created = repo.create(named("Stanislaw Lem")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateAuthor {
                    name: Some("Stanisław Lem".to_string()),
                    birth_year: Some(Some(1921)),
                    ..UpdateAuthor::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Stanisław Lem");
        assert_eq!(updated.birth_year, Some(1921));
        assert_eq!(repo.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn restrict_policy_blocks_delete_of_author_with_books() {
        let db = migrated_db().await;
        let repo = AuthorRepository::new(db.clone());
        let author = repo.create(named("Ted Chiang")).await.unwrap();
        seed_book(&db, author.id, "Exhalation").await;

        let err = repo
            .delete(author.id, AuthorDeletePolicy::Restrict)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict { .. }));
        assert!(repo.get(author.id).await.is_ok());
    }

    #[tokio::test]
    async fn cascade_policy_removes_books() {
        let db = migrated_db().await;
        let repo = AuthorRepository::new(db.clone());
        let author = repo.create(named("Ted Chiang")).await.unwrap();
        seed_book(&db, author.id, "Exhalation").await;
        seed_book(&db, author.id, "Stories of Your Life").await;

        let deleted = repo
            .delete(author.id, AuthorDeletePolicy::Cascade)
            .await
            .unwrap();
        assert_eq!(deleted.books_deleted, 2);
        assert!(matches!(
            repo.get(author.id).await,
            Err(RepoError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_author_is_not_found() {
        let repo = AuthorRepository::new(migrated_db().await);
        let err = repo
            .delete(7, AuthorDeletePolicy::Cascade)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { id: 7, .. }));
    }
}
