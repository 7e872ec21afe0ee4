use biblio_db::DbError;
use biblio_http::error::AppError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// One rejected input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

/// Repository failures shared by the authors and books modules.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid {entity}")]
    Validation {
        entity: &'static str,
        violations: Vec<FieldError>,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        details: Vec<serde_json::Value>,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { .. } => AppError::not_found(err.to_string()),
            RepoError::Validation { entity, violations } => AppError::validation(
                violations
                    .iter()
                    .map(|v| json!({"field": v.field, "error": v.error}))
                    .collect(),
                format!("invalid {} payload", entity),
            ),
            RepoError::Conflict { message, details } => AppError::conflict(details, message),
            RepoError::Db(db) => AppError::Internal(db.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_to_http_statuses() {
        let not_found: AppError = RepoError::NotFound {
            entity: "author",
            id: 4,
        }
        .into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "not found: author 4 not found");

        let invalid: AppError = RepoError::Validation {
            entity: "book",
            violations: vec![FieldError {
                field: "title",
                error: "required",
            }],
        }
        .into();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let db: AppError = RepoError::Db(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
