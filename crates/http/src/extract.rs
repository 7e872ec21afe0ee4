//! Extractors whose rejections use the [`AppError`] envelope.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// JSON request body.
///
/// Type mismatches become validation errors (422); malformed JSON or a
/// missing `application/json` content type become bad requests (400).
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Payload(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => AppError::validation(
                vec![json!({"field": "body", "error": err.body_text()})],
                "request body has an unexpected shape",
            ),
            JsonRejection::JsonSyntaxError(err) => {
                AppError::bad_request(format!("malformed JSON body: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => {
                AppError::bad_request("expected request with `Content-Type: application/json`")
            }
            other => AppError::bad_request(other.body_text()),
        }
    }
}

/// Positive integer id taken from the single `{id}` path segment.
///
/// Anything that is not a positive integer cannot name a stored row, so it is
/// reported as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        raw.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(PathId)
            .ok_or_else(|| AppError::not_found(format!("no resource with id '{}'", raw)))
    }
}
