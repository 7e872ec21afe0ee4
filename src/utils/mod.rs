//! Project-specific utilities live here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("biblio::{module}")
}

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> axum::Json<Self> {
        axum::Json(Self { data })
    }
}

/// Current UTC time as an RFC 3339 string, the stored timestamp format.
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::UNIX_EPOCH.to_string())
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// OpenAPI response object referencing the shared error schema.
pub fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

/// OpenAPI response object wrapping `schema` in the data envelope.
pub fn data_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "data": schema },
                    "required": ["data"]
                }
            }
        }
    })
}

/// OpenAPI `$ref` to a component schema.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_rfc3339() {
        let now = now_timestamp();
        assert!(OffsetDateTime::parse(&now, &Rfc3339).is_ok());
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        bio: Option<Option<String>>,
    }

    #[test]
    fn nullable_separates_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"bio": "x"}"#).unwrap();
        assert_eq!(absent.bio, None);
        assert_eq!(cleared.bio, Some(None));
        assert_eq!(set.bio, Some(Some("x".to_string())));
    }

    #[test]
    fn data_envelope_shape() {
        let body = serde_json::to_value(&Data::new(vec![1, 2]).0).unwrap();
        assert_eq!(body, json!({"data": [1, 2]}));
    }
}
