use serde::{Deserialize, Serialize};

use crate::modules::validation::Violations;

pub const NAME_MAX_CHARS: usize = 255;
pub const BIO_MAX_CHARS: usize = 2000;

/// Stored author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Server-assigned identifier
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub birth_year: Option<i32>,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 time of the last update
    pub updated_at: String,
}

/// Request body for `POST /api/authors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
}

/// Request body for `PUT /api/authors/{id}`; absent fields stay unchanged and
/// an explicit `null` clears optional metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::utils::nullable")]
    pub birth_year: Option<Option<i32>>,
}

/// Validated author fields ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub bio: Option<String>,
    pub birth_year: Option<i32>,
}

/// Validated changes for an existing author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub bio: Option<Option<String>>,
    pub birth_year: Option<Option<i32>>,
}

impl CreateAuthor {
    pub fn check(&self, v: &mut Violations) -> Option<NewAuthor> {
        let name = v.required_text("name", self.name.as_deref(), NAME_MAX_CHARS);
        let bio = v.optional_text("bio", self.bio.as_deref(), BIO_MAX_CHARS);
        let birth_year = v.past_year("birth_year", self.birth_year);

        Some(NewAuthor {
            name: name?,
            bio,
            birth_year,
        })
    }
}

impl UpdateAuthor {
    pub fn check(&self, v: &mut Violations) -> AuthorChanges {
        AuthorChanges {
            name: self
                .name
                .as_deref()
                .and_then(|name| v.required_text("name", Some(name), NAME_MAX_CHARS)),
            bio: self
                .bio
                .as_ref()
                .map(|bio| v.optional_text("bio", bio.as_deref(), BIO_MAX_CHARS)),
            birth_year: self
                .birth_year
                .map(|year| v.past_year("birth_year", year)),
        }
    }
}

impl AuthorChanges {
    pub fn apply(self, author: &mut Author) {
        if let Some(name) = self.name {
            author.name = name;
        }
        if let Some(bio) = self.bio {
            author.bio = bio;
        }
        if let Some(birth_year) = self.birth_year {
            author.birth_year = birth_year;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 1,
            name: "Ursula K. Le Guin".to_string(),
            bio: Some("Wrote Earthsea".to_string()),
            birth_year: Some(1929),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn create_requires_name() {
        let mut v = Violations::new("author");
        let new = CreateAuthor::default().check(&mut v);
        assert!(new.is_none());
        assert!(!v.is_empty());
    }

    #[test]
    fn create_trims_fields() {
        let mut v = Violations::new("author");
        let input = CreateAuthor {
            name: Some("  Octavia E. Butler ".to_string()),
            bio: Some("   ".to_string()),
            birth_year: Some(1947),
        };
        let new = input.check(&mut v).unwrap();
        assert!(v.is_empty());
        assert_eq!(new.name, "Octavia E. Butler");
        assert_eq!(new.bio, None);
        assert_eq!(new.birth_year, Some(1947));
    }

    #[test]
    fn update_applies_only_present_fields() {
        let body: UpdateAuthor =
            serde_json::from_str(r#"{"bio": null, "birth_year": 1930}"#).unwrap();
        let mut v = Violations::new("author");
        let changes = body.check(&mut v);
        assert!(v.is_empty());

        let mut stored = author();
        changes.apply(&mut stored);
        assert_eq!(stored.name, "Ursula K. Le Guin");
        assert_eq!(stored.bio, None);
        assert_eq!(stored.birth_year, Some(1930));
    }

    #[test]
    fn update_rejects_blank_name() {
        let body: UpdateAuthor = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        let mut v = Violations::new("author");
        body.check(&mut v);
        assert!(v.finish().is_err());
    }
}
