use serde::{Deserialize, Serialize};

use crate::modules::validation::Violations;

pub const TITLE_MAX_CHARS: usize = 255;

/// Stored book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Server-assigned identifier
    pub id: i64,
    pub title: String,
    /// Owning author; always references an existing author
    pub author_id: i64,
    /// Normalized ISBN-10 or ISBN-13, digits only (ISBN-10 may end in `X`)
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for `POST /api/books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
}

/// Request body for `PUT /api/books/{id}`; absent fields stay unchanged and
/// an explicit `null` clears optional metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::utils::nullable")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::utils::nullable")]
    pub published_year: Option<Option<i32>>,
}

/// Validated book fields; the author reference is checked against storage
/// separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: i64,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub isbn: Option<Option<String>>,
    pub published_year: Option<Option<i32>>,
}

impl CreateBook {
    pub fn check(&self, v: &mut Violations) -> Option<NewBook> {
        let title = v.required_text("title", self.title.as_deref(), TITLE_MAX_CHARS);
        if self.author_id.is_none() {
            v.add("author_id", crate::modules::validation::REQUIRED);
        }
        let isbn = v.isbn("isbn", self.isbn.as_deref());
        let published_year = v.past_year("published_year", self.published_year);

        Some(NewBook {
            title: title?,
            author_id: self.author_id?,
            isbn,
            published_year,
        })
    }
}

impl UpdateBook {
    pub fn check(&self, v: &mut Violations) -> BookChanges {
        BookChanges {
            title: self
                .title
                .as_deref()
                .and_then(|title| v.required_text("title", Some(title), TITLE_MAX_CHARS)),
            author_id: self.author_id,
            isbn: self.isbn.as_ref().map(|isbn| v.isbn("isbn", isbn.as_deref())),
            published_year: self
                .published_year
                .map(|year| v.past_year("published_year", year)),
        }
    }
}

impl BookChanges {
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(published_year) = self.published_year {
            book.published_year = published_year;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::error::RepoError;

    #[test]
    fn create_collects_all_missing_fields() {
        let mut v = Violations::new("book");
        let new = CreateBook::default().check(&mut v);

        match v.resolve(new) {
            Err(RepoError::Validation { violations, .. }) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["title", "author_id"]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn create_normalizes_isbn() {
        let mut v = Violations::new("book");
        let input = CreateBook {
            title: Some("The Left Hand of Darkness".to_string()),
            author_id: Some(1),
            isbn: Some("0-441-47812-3".to_string()),
            published_year: Some(1969),
        };
        let new = input.check(&mut v);
        let new = v.resolve(new).unwrap();
        assert_eq!(new.isbn.as_deref(), Some("0441478123"));
    }

    #[test]
    fn update_can_clear_isbn() {
        let body: UpdateBook = serde_json::from_str(r#"{"isbn": null}"#).unwrap();
        let mut v = Violations::new("book");
        let changes = body.check(&mut v);
        assert!(v.is_empty());
        assert_eq!(changes.isbn, Some(None));
        assert_eq!(changes.title, None);
    }

    #[test]
    fn update_rejects_malformed_isbn() {
        let body: UpdateBook = serde_json::from_str(r#"{"isbn": "not-an-isbn"}"#).unwrap();
        let mut v = Violations::new("book");
        body.check(&mut v);
        assert!(v.finish().is_err());
    }
}
