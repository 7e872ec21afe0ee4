//! Field checks shared by author and book payloads.
//!
//! Checks record every violation instead of stopping at the first one, so a
//! single response can list all rejected fields.

use time::OffsetDateTime;

use super::error::{FieldError, RepoError, RepoResult};

pub const REQUIRED: &str = "required";
pub const TOO_LONG: &str = "too_long";
pub const IN_FUTURE: &str = "in_future";
pub const INVALID_FORMAT: &str = "invalid_format";
pub const NOT_FOUND: &str = "not_found";

#[derive(Debug, Default)]
pub struct Violations {
    entity: &'static str,
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            errors: Vec::new(),
        }
    }

    pub fn add(&mut self, field: &'static str, error: &'static str) {
        self.errors.push(FieldError { field, error });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Trimmed required text; `None` means the value was rejected.
    pub fn required_text(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        max_chars: usize,
    ) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.add(field, REQUIRED);
                None
            }
            Some(text) if text.chars().count() > max_chars => {
                self.add(field, TOO_LONG);
                None
            }
            Some(text) => Some(text.to_string()),
        }
    }

    /// Trimmed optional text; blank input is stored as absent.
    pub fn optional_text(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        max_chars: usize,
    ) -> Option<String> {
        let text = value.map(str::trim).filter(|text| !text.is_empty())?;
        if text.chars().count() > max_chars {
            self.add(field, TOO_LONG);
            return None;
        }
        Some(text.to_string())
    }

    /// Years may not lie after the current calendar year.
    pub fn past_year(&mut self, field: &'static str, year: Option<i32>) -> Option<i32> {
        let year = year?;
        if year > OffsetDateTime::now_utc().year() {
            self.add(field, IN_FUTURE);
            return None;
        }
        Some(year)
    }

    /// ISBN-10 or ISBN-13 with hyphens and spaces removed.
    pub fn isbn(&mut self, field: &'static str, value: Option<&str>) -> Option<String> {
        let raw = value.map(str::trim).filter(|raw| !raw.is_empty())?;
        match normalize_isbn(raw) {
            Some(isbn) => Some(isbn),
            None => {
                self.add(field, INVALID_FORMAT);
                None
            }
        }
    }

    /// `value` if nothing was rejected; checks return `None` only after
    /// recording a violation.
    pub fn resolve<T>(self, value: Option<T>) -> RepoResult<T> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(RepoError::Validation {
                entity: self.entity,
                violations: self.errors,
            }),
        }
    }

    pub fn finish(self) -> RepoResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(RepoError::Validation {
                entity: self.entity,
                violations: self.errors,
            })
        }
    }
}

fn normalize_isbn(raw: &str) -> Option<String> {
    let isbn: String = raw
        .chars()
        .filter(|c| *c != '-' && *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !isbn.is_ascii() {
        return None;
    }

    let valid = match isbn.len() {
        10 => {
            let (body, check) = isbn.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    valid.then_some(isbn)
}
