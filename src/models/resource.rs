//! Shared shape of the admin-managed content collections.
//!
//! Every collection is a set of flat documents with an id, an explicit sort
//! order and (for most of them) a visibility flag. The generic handlers in
//! `handlers::content` and `handlers::public` work against these traits.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocMeta {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Human name used in error messages, e.g. "menu item".
    const NAME: &'static str;

    type Patch: DeserializeOwned + Send;

    fn meta(&self) -> &DocMeta;
    fn meta_mut(&mut self) -> &mut DocMeta;

    fn order(&self) -> i64 {
        0
    }

    /// Absent flags count as visible; only an explicit `false` hides a document.
    fn is_visible(&self) -> bool {
        true
    }

    /// Id of an image hosted on the media service that should be removed
    /// together with this document.
    fn remote_asset(&self) -> Option<&str> {
        None
    }

    /// Validates and applies the supplied fields, returning how many were applied.
    fn apply(&mut self, patch: Self::Patch) -> Result<usize, AppError>;
}

pub trait Creatable: Resource {
    type Create: DeserializeOwned + Send;

    const MAX_ITEMS: Option<usize> = None;

    fn create(input: Self::Create, meta: DocMeta) -> Result<Self, AppError>;
}

pub fn sort_by_order<R: Resource>(items: &mut [R]) {
    items.sort_by_key(|item| item.order());
}

// ── Field validation ──

pub fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

pub fn text(field: &str, value: String) -> Result<String, AppError> {
    required_text(field, Some(value))
}

/// Trims optional text; an empty string clears the field.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn price(field: &str, value: f64) -> Result<f64, AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::validation(format!("{field} must be a number >= 0")))
    }
}

pub fn rating(value: u8) -> Result<u8, AppError> {
    if (1..=5).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::validation("rating must be between 1 and 5"))
    }
}

pub fn url(field: &str, value: String) -> Result<String, AppError> {
    let value = text(field, value)?;
    if value.starts_with("https://") || value.starts_with("http://") || value.starts_with('/') {
        Ok(value)
    } else {
        Err(AppError::validation(format!("{field} must be an http(s) URL or absolute path")))
    }
}

pub fn tags(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Counts a patched field while applying it.
pub fn set<T>(slot: &mut T, value: T, applied: &mut usize) {
    *slot = value;
    *applied += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", Some(" Tacos ".into())).unwrap(), "Tacos");
        assert!(required_text("name", Some("   ".into())).is_err());
        assert!(required_text("name", None).is_err());
    }

    #[test]
    fn test_price_and_rating_ranges() {
        assert!(price("price", 0.0).is_ok());
        assert!(price("price", -1.0).is_err());
        assert!(price("price", f64::NAN).is_err());
        assert!(rating(1).is_ok());
        assert!(rating(5).is_ok());
        assert!(rating(0).is_err());
        assert!(rating(6).is_err());
    }

    #[test]
    fn test_url() {
        assert!(url("imageUrl", "https://cdn.example.com/a.jpg".into()).is_ok());
        assert!(url("imageUrl", "/static/a.jpg".into()).is_ok());
        assert!(url("imageUrl", "javascript:alert(1)".into()).is_err());
    }

    #[test]
    fn test_tags_drop_blanks() {
        assert_eq!(
            tags(vec![" vegan ".into(), "".into(), "gf".into()]),
            vec!["vegan".to_string(), "gf".to_string()]
        );
    }
}
