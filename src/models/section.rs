use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

/// Free-text block of site copy (hero, about, services, ...), addressed by `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSectionFields {
    pub key: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub visible: Option<bool>,
    pub order: Option<i64>,
}

fn section_key(value: String) -> Result<String, AppError> {
    let key = resource::text("key", value)?.to_lowercase();
    let valid = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(key)
    } else {
        Err(AppError::validation(
            "key may only contain letters, digits, '-' and '_'",
        ))
    }
}

impl Resource for ContentSection {
    const COLLECTION: &'static str = "content";
    const NAME: &'static str = "content section";

    type Patch = ContentSectionFields;

    fn meta(&self) -> &DocMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocMeta {
        &mut self.meta
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    fn apply(&mut self, patch: ContentSectionFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(key) = patch.key {
            set(&mut self.key, section_key(key)?, &mut applied);
        }
        if let Some(title) = patch.title {
            set(&mut self.title, resource::optional_text(Some(title)), &mut applied);
        }
        if let Some(body) = patch.body {
            set(&mut self.body, resource::text("body", body)?, &mut applied);
        }
        if let Some(visible) = patch.visible {
            set(&mut self.visible, Some(visible), &mut applied);
        }
        if let Some(order) = patch.order {
            set(&mut self.order, order, &mut applied);
        }
        Ok(applied)
    }
}

impl Creatable for ContentSection {
    type Create = ContentSectionFields;

    fn create(input: ContentSectionFields, meta: DocMeta) -> Result<Self, AppError> {
        let key = resource::required_text("key", input.key)?;
        Ok(Self {
            meta,
            key: section_key(key)?,
            title: resource::optional_text(input.title),
            body: resource::required_text("body", input.body)?,
            visible: Some(input.visible.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
