use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

/// A past or upcoming event shown as a highlight on the public site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHighlight {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHighlightFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub visible: Option<bool>,
    pub order: Option<i64>,
}

impl Resource for EventHighlight {
    const COLLECTION: &'static str = "events";
    const NAME: &'static str = "event";

    type Patch = EventHighlightFields;

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

    fn remote_asset(&self) -> Option<&str> {
        self.image_public_id.as_deref()
    }

    fn apply(&mut self, patch: EventHighlightFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(title) = patch.title {
            set(&mut self.title, resource::text("title", title)?, &mut applied);
        }
        if let Some(description) = patch.description {
            set(&mut self.description, resource::optional_text(Some(description)), &mut applied);
        }
        if let Some(date) = patch.date {
            set(&mut self.date, Some(date), &mut applied);
        }
        if let Some(location) = patch.location {
            set(&mut self.location, resource::optional_text(Some(location)), &mut applied);
        }
        if let Some(image_url) = patch.image_url {
            set(&mut self.image_url, Some(resource::url("imageUrl", image_url)?), &mut applied);
        }
        if let Some(public_id) = patch.image_public_id {
            set(&mut self.image_public_id, resource::optional_text(Some(public_id)), &mut applied);
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

impl Creatable for EventHighlight {
    type Create = EventHighlightFields;

    fn create(input: EventHighlightFields, meta: DocMeta) -> Result<Self, AppError> {
        Ok(Self {
            meta,
            title: resource::required_text("title", input.title)?,
            description: resource::optional_text(input.description),
            date: input.date,
            location: resource::optional_text(input.location),
            image_url: input
                .image_url
                .map(|u| resource::url("imageUrl", u))
                .transpose()?,
            image_public_id: resource::optional_text(input.image_public_id),
            visible: Some(input.visible.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
