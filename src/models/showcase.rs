use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

pub const MAX_SHOWCASE_ITEMS: usize = 12;

/// A dish photo featured in the public food showcase strip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodShowcaseItem {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodShowcaseFields {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub description: Option<String>,
    pub visible: Option<bool>,
    pub order: Option<i64>,
}

impl Resource for FoodShowcaseItem {
    const COLLECTION: &'static str = "food_showcase";
    const NAME: &'static str = "food showcase item";

    type Patch = FoodShowcaseFields;

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

    fn apply(&mut self, patch: FoodShowcaseFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(title) = patch.title {
            set(&mut self.title, resource::text("title", title)?, &mut applied);
        }
        if let Some(image_url) = patch.image_url {
            set(&mut self.image_url, resource::url("imageUrl", image_url)?, &mut applied);
        }
        if let Some(public_id) = patch.image_public_id {
            set(&mut self.image_public_id, resource::optional_text(Some(public_id)), &mut applied);
        }
        if let Some(description) = patch.description {
            set(&mut self.description, resource::optional_text(Some(description)), &mut applied);
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

impl Creatable for FoodShowcaseItem {
    type Create = FoodShowcaseFields;

    const MAX_ITEMS: Option<usize> = Some(MAX_SHOWCASE_ITEMS);

    fn create(input: FoodShowcaseFields, meta: DocMeta) -> Result<Self, AppError> {
        let image_url = resource::required_text("imageUrl", input.image_url)?;
        Ok(Self {
            meta,
            title: resource::required_text("title", input.title)?,
            image_url: resource::url("imageUrl", image_url)?,
            image_public_id: resource::optional_text(input.image_public_id),
            description: resource::optional_text(input.description),
            visible: Some(input.visible.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
