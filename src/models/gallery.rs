use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemFields {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub category: Option<String>,
    pub visible: Option<bool>,
    pub order: Option<i64>,
}

impl Resource for GalleryItem {
    const COLLECTION: &'static str = "gallery";
    const NAME: &'static str = "gallery item";

    type Patch = GalleryItemFields;

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

    fn apply(&mut self, patch: GalleryItemFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(title) = patch.title {
            set(&mut self.title, resource::text("title", title)?, &mut applied);
        }
        if let Some(caption) = patch.caption {
            set(&mut self.caption, resource::optional_text(Some(caption)), &mut applied);
        }
        if let Some(image_url) = patch.image_url {
            set(&mut self.image_url, resource::url("imageUrl", image_url)?, &mut applied);
        }
        if let Some(public_id) = patch.image_public_id {
            set(&mut self.image_public_id, resource::optional_text(Some(public_id)), &mut applied);
        }
        if let Some(category) = patch.category {
            set(&mut self.category, resource::optional_text(Some(category)), &mut applied);
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

impl Creatable for GalleryItem {
    type Create = GalleryItemFields;

    fn create(input: GalleryItemFields, meta: DocMeta) -> Result<Self, AppError> {
        let image_url = resource::required_text("imageUrl", input.image_url)?;
        Ok(Self {
            meta,
            title: resource::required_text("title", input.title)?,
            caption: resource::optional_text(input.caption),
            image_url: resource::url("imageUrl", image_url)?,
            image_public_id: resource::optional_text(input.image_public_id),
            category: resource::optional_text(input.category),
            visible: Some(input.visible.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
