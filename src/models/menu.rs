use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

/// Body of both create and partial-update requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub visible: Option<bool>,
    pub order: Option<i64>,
}

impl Resource for MenuItem {
    const COLLECTION: &'static str = "menu";
    const NAME: &'static str = "menu item";

    type Patch = MenuItemFields;

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

    fn apply(&mut self, patch: MenuItemFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(name) = patch.name {
            set(&mut self.name, resource::text("name", name)?, &mut applied);
        }
        if let Some(description) = patch.description {
            set(&mut self.description, resource::optional_text(Some(description)), &mut applied);
        }
        if let Some(price) = patch.price {
            set(&mut self.price, resource::price("price", price)?, &mut applied);
        }
        if let Some(category) = patch.category {
            set(&mut self.category, resource::optional_text(Some(category)), &mut applied);
        }
        if let Some(tags) = patch.tags {
            set(&mut self.tags, resource::tags(tags), &mut applied);
        }
        if let Some(image_url) = patch.image_url {
            set(&mut self.image_url, Some(resource::url("imageUrl", image_url)?), &mut applied);
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

impl Creatable for MenuItem {
    type Create = MenuItemFields;

    fn create(input: MenuItemFields, meta: DocMeta) -> Result<Self, AppError> {
        let price = input
            .price
            .ok_or_else(|| AppError::validation("price is required"))?;

        Ok(Self {
            meta,
            name: resource::required_text("name", input.name)?,
            description: resource::optional_text(input.description),
            price: resource::price("price", price)?,
            category: resource::optional_text(input.category),
            tags: resource::tags(input.tags.unwrap_or_default()),
            image_url: input
                .image_url
                .map(|u| resource::url("imageUrl", u))
                .transpose()?,
            visible: Some(input.visible.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
