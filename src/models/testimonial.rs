use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, Creatable, DocMeta, Resource};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub client_name: String,
    pub text: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Publication flag; testimonials use approval instead of visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialFields {
    pub client_name: Option<String>,
    pub text: Option<String>,
    pub rating: Option<u8>,
    pub event_type: Option<String>,
    pub approved: Option<bool>,
    pub order: Option<i64>,
}

impl Resource for Testimonial {
    const COLLECTION: &'static str = "testimonials";
    const NAME: &'static str = "testimonial";

    type Patch = TestimonialFields;

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
        self.approved != Some(false)
    }

    fn apply(&mut self, patch: TestimonialFields) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(name) = patch.client_name {
            set(&mut self.client_name, resource::text("clientName", name)?, &mut applied);
        }
        if let Some(text) = patch.text {
            set(&mut self.text, resource::text("text", text)?, &mut applied);
        }
        if let Some(rating) = patch.rating {
            set(&mut self.rating, resource::rating(rating)?, &mut applied);
        }
        if let Some(event_type) = patch.event_type {
            set(&mut self.event_type, resource::optional_text(Some(event_type)), &mut applied);
        }
        if let Some(approved) = patch.approved {
            set(&mut self.approved, Some(approved), &mut applied);
        }
        if let Some(order) = patch.order {
            set(&mut self.order, order, &mut applied);
        }
        Ok(applied)
    }
}

impl Creatable for Testimonial {
    type Create = TestimonialFields;

    fn create(input: TestimonialFields, meta: DocMeta) -> Result<Self, AppError> {
        let rating = input
            .rating
            .ok_or_else(|| AppError::validation("rating is required"))?;
        Ok(Self {
            meta,
            client_name: resource::required_text("clientName", input.client_name)?,
            text: resource::required_text("text", input.text)?,
            rating: resource::rating(rating)?,
            event_type: resource::optional_text(input.event_type),
            approved: Some(input.approved.unwrap_or(true)),
            order: input.order.unwrap_or(0),
        })
    }
}
