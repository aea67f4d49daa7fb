use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource::{self, set, DocMeta, Resource};

/// An image uploaded to the media host. Created only through the upload
/// endpoint; admins may edit the alt text afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(flatten)]
    pub meta: DocMeta,
    pub url: String,
    pub public_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaAssetPatch {
    pub alt: Option<String>,
}

impl Resource for MediaAsset {
    const COLLECTION: &'static str = "media";
    const NAME: &'static str = "media asset";

    type Patch = MediaAssetPatch;

    fn meta(&self) -> &DocMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocMeta {
        &mut self.meta
    }

    fn remote_asset(&self) -> Option<&str> {
        Some(&self.public_id)
    }

    fn apply(&mut self, patch: MediaAssetPatch) -> Result<usize, AppError> {
        let mut applied = 0;
        if let Some(alt) = patch.alt {
            set(&mut self.alt, resource::optional_text(Some(alt)), &mut applied);
        }
        Ok(applied)
    }
}
