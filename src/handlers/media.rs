use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::errors::{AppError, Result};
use crate::handlers::ApiJson;
use crate::models::resource::optional_text;
use crate::models::{DocMeta, MediaAsset, Resource};
use crate::services::media::{normalize_upload, thumbnail_url, ThumbnailOptions, UploadError, UploadRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UploadBody {
    pub file: Option<String>,
    pub filename: Option<String>,
    pub folder: Option<String>,
    pub alt: Option<String>,
}

// POST /api/admin/media
pub async fn upload(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<UploadBody>,
) -> Result<(StatusCode, Json<MediaAsset>)> {
    let file = body
        .file
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::validation("file is required"))?;
    let filename = optional_text(body.filename);

    let (data_uri, size) = normalize_upload(&file, filename.as_deref()).map_err(|e| match e {
        UploadError::TooLarge => AppError::PayloadTooLarge(e.to_string()),
        _ => AppError::validation(e.to_string()),
    })?;

    let media = state
        .media
        .as_deref()
        .ok_or_else(|| AppError::Upstream("media host is not configured".to_string()))?;

    let request = UploadRequest {
        data_uri,
        folder: optional_text(body.folder),
    };
    let uploaded = media.upload(&request).await.map_err(|e| {
        tracing::error!(error = %e, size, "image upload failed");
        AppError::Upstream(format!("image upload failed: {e}"))
    })?;

    let asset = MediaAsset {
        meta: DocMeta::new(Utc::now()),
        url: uploaded.url,
        public_id: uploaded.public_id,
        filename,
        format: uploaded.format,
        width: uploaded.width,
        height: uploaded.height,
        bytes: uploaded.bytes.or(Some(size as u64)),
        alt: optional_text(body.alt),
    };
    db::insert(state.store.as_ref(), MediaAsset::COLLECTION, &asset.meta.id, &asset).await?;

    tracing::info!(id = %asset.meta.id, public_id = %asset.public_id, size, "media uploaded");
    Ok((StatusCode::CREATED, Json(asset)))
}

#[derive(Deserialize)]
pub struct ThumbnailSource {
    pub url: Option<String>,
}

// GET /api/admin/media/thumbnail
pub async fn thumbnail(
    Query(source): Query<ThumbnailSource>,
    Query(options): Query<ThumbnailOptions>,
) -> Result<Json<Value>> {
    let url = source
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::validation("url is required"))?;

    let thumbnail = thumbnail_url(url.trim(), &options).map_err(|e| AppError::validation(e.to_string()))?;
    Ok(Json(json!({ "url": thumbnail })))
}
