use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Url;
use serde::Deserialize;
use sha1::{Digest, Sha1};

/// Largest upload accepted, after base64 decoding.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for uploads: the base64 form of `MAX_UPLOAD_BYTES` plus
/// room for the data URI header and the other JSON fields.
pub const MAX_UPLOAD_BODY_BYTES: usize = (MAX_UPLOAD_BYTES + 2) / 3 * 4 + 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// A `data:` URI.
    pub data_uri: String,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedAsset {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> anyhow::Result<UploadedAsset>;

    async fn delete(&self, public_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UploadError {
    #[error("file must be a base64 data URI or base64 string")]
    Malformed,
    #[error("only image uploads are accepted")]
    NotAnImage,
    #[error("file is larger than {MAX_UPLOAD_BYTES} bytes")]
    TooLarge,
}

/// Normalises an upload payload to a `data:image/...;base64,` URI. Bare base64
/// is accepted and tagged with the mime type guessed from the filename.
pub fn normalize_upload(file: &str, filename: Option<&str>) -> Result<(String, usize), UploadError> {
    let file = file.trim();
    let (mime, payload) = match file.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or(UploadError::Malformed)?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or(UploadError::Malformed)?;
            (mime.to_string(), payload)
        }
        None => (guess_mime(filename).to_string(), file),
    };

    if !mime.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| UploadError::Malformed)?;
    if decoded.is_empty() {
        return Err(UploadError::Malformed);
    }
    if decoded.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }

    Ok((format!("data:{mime};base64,{payload}"), decoded.len()))
}

fn guess_mime(filename: Option<&str>) -> &'static str {
    let ext = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailOptions {
    #[serde(rename = "w")]
    pub width: Option<u32>,
    #[serde(rename = "h")]
    pub height: Option<u32>,
    pub crop: Option<String>,
    #[serde(rename = "q")]
    pub quality: Option<String>,
    #[serde(rename = "f")]
    pub format: Option<String>,
}

/// Appends transformation parameters (`w`, `h`, `c`, `q`, `f`) to a hosted
/// image URL. Defaults to a 400px-wide, auto-quality, auto-format thumbnail.
pub fn thumbnail_url(image_url: &str, options: &ThumbnailOptions) -> anyhow::Result<String> {
    let mut url = Url::parse(image_url).context("invalid image URL")?;
    {
        let mut query = url.query_pairs_mut();
        let width = match (options.width, options.height) {
            (None, None) => Some(400),
            (w, _) => w,
        };
        if let Some(w) = width {
            query.append_pair("w", &w.to_string());
        }
        if let Some(h) = options.height {
            query.append_pair("h", &h.to_string());
        }
        query.append_pair("c", options.crop.as_deref().unwrap_or("fill"));
        query.append_pair("q", options.quality.as_deref().unwrap_or("auto"));
        query.append_pair("f", options.format.as_deref().unwrap_or("auto"));
    }
    Ok(url.to_string())
}

/// Cloudinary upload API with signed requests.
pub struct CloudinaryMedia {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    default_folder: String,
    client: reqwest::Client,
}

impl CloudinaryMedia {
    pub fn new(cloud_name: String, api_key: String, api_secret: String, default_folder: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            default_folder,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            self.cloud_name
        )
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

/// SHA-1 over the alphabetically sorted `key=value` pairs joined with `&`,
/// followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMedia {
    async fn upload(&self, request: &UploadRequest) -> anyhow::Result<UploadedAsset> {
        let timestamp = Self::timestamp();
        let folder = request
            .folder
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(self.default_folder.as_str());

        let signature = sign_params(&[("folder", folder), ("timestamp", timestamp.as_str())], &self.api_secret);

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .form(&[
                ("file", request.data_uri.as_str()),
                ("folder", folder),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .context("failed to call image upload API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse image upload response")?;
        if !status.is_success() {
            anyhow::bail!("image upload API error ({}): {}", status, data["error"]["message"]);
        }

        serde_json::from_value(data).context("unexpected image upload response")
    }

    async fn delete(&self, public_id: &str) -> anyhow::Result<()> {
        let timestamp = Self::timestamp();
        let signature = sign_params(&[("public_id", public_id), ("timestamp", timestamp.as_str())], &self.api_secret);

        let data: serde_json::Value = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .context("failed to call image delete API")?
            .error_for_status()
            .context("image delete API returned error")?
            .json()
            .await
            .context("failed to parse image delete response")?;

        match data["result"].as_str() {
            Some("ok") | Some("not found") => Ok(()),
            other => anyhow::bail!("image delete failed: {}", other.unwrap_or("unknown result")),
        }
    }
}
