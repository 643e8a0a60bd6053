//! Image uploads: validation, object naming, storage and release.

pub mod local;
pub mod supabase;

pub use local::LocalObjectStore;
pub use supabase::SupabaseObjectStore;

use async_trait::async_trait;
use rand::distr::{Alphanumeric, SampleString};
use serde::Deserialize;
use std::sync::Arc;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Image size should be less than 5MB")]
    TooLarge { size: usize },

    #[error("Empty file")]
    Empty,

    #[error("Please upload an image file")]
    NotAnImage,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Where an upload lands inside the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFolder {
    Blog,
    Profiles,
    #[default]
    Root,
}

impl MediaFolder {
    pub fn prefix(self) -> &'static str {
        match self {
            MediaFolder::Blog => "blog/",
            MediaFolder::Profiles => "profiles/",
            MediaFolder::Root => "",
        }
    }

    fn requires_image(self) -> bool {
        matches!(self, MediaFolder::Profiles)
    }
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Blob backend holding uploaded objects under slash-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), MediaError>;

    async fn remove(&self, path: &str) -> Result<(), MediaError>;

    /// URL prefix every object in this store is published under.
    fn public_prefix(&self) -> String;

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_prefix().trim_end_matches('/'), path)
    }

    /// Cheap reachability probe for health checks.
    async fn probe(&self) -> Result<(), MediaError>;
}

/// Validates uploads and keeps track of which URLs it owns.
#[derive(Clone)]
pub struct MediaUploader {
    store: Arc<dyn ObjectStore>,
}

impl MediaUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Checks preconditions and resolves the stored content type. No I/O.
    pub fn validate(file: &UploadFile, folder: MediaFolder) -> Result<String, MediaError> {
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(MediaError::TooLarge {
                size: file.bytes.len(),
            });
        }
        if file.bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        let content_type = file
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .or_else(|| sniff_image_mime(&file.bytes))
            .unwrap_or("application/octet-stream")
            .to_string();

        if folder.requires_image() && !content_type.starts_with("image/") {
            return Err(MediaError::NotAnImage);
        }
        Ok(content_type)
    }

    pub async fn upload(
        &self,
        file: UploadFile,
        folder: MediaFolder,
    ) -> Result<String, MediaError> {
        let content_type = Self::validate(&file, folder)?;
        let path = object_path(folder, file.file_name.as_deref(), &content_type);
        let size = file.bytes.len();

        self.store.put(&path, file.bytes, &content_type).await?;

        tracing::info!(path = %path, size, content_type = %content_type, "media uploaded");
        Ok(self.store.public_url(&path))
    }

    /// Object path for `url` if it points into this store.
    pub fn owned_path(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.store.public_prefix().trim_end_matches('/'));
        let path = url.trim().strip_prefix(&prefix)?;
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return None;
        }
        Some(path.to_string())
    }

    /// Deletes the object behind `url` if this store owns it.
    /// Foreign URLs are left alone and reported as `false`.
    pub async fn release(&self, url: &str) -> Result<bool, MediaError> {
        let Some(path) = self.owned_path(url) else {
            tracing::debug!(url = %url, "not a stored object, leaving untouched");
            return Ok(false);
        };
        self.store.remove(&path).await?;
        tracing::info!(path = %path, "media released");
        Ok(true)
    }
}

/// `<folder><token>-<millis>.<ext>`
pub fn object_path(folder: MediaFolder, file_name: Option<&str>, content_type: &str) -> String {
    let token = Alphanumeric
        .sample_string(&mut rand::rng(), 12)
        .to_lowercase();
    let millis = chrono::Utc::now().timestamp_millis();
    let ext = file_name
        .and_then(extension_of)
        .unwrap_or_else(|| extension_from_mime(content_type).to_string());
    format!("{}{}-{}.{}", folder.prefix(), token, millis, ext)
}

fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

fn extension_from_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// Identifies common image formats by their leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}
