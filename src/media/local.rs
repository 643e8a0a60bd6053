use async_trait::async_trait;
use std::path::PathBuf;

use super::{MediaError, ObjectStore};

/// Stores objects as files under `root`; `/uploads` serves them back.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, MediaError> {
        if path.is_empty()
            || path.contains('\\')
            || path.contains('\0')
            || path.split('/').any(|seg| seg.is_empty() || seg == "..")
        {
            return Err(MediaError::Storage(format!("invalid object path: {}", path)));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), MediaError> {
        let file_path = self.file_path(path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Failed to create upload directory: {}", e);
                MediaError::Storage("failed to initialize upload directory".to_string())
            })?;
        }
        tokio::fs::write(&file_path, &bytes).await.map_err(|e| {
            tracing::error!("Failed to write upload file {}: {}", file_path.display(), e);
            MediaError::Storage("failed to save file".to_string())
        })
    }

    async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let file_path = self.file_path(path)?;
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Upload {} already gone", file_path.display());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to delete file {}: {}", file_path.display(), e);
                Err(MediaError::Storage("failed to delete file".to_string()))
            }
        }
    }

    fn public_prefix(&self) -> String {
        self.public_base.trim_end_matches('/').to_string()
    }

    async fn probe(&self) -> Result<(), MediaError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))
    }
}
