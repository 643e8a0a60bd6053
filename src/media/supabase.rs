/**
 * Supabase Storage backend
 * Objects live in one public bucket; URLs follow
 * `<base>/storage/v1/object/public/<bucket>/<path>`.
 */
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{MediaError, ObjectStore};

#[derive(Debug, Clone)]
pub struct SupabaseObjectStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseObjectStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
    }
}

async fn check(response: reqwest::Response, action: &str) -> Result<(), MediaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "storage {} failed", action);
    Err(MediaError::Storage(format!("{} failed with status {}", action, status)))
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), MediaError> {
        let response = self
            .authorized(self.client.post(self.object_url(path)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "storage upload request failed");
                MediaError::Storage(e.to_string())
            })?;
        check(response, "upload").await
    }

    async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/storage/v1/object/{}", self.base_url, self.bucket)),
            )
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "storage delete request failed");
                MediaError::Storage(e.to_string())
            })?;
        check(response, "delete").await
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}", self.base_url, self.bucket)
    }

    async fn probe(&self) -> Result<(), MediaError> {
        let response = self
            .authorized(
                self.client
                    .get(format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket)),
            )
            .send()
            .await
            .map_err(|e| MediaError::Storage(e.to_string()))?;
        check(response, "probe").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_urls_follow_bucket_layout() {
        let store = SupabaseObjectStore::new(
            reqwest::Client::new(),
            "https://abc.supabase.co/",
            "service-key",
            "portfolio-images",
        );
        assert_eq!(
            store.public_url("profiles/p-1.png"),
            "https://abc.supabase.co/storage/v1/object/public/portfolio-images/profiles/p-1.png"
        );
        assert_eq!(
            store.object_url("blog/x.jpg"),
            "https://abc.supabase.co/storage/v1/object/portfolio-images/blog/x.jpg"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_storage_error() {
        let store = SupabaseObjectStore::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "service-key",
            "portfolio-images",
        );
        let result = store.put("a.png", vec![1], "image/png").await;
        assert!(matches!(result, Err(MediaError::Storage(_))));
    }
}
