//! Shared fixtures for handler and adapter tests.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::connect_info::MockConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::config::{AppConfig, StorageConfig, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use crate::db::MemoryContentStore;
use crate::media::{MediaError, ObjectStore};
use crate::session::AdminCredentials;
use crate::{create_app, AppState};

pub const TEST_STORAGE_BASE: &str = "https://cdn.test";
pub const TEST_PUBLIC_PREFIX: &str = "https://cdn.test/storage/v1/object/public/portfolio-images";

// ============================================================================
// Object store double
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    prefix: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn insert(&self, path: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), vec![0x89, 0x50, 0x4E, 0x47]);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), MediaError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), MediaError> {
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_prefix(&self) -> String {
        self.prefix.clone()
    }

    async fn probe(&self) -> Result<(), MediaError> {
        Ok(())
    }
}

// ============================================================================
// Application fixture
// ============================================================================

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env();
    config.environment = "test".to_string();
    config.database = None;
    config.admin.email = DEFAULT_ADMIN_EMAIL.to_string();
    config.admin.password_hash = None;
    config.admin.password = DEFAULT_ADMIN_PASSWORD.to_string();
    config.admin.jwt_secret = "test-secret".to_string();
    config.storage = StorageConfig::Supabase {
        base_url: TEST_STORAGE_BASE.to_string(),
        service_key: "test-service-key".to_string(),
        bucket: "portfolio-images".to_string(),
    };
    config.contact.access_key = "test-access-key".to_string();
    config.contact.to_email = None;
    config.github.handle = None;
    config.site.url = "https://portfolio.test".to_string();
    config.site.owner_name = "Ada Lovelace".to_string();
    config
}

/// Full router over in-memory content and object stores.
pub struct TestApp {
    pub state: AppState,
    pub content: Arc<MemoryContentStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = test_config();
        adjust(&mut config);

        // Minimum bcrypt cost keeps the suite fast.
        let credentials =
            AdminCredentials::with_cost(&config.admin.email, &config.admin.password, 4).unwrap();
        let content = Arc::new(MemoryContentStore::new());
        let objects = Arc::new(MemoryObjectStore::new(TEST_PUBLIC_PREFIX));
        let state = AppState::new(config, content.clone(), objects.clone(), credentials);

        Self {
            state,
            content,
            objects,
        }
    }

    pub fn router(&self) -> Router {
        create_app(self.state.clone())
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 12345))))
    }

    /// Bearer token for a freshly issued admin session.
    pub fn admin_token(&self) -> String {
        self.state
            .sessions
            .issue(&self.state.config.admin.email)
            .unwrap()
            .token
    }
}

// ============================================================================
// Request helpers
// ============================================================================

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

fn to_json(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap()
    }
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, req).await;
    (status, to_json(&bytes))
}

pub async fn admin_get(app: Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::get(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(app, req).await;
    (status, to_json(&bytes))
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    json: &Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = builder
        .body(Body::from(serde_json::to_vec(json).unwrap()))
        .unwrap();
    let (status, bytes) = send(app, req).await;
    (status, to_json(&bytes))
}

pub async fn post_json(app: Router, uri: &str, json: &Value) -> (StatusCode, Value) {
    send_json(app, Method::POST, uri, None, json).await
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
