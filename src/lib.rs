//! Portfolio CMS - public portfolio API plus the admin content surface

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod media;
pub mod presentation;
pub mod routes;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use once_cell::sync::Lazy;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{AppConfig, StorageConfig};
use crate::db::{ContentStore, MemoryContentStore, PgContentStore};
use crate::error::StartupError;
use crate::media::{LocalObjectStore, MediaUploader, ObjectStore, SupabaseObjectStore};
use crate::session::{AdminCredentials, LoginThrottle, SessionRegistry};

/// Global request-body cap.
const BODY_LIMIT: usize = 2 * 1024 * 1024;
/// Upload route cap: the 5 MiB file limit plus multipart framing.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Shared client for outbound calls (storage, form relay, GitHub).
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("portfolio-cms/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
});

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub media: MediaUploader,
    pub credentials: Arc<AdminCredentials>,
    pub sessions: Arc<SessionRegistry>,
    pub login_throttle: Arc<LoginThrottle>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ContentStore>,
        object_store: Arc<dyn ObjectStore>,
        credentials: AdminCredentials,
    ) -> Self {
        let sessions =
            SessionRegistry::new(config.admin.jwt_secret.clone(), config.admin.session_ttl_hours);
        Self {
            config: Arc::new(config),
            store,
            media: MediaUploader::new(object_store),
            credentials: Arc::new(credentials),
            sessions: Arc::new(sessions),
            login_throttle: Arc::new(LoginThrottle::new()),
        }
    }
}

pub fn object_store_for(storage: &StorageConfig) -> Arc<dyn ObjectStore> {
    match storage {
        StorageConfig::Local { root, public_base } => {
            Arc::new(LocalObjectStore::new(root.clone(), public_base.clone()))
        }
        StorageConfig::Supabase {
            base_url,
            service_key,
            bucket,
        } => Arc::new(SupabaseObjectStore::new(
            HTTP_CLIENT.clone(),
            base_url.clone(),
            service_key.clone(),
            bucket.clone(),
        )),
    }
}

/// Configure CORS from the configured origin list.
pub fn configure_cors(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config.allowed_origins);
    tracing::info!("CORS configured");

    let uploads = Router::new()
        .route(
            "/api/admin/uploads",
            post(routes::upload::upload_media).delete(routes::upload::release_media),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(UPLOAD_BODY_LIMIT));

    let api = Router::new()
        // public content
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects/{id}", get(routes::projects::get_project))
        .route("/api/blog", get(routes::blog::list_posts))
        .route("/api/blog/{id}", get(routes::blog::get_post))
        .route("/api/blog/{id}/related", get(routes::blog::related_posts))
        .route("/api/skills", get(routes::skills::list_skills))
        .route("/api/settings", get(routes::settings::get_settings))
        .route("/api/site", get(routes::site::get_site))
        .route("/api/resume", get(routes::site::get_resume))
        .route("/api/github/activity", get(routes::github::get_activity))
        .route("/api/contact", post(routes::contact::send_message))
        .route("/api/logs", post(routes::logs::receive_client_logs))
        .route("/rss.xml", get(routes::rss::rss_feed))
        // admin gate
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/session", get(routes::auth::session))
        .route("/api/auth/logout", post(routes::auth::logout))
        // admin content
        .route("/api/admin/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/api/admin/projects",
            get(routes::projects::admin_list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/admin/projects/{id}",
            get(routes::projects::admin_get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/admin/blog",
            get(routes::blog::admin_list_posts).post(routes::blog::create_post),
        )
        .route(
            "/api/admin/blog/{id}",
            get(routes::blog::admin_get_post)
                .patch(routes::blog::update_post)
                .delete(routes::blog::delete_post),
        )
        .route(
            "/api/admin/skills",
            get(routes::skills::admin_list_skills).post(routes::skills::create_skill),
        )
        .route(
            "/api/admin/skills/{id}",
            get(routes::skills::admin_get_skill)
                .patch(routes::skills::update_skill)
                .delete(routes::skills::delete_skill),
        )
        .route(
            "/api/admin/settings",
            get(routes::settings::admin_get_settings).put(routes::settings::update_settings),
        )
        .route(
            "/api/admin/settings/profile-image",
            delete(routes::settings::remove_profile_image),
        )
        // health
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/storage", get(routes::health::health_storage))
        .route("/health/ready", get(routes::health::health_ready))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT));

    let mut app = api.merge(uploads);

    if let StorageConfig::Local { root, public_base } = &state.config.storage {
        if public_base.starts_with('/') {
            app = app.nest_service(public_base.trim_end_matches('/'), ServeDir::new(root));
        }
    }

    app.layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Held until the server stops; dropping them loses buffered log lines.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    config.check_production().map_err(StartupError::Config)?;

    let store: Arc<dyn ContentStore> = match &config.database {
        Some(db_config) => {
            let pool = db::init_pool(db_config).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgContentStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Content is kept in memory only.");
            Arc::new(MemoryContentStore::new())
        }
    };

    let object_store = object_store_for(&config.storage);
    if let Err(e) = object_store.probe().await {
        tracing::warn!("Object storage probe failed: {}. Uploads may fail.", e);
    }

    let admin = config.admin.clone();
    let credentials = tokio::task::spawn_blocking(move || AdminCredentials::from_config(&admin))
        .await
        .map_err(|e| StartupError::Config(format!("credential setup aborted: {}", e)))??;

    let (host, port) = (config.host.clone(), config.port);
    let app = create_app(AppState::new(config, store, object_store, credentials));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{get_json, TestApp};
    use axum::http::StatusCode;

    #[test]
    fn test_cors_skips_bad_origins() {
        let _layer = configure_cors(&["http://localhost:3000".to_string(), "\n".to_string()]);
    }

    #[tokio::test]
    async fn test_create_app_serves_health() {
        let app = TestApp::new().await;
        let (status, body) = get_json(app.router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = TestApp::new().await;
        let res = app
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }
}
