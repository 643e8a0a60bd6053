pub mod list;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;
pub use store::{ContentStore, StoreError, StoreResult};

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DbConfig {
    /// Reads pool settings; `None` when `DATABASE_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(Self {
            url,
            max_connections: crate::config::env_parse("DB_POOL_MAX", 10),
            min_connections: crate::config::env_parse("DB_POOL_MIN", 2),
            connect_timeout_secs: crate::config::env_parse("DB_CONNECT_TIMEOUT", 10),
            idle_timeout_secs: crate::config::env_parse("DB_IDLE_TIMEOUT", 300),
        })
    }

    /// Connection URL with the password replaced by `***`.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme), Some(at)) if at > scheme + 3 => {
                let credentials = &self.url[scheme + 3..at];
                match credentials.split_once(':') {
                    Some((user, _)) => format!(
                        "{}{}:***{}",
                        &self.url[..scheme + 3],
                        user,
                        &self.url[at..]
                    ),
                    None => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}

pub async fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    tracing::debug!("Database URL: {}", config.redacted_url());

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            tech JSONB NOT NULL DEFAULT '[]'::jsonb,
            status TEXT NOT NULL DEFAULT 'In Development',
            featured BOOLEAN NOT NULL DEFAULT false,
            github TEXT NOT NULL DEFAULT '',
            image TEXT
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            excerpt TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT 'Blockchain',
            read_time TEXT NOT NULL DEFAULT '',
            image TEXT,
            published BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_blog_posts_pub_created
            ON blog_posts(published, created_at DESC)
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_blog_posts_category
            ON blog_posts(category)
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id BIGSERIAL PRIMARY KEY,
            category TEXT NOT NULL,
            items JSONB NOT NULL DEFAULT '[]'::jsonb,
            display_order INTEGER NOT NULL DEFAULT 1
        )
    "#,
    )
    .execute(pool)
    .await?;

    // Singleton: the CHECK pins the only legal key so the upsert can't fan out.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            id SMALLINT PRIMARY KEY DEFAULT 1 CHECK (id = 1),
            profile_image TEXT,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

/// Strips scripts and event handlers from rich-text post bodies.
pub fn sanitize_html(html: &str) -> String {
    ammonia::clean(html)
}
