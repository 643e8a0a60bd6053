//! Runtime configuration, read once from the environment (and `.env`).

use std::path::PathBuf;

use crate::db::DbConfig;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@portfolio.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    /// Already-hashed password (`ADMIN_HASH_PASSWORD`), if supplied.
    pub password_hash: Option<String>,
    /// Plain password to hash at startup when no hash is supplied.
    pub password: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files on local disk, served back under `public_base`.
    Local { root: PathBuf, public_base: String },
    /// Supabase Storage bucket.
    Supabase {
        base_url: String,
        service_key: String,
        bucket: String,
    },
}

#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub relay_url: String,
    pub access_key: String,
    pub to_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub handle: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub url: String,
    pub title: String,
    pub description: String,
    pub owner_name: String,
    pub owner_title: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub database: Option<DbConfig>,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub contact: ContactConfig,
    pub github: GithubConfig,
    pub site: SiteConfig,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env_or("ENVIRONMENT", "development");
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == "production" {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });

        let storage = match (env_opt("STORAGE_URL"), env_opt("STORAGE_SERVICE_KEY")) {
            (Some(base_url), Some(service_key)) => StorageConfig::Supabase {
                base_url: base_url.trim_end_matches('/').to_string(),
                service_key,
                bucket: env_or("STORAGE_BUCKET", "portfolio-images"),
            },
            _ => StorageConfig::Local {
                root: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
                public_base: env_or("UPLOAD_PUBLIC_BASE", "/uploads"),
            },
        };

        Self {
            host: env_or("HOST", "127.0.0.1"),
            port: env_parse("PORT", 3001),
            log_level,
            log_dir: PathBuf::from(env_or("LOG_DIR", "logs")),
            database: DbConfig::from_env(),
            admin: AdminConfig {
                email: env_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
                password_hash: env_opt("ADMIN_HASH_PASSWORD"),
                password: env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
                jwt_secret: env_or("JWT_SECRET", DEFAULT_JWT_SECRET),
                session_ttl_hours: env_parse("SESSION_TTL_HOURS", 24),
            },
            storage,
            contact: ContactConfig {
                relay_url: env_or("CONTACT_RELAY_URL", "https://api.web3forms.com/submit"),
                access_key: env_or("CONTACT_ACCESS_KEY", ""),
                to_email: env_opt("CONTACT_TO_EMAIL"),
            },
            github: GithubConfig {
                api_base: env_or("GITHUB_API_BASE", "https://api.github.com"),
                handle: env_opt("GITHUB_HANDLE"),
            },
            site: SiteConfig {
                url: env_or("SITE_URL", "http://localhost:3000"),
                title: env_or("SITE_TITLE", "Portfolio Blog"),
                description: env_or("SITE_DESCRIPTION", "Latest articles and insights"),
                owner_name: env_or("OWNER_NAME", "Portfolio Owner"),
                owner_title: env_or("OWNER_TITLE", "Blockchain & Full Stack Developer"),
            },
            allowed_origins: allowed_origins_from_env(),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Fatal misconfigurations for production; `Err` carries the reason.
    pub fn check_production(&self) -> Result<(), String> {
        if !self.is_production() {
            return Ok(());
        }
        if self.admin.jwt_secret.is_empty() || self.admin.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(
                "JWT_SECRET must be set to a secure, unique value in production".to_string(),
            );
        }
        if self.admin.email == DEFAULT_ADMIN_EMAIL {
            tracing::warn!(
                "SECURITY: ADMIN_EMAIL is using the built-in default. Set ADMIN_EMAIL."
            );
        }
        if self.admin.password_hash.is_none() && self.admin.password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!(
                "SECURITY: admin password is the built-in default. \
                 Set ADMIN_HASH_PASSWORD to a bcrypt hash of a strong password."
            );
        }
        Ok(())
    }
}

/// `ALLOWED_ORIGINS` (comma-separated), else `FRONTEND_ORIGIN`, else local dev.
fn allowed_origins_from_env() -> Vec<String> {
    let listed: Vec<String> = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !listed.is_empty() {
        return listed;
    }
    if let Some(origin) = env_opt("FRONTEND_ORIGIN") {
        return vec![origin];
    }
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
