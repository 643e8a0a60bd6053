/**
 * Admin Sessions
 * Credential check, signed session tokens, revocation and the
 * per-request `AdminSession` extractor
 */
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::AppState;

pub const ADMIN_ROLE: &str = "admin";

/// Failed logins allowed per address inside one window.
const MAX_FAILED_LOGINS: u32 = 5;
const LOGIN_WINDOW_SECS: i64 = 60;

// ============================================================================
// Credentials
// ============================================================================

/// The single admin credential pair. The password is only kept as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    email: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn from_config(config: &AdminConfig) -> Result<Self, bcrypt::BcryptError> {
        match &config.password_hash {
            Some(password_hash) => Ok(Self {
                email: config.email.clone(),
                password_hash: password_hash.clone(),
            }),
            None => Self::with_cost(&config.email, &config.password, DEFAULT_COST),
        }
    }

    pub fn with_cost(email: &str, password: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            email: email.to_string(),
            password_hash: hash(password, cost)?,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Exact e-mail match plus bcrypt verification off the async executor.
    pub async fn check(&self, email: &str, password: &str) -> bool {
        if email != self.email {
            return false;
        }
        let password = password.to_string();
        let password_hash = self.password_hash.clone();
        tokio::task::spawn_blocking(move || verify(&password, &password_hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Token id, the unit of revocation.
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Authorization required")]
    Missing,

    #[error("Invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Session has been signed out")]
    Revoked,
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Missing => AppError::Unauthorized("Authorization required"),
            SessionError::Invalid(e) => {
                tracing::debug!("Token verification failed: {}", e);
                AppError::Unauthorized("Invalid or expired token")
            }
            SessionError::Revoked => AppError::Unauthorized("Session has been signed out"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: Claims,
}

/// Issues and validates session tokens and remembers which ones were revoked.
pub struct SessionRegistry {
    secret: String,
    ttl: Duration,
    /// jti -> expiry; entries are pruned once the token would have expired anyway.
    revoked: RwLock<HashMap<String, i64>>,
}

impl SessionRegistry {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours.max(1)),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, email: &str) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: ADMIN_ROLE.to_string(),
            email: email.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(IssuedSession { token, claims })
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, SessionError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?
        .claims;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(SessionError::Revoked);
        }
        Ok(claims)
    }

    pub async fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }
}

/// Extract bearer token from Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ============================================================================
// Gate
// ============================================================================

/// What the admin UI should render for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GateState {
    Anonymous,
    Authenticated {
        email: String,
        #[serde(rename = "expiresAt")]
        expires_at: i64,
    },
}

impl GateState {
    pub async fn resolve(headers: &HeaderMap, sessions: &SessionRegistry) -> Self {
        let Some(token) = bearer_token(headers) else {
            return GateState::Anonymous;
        };
        match sessions.validate(token).await {
            Ok(claims) => GateState::Authenticated {
                email: claims.email,
                expires_at: claims.exp,
            },
            Err(_) => GateState::Anonymous,
        }
    }
}

/// A validated admin session. Taking this as a handler argument gates the route.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(SessionError::Missing)?;
        let claims = state.sessions.validate(token).await?;
        Ok(AdminSession { claims })
    }
}

// ============================================================================
// Login throttle
// ============================================================================

/// Counts failed logins per client address inside a fixed window.
#[derive(Debug, Default)]
pub struct LoginThrottle {
    failures: RwLock<HashMap<IpAddr, (i64, u32)>>,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_blocked(&self, ip: IpAddr) -> bool {
        let now = Utc::now().timestamp();
        self.failures
            .read()
            .await
            .get(&ip)
            .is_some_and(|(start, count)| {
                now - start < LOGIN_WINDOW_SECS && *count >= MAX_FAILED_LOGINS
            })
    }

    pub async fn record_failure(&self, ip: IpAddr) {
        let now = Utc::now().timestamp();
        let mut failures = self.failures.write().await;
        // drop expired windows
        failures.retain(|_, (start, _)| now - *start < LOGIN_WINDOW_SECS);
        let entry = failures.entry(ip).or_insert((now, 0));
        entry.1 += 1;
    }

    pub async fn clear(&self, ip: IpAddr) {
        self.failures.write().await.remove(&ip);
    }
}
