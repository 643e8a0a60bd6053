/**
 * Authentication Routes
 * Admin login, session status and logout
 */
use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::AppError;
use crate::routes::extract::AppJson;
use crate::routes::SuccessResponse;
use crate::session::{bearer_token, GateState};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub email: String,
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let ip = addr.ip();

    if state.login_throttle.is_blocked(ip).await {
        tracing::warn!(ip = %ip, "login throttled");
        return Err(AppError::TooManyAttempts);
    }

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    if !state.credentials.check(&payload.email, &payload.password).await {
        state.login_throttle.record_failure(ip).await;
        tracing::warn!(ip = %ip, "Failed login attempt");
        return Err(AppError::InvalidCredentials);
    }
    state.login_throttle.clear(ip).await;

    let issued = state
        .sessions
        .issue(state.credentials.email())
        .map_err(|e| AppError::Internal(format!("failed to create token: {}", e)))?;

    tracing::info!(ip = %ip, "Successful admin login");

    Ok(Json(LoginResponse {
        success: true,
        email: issued.claims.email,
        access_token: issued.token,
        expires_at: issued.claims.exp,
    }))
}

/// GET /api/auth/session - Gate state for the caller; never fails
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<GateState> {
    Json(GateState::resolve(&headers, &state.sessions).await)
}

/// POST /api/auth/logout - Revokes the presented session; idempotent
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<SuccessResponse> {
    if let Some(token) = bearer_token(&headers) {
        match state.sessions.validate(token).await {
            Ok(claims) => {
                state.sessions.revoke(&claims).await;
                tracing::info!(jti = %claims.jti, "admin session revoked");
            }
            Err(e) => tracing::debug!("logout with unusable token: {}", e),
        }
    }
    Json(SuccessResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin_get, get_json, post_json, send_json, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    async fn login_as(
        app: &TestApp,
        email: &str,
        password: &str,
    ) -> (StatusCode, serde_json::Value) {
        post_json(
            app.router(),
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    #[tokio::test]
    async fn test_default_credentials_reach_dashboard() {
        let app = TestApp::new().await;
        let (status, body) = login_as(&app, "admin@portfolio.com", "admin123").await;
        assert_eq!(status, StatusCode::OK);
        let login: LoginResponse = serde_json::from_value(body).unwrap();
        assert!(login.success);

        let (status, _) =
            admin_get(app.router(), "/api/admin/dashboard", &login.access_token).await;
        assert_eq!(status, StatusCode::OK);

        let (_, gate) = admin_get(app.router(), "/api/auth/session", &login.access_token).await;
        assert_eq!(gate["state"], "authenticated");
    }

    #[tokio::test]
    async fn test_wrong_credentials_stay_anonymous() {
        let app = TestApp::new().await;
        for (email, password) in [
            ("admin@portfolio.com", "wrongpassword"),
            ("someone@portfolio.com", "admin123"),
        ] {
            let (status, body) = login_as(&app, email, password).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "Invalid credentials");
        }

        let (status, gate) = get_json(app.router(), "/api/auth/session").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gate["state"], "anonymous");
    }

    #[tokio::test]
    async fn test_login_empty_fields_returns_bad_request() {
        let app = TestApp::new().await;
        let (status, _) = login_as(&app, "", "admin123").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_repeated_failures_are_throttled() {
        let app = TestApp::new().await;
        for _ in 0..5 {
            login_as(&app, "admin@portfolio.com", "nope").await;
        }
        let (status, _) = login_as(&app, "admin@portfolio.com", "admin123").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let app = TestApp::new().await;
        let token = app.admin_token();

        let (status, body) =
            send_json(app.router(), Method::POST, "/api/auth/logout", Some(&token), &json!({}))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = admin_get(app.router(), "/api/admin/dashboard", &token).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/admin");
    }

    #[tokio::test]
    async fn test_logout_without_session_is_ok() {
        let app = TestApp::new().await;
        let (status, _) =
            send_json(app.router(), Method::POST, "/api/auth/logout", None, &json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }
}
