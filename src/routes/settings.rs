/**
 * Settings Routes
 * The singleton site settings row (currently just the profile image)
 */
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::Settings;
use crate::error::AppError;
use crate::routes::extract::AppJson;
use crate::session::AdminSession;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub profile_image: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<Settings>> for SettingsResponse {
    fn from(settings: Option<Settings>) -> Self {
        match settings {
            Some(s) => Self {
                profile_image: s.profile_image,
                updated_at: Some(s.updated_at),
            },
            None => Self {
                profile_image: None,
                updated_at: None,
            },
        }
    }
}

/// Request body for PUT /api/admin/settings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    /// `null` or `""` clears the image.
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    Ok(Json(state.store.get_settings().await?.into()))
}

/// GET /api/admin/settings
pub async fn admin_get_settings(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    Ok(Json(state.store.get_settings().await?.into()))
}

/// PUT /api/admin/settings - Replace the profile image
pub async fn update_settings(
    _session: AdminSession,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    replace_profile_image(&state, payload.profile_image).await
}

/// DELETE /api/admin/settings/profile-image
pub async fn remove_profile_image(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    replace_profile_image(&state, None).await
}

/// Saves the new image, then releases the previous one if this site stored it.
async fn replace_profile_image(
    state: &AppState,
    image: Option<String>,
) -> Result<Json<SettingsResponse>, AppError> {
    let previous = state
        .store
        .get_settings()
        .await?
        .and_then(|s| s.profile_image);

    let saved = state.store.save_profile_image(image).await?;
    tracing::info!(profile_image = ?saved.profile_image, "profile image updated");

    if let Some(old) = previous.filter(|old| saved.profile_image.as_ref() != Some(old)) {
        // best effort, the new value is already saved
        if let Err(e) = state.media.release(&old).await {
            tracing::warn!(url = %old, error = %e, "failed to release previous profile image");
        }
    }

    Ok(Json(Some(saved).into()))
}

#[cfg(test)]
mod tests {
    use crate::testing::{get_json, send_json, TestApp, TEST_PUBLIC_PREFIX};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_public_settings_empty_before_first_save() {
        let app = TestApp::new().await;
        let (status, body) = get_json(app.router(), "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profileImage"], Value::Null);
    }

    #[tokio::test]
    async fn test_replacing_image_releases_owned_previous() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        app.objects.insert("profiles/old.png");
        app.objects.insert("profiles/new.png");

        for path in ["profiles/old.png", "profiles/new.png"] {
            let (status, _) = send_json(
                app.router(),
                Method::PUT,
                "/api/admin/settings",
                Some(&token),
                &json!({ "profileImage": format!("{}/{}", TEST_PUBLIC_PREFIX, path) }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        assert!(!app.objects.contains("profiles/old.png"));
        assert!(app.objects.contains("profiles/new.png"));

        let (_, body) = get_json(app.router(), "/api/settings").await;
        assert_eq!(
            body["profileImage"],
            format!("{}/profiles/new.png", TEST_PUBLIC_PREFIX)
        );
    }

    #[tokio::test]
    async fn test_foreign_image_is_never_deleted() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        app.objects.insert("profiles/keep.png");

        send_json(
            app.router(),
            Method::PUT,
            "/api/admin/settings",
            Some(&token),
            &json!({ "profileImage": "https://avatars.example.com/me.png" }),
        )
        .await;
        let (status, body) = send_json(
            app.router(),
            Method::DELETE,
            "/api/admin/settings/profile-image",
            Some(&token),
            &json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profileImage"], Value::Null);
        assert_eq!(app.objects.object_count(), 1);
    }

    #[tokio::test]
    async fn test_update_requires_session() {
        let app = TestApp::new().await;
        let (status, body) = send_json(
            app.router(),
            Method::PUT,
            "/api/admin/settings",
            None,
            &json!({ "profileImage": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/admin");
    }
}
