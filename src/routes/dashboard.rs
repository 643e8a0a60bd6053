use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::ContentCounts;
use crate::error::AppError;
use crate::session::AdminSession;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub email: String,
    pub counts: ContentCounts,
}

/// GET /api/admin/dashboard - Landing page after login
pub async fn get_dashboard(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let counts = state.store.counts().await?;
    Ok(Json(DashboardResponse {
        email: session.claims.email,
        counts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::list::TagList;
    use crate::db::models::NewSkillCategory;
    use crate::db::ContentStore;
    use crate::testing::{admin_get, get_json, TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_dashboard_counts_content() {
        let app = TestApp::new().await;
        app.content
            .insert_skill(NewSkillCategory {
                category: "Languages".into(),
                items: TagList::new(vec!["Rust".to_string()]),
                order: 1,
            })
            .await
            .unwrap();

        let token = app.admin_token();
        let (status, body) = admin_get(app.router(), "/api/admin/dashboard", &token).await;
        assert_eq!(status, StatusCode::OK);
        let body: DashboardResponse = serde_json::from_value(body).unwrap();
        assert_eq!(body.counts.skills, 1);
        assert_eq!(body.counts.projects, 0);
        assert_eq!(body.email, "admin@portfolio.com");
    }

    #[tokio::test]
    async fn test_dashboard_redirects_anonymous_to_login() {
        let app = TestApp::new().await;
        let (status, body) = get_json(app.router(), "/api/admin/dashboard").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/admin");
    }
}
