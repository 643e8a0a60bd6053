/**
 * Blog Routes
 * Public reading endpoints and the admin CRUD surface for blog posts
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::models::{
    BlogCategory, BlogPost, BlogPostPatch, NewBlogPost, PostQuery, Visibility,
};
use crate::error::{AppError, NotFoundFallback};
use crate::routes::extract::{AppJson, AppPath, AppQuery};
use crate::routes::{require, require_if_present, SuccessResponse};
use crate::session::AdminSession;
use crate::AppState;

const DEFAULT_LIMIT: i64 = 6;
const MAX_LIMIT: i64 = 50;
const RELATED_LIMIT: i64 = 3;
const ADMIN_LIST: &str = "/admin/blog";

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for GET /api/blog
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    pub limit: Option<i64>,
    pub category: Option<BlogCategory>,
}

impl BlogListQuery {
    fn into_post_query(self) -> PostQuery {
        PostQuery {
            category: self.category,
            limit: Some(self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)),
            ..PostQuery::published()
        }
    }
}

// ============================================================================
// Public handlers
// ============================================================================

/// GET /api/blog - Latest published posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BlogListQuery>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let posts = state.store.list_posts(&query.into_post_query()).await?;
    Ok(Json(posts))
}

/// GET /api/blog/{id} - A published post; drafts read as missing
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<BlogPost>, AppError> {
    let post = state
        .store
        .get_post(id, Visibility::PublishedOnly)
        .await
        .fallback_to("/")?;
    Ok(Json(post))
}

/// GET /api/blog/{id}/related - Up to three published posts from the same category
pub async fn related_posts(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let post = state
        .store
        .get_post(id, Visibility::PublishedOnly)
        .await
        .fallback_to("/")?;

    let query = PostQuery {
        category: Some(post.category),
        exclude_id: Some(post.id),
        limit: Some(RELATED_LIMIT),
        ..PostQuery::published()
    };
    Ok(Json(state.store.list_posts(&query).await?))
}

// ============================================================================
// Admin handlers
// ============================================================================

/// GET /api/admin/blog - Every post, drafts included
pub async fn admin_list_posts(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    Ok(Json(state.store.list_posts(&PostQuery::all()).await?))
}

/// GET /api/admin/blog/{id} - Preview or edit, regardless of `published`
pub async fn admin_get_post(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<BlogPost>, AppError> {
    let post = state
        .store
        .get_post(id, Visibility::All)
        .await
        .fallback_to(ADMIN_LIST)?;
    Ok(Json(post))
}

/// POST /api/admin/blog
pub async fn create_post(
    _session: AdminSession,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewBlogPost>,
) -> Result<(StatusCode, Json<BlogPost>), AppError> {
    require("Title", &payload.title)?;
    require("Excerpt", &payload.excerpt)?;
    require("Content", &payload.content)?;
    require("Read time", &payload.read_time)?;

    let post = state.store.insert_post(payload).await?;
    tracing::info!(
        post_id = post.id,
        published = post.published,
        category = %post.category,
        "blog post created"
    );
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/admin/blog/{id}
pub async fn update_post(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<BlogPostPatch>,
) -> Result<Json<BlogPost>, AppError> {
    require_if_present("Title", patch.title.as_ref())?;
    require_if_present("Excerpt", patch.excerpt.as_ref())?;
    require_if_present("Content", patch.content.as_ref())?;
    require_if_present("Read time", patch.read_time.as_ref())?;

    let post = state
        .store
        .update_post(id, patch)
        .await
        .fallback_to(ADMIN_LIST)?;
    tracing::info!(post_id = id, published = post.published, "blog post updated");
    Ok(Json(post))
}

/// DELETE /api/admin/blog/{id}
pub async fn delete_post(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_post(id).await.fallback_to(ADMIN_LIST)?;
    tracing::info!(post_id = id, "blog post deleted");
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ContentStore;
    use crate::testing::{admin_get, get_json, send_json, TestApp};
    use axum::http::Method;
    use serde_json::json;

    async fn seed(app: &TestApp, title: &str, category: BlogCategory, published: bool) -> i64 {
        app.content
            .insert_post(NewBlogPost {
                title: title.to_string(),
                excerpt: "excerpt".to_string(),
                content: "<p>body</p>".to_string(),
                category,
                read_time: "5 min read".to_string(),
                image: None,
                published,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_list_query_defaults_and_clamps() {
        let query = BlogListQuery::default().into_post_query();
        assert_eq!(query.limit, Some(DEFAULT_LIMIT));
        assert_eq!(query.visibility, Visibility::PublishedOnly);

        let query = BlogListQuery {
            limit: Some(500),
            category: None,
        }
        .into_post_query();
        assert_eq!(query.limit, Some(MAX_LIMIT));
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_public_but_listed_for_admin() {
        let app = TestApp::new().await;
        let live = seed(&app, "Live", BlogCategory::Blockchain, true).await;
        let draft = seed(&app, "Draft", BlogCategory::Blockchain, false).await;

        let (status, body) = get_json(app.router(), "/api/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], live);

        let (status, body) = get_json(app.router(), &format!("/api/blog/{}", draft)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["redirect"], "/");

        let token = app.admin_token();
        let (_, body) = admin_get(app.router(), "/api/admin/blog", &token).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        let (status, body) =
            admin_get(app.router(), &format!("/api/admin/blog/{}", draft), &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["published"], false);
    }

    #[tokio::test]
    async fn test_public_list_respects_limit_and_category() {
        let app = TestApp::new().await;
        for i in 0..8 {
            seed(&app, &format!("Post {}", i), BlogCategory::Blockchain, true).await;
        }
        seed(&app, "Guide", BlogCategory::Tutorial, true).await;

        let (_, body) = get_json(app.router(), "/api/blog").await;
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[0]["title"], "Guide");

        let (_, body) = get_json(app.router(), "/api/blog?category=Tutorial&limit=10").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_related_posts_exclude_current_and_drafts() {
        let app = TestApp::new().await;
        let current = seed(&app, "Current", BlogCategory::AiMl, true).await;
        seed(&app, "Sibling", BlogCategory::AiMl, true).await;
        seed(&app, "Hidden", BlogCategory::AiMl, false).await;
        seed(&app, "Other", BlogCategory::Personal, true).await;

        let (status, body) =
            get_json(app.router(), &format!("/api/blog/{}/related", current)).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Sibling"]);
    }

    #[tokio::test]
    async fn test_create_sanitizes_content_and_requires_fields() {
        let app = TestApp::new().await;
        let token = app.admin_token();

        let (status, body) = send_json(
            app.router(),
            Method::POST,
            "/api/admin/blog",
            Some(&token),
            &json!({
                "title": "Hello",
                "excerpt": "Intro",
                "content": "<p onclick=\"x()\">Hi</p><script>alert(1)</script>",
                "category": "AI & ML",
                "readTime": "3 min read",
                "published": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["content"], "<p>Hi</p>");
        assert_eq!(body["category"], "AI & ML");

        let (status, body) = send_json(
            app.router(),
            Method::POST,
            "/api/admin/blog",
            Some(&token),
            &json!({ "title": "No body", "excerpt": "x", "content": "", "readTime": "1 min" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Content is required");
    }

    #[tokio::test]
    async fn test_unpublish_hides_post() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        let id = seed(&app, "Live", BlogCategory::Personal, true).await;

        let (status, _) = send_json(
            app.router(),
            Method::PATCH,
            &format!("/api/admin/blog/{}", id),
            Some(&token),
            &json!({ "published": false }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get_json(app.router(), "/api/blog").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_patch_cannot_blank_required_fields() {
        let app = TestApp::new().await;
        let token = app.admin_token();
        let id = seed(&app, "Live", BlogCategory::Tutorial, true).await;
        let uri = format!("/api/admin/blog/{}", id);

        for (patch, error) in [
            (json!({ "excerpt": " " }), "Excerpt is required"),
            (json!({ "readTime": "" }), "Read time is required"),
        ] {
            let (status, body) =
                send_json(app.router(), Method::PATCH, &uri, Some(&token), &patch).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], error);
        }

        let (_, stored) = admin_get(app.router(), &uri, &token).await;
        assert_eq!(stored["excerpt"], "excerpt");
        assert_eq!(stored["readTime"], "5 min read");
    }
}
