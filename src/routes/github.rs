use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::GithubConfig;
use crate::presentation::{describe_event, time_ago};
use crate::{AppState, HTTP_CLIENT};

const EVENT_LIMIT: usize = 5;

// ============================================================================
// Upstream shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct GithubEvent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    repo: GithubRepo,
    #[serde(default)]
    payload: EventPayload,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    commits: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    #[serde(default)]
    public_repos: u32,
    #[serde(default)]
    public_gists: u32,
    #[serde(default)]
    followers: u32,
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityStats {
    pub repos: u32,
    pub gists: u32,
    pub followers: u32,
}

impl ActivityStats {
    pub const FALLBACK: ActivityStats = ActivityStats {
        repos: 8,
        gists: 5,
        followers: 10,
    };
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub events: Vec<ActivityEvent>,
    pub stats: ActivityStats,
    pub fallback: bool,
}

impl ActivityResponse {
    fn fallback() -> Self {
        Self {
            events: Vec::new(),
            stats: ActivityStats::FALLBACK,
            fallback: true,
        }
    }
}

async fn fetch<T: DeserializeOwned>(github: &GithubConfig, path: &str) -> Result<T, String> {
    let url = format!("{}/{}", github.api_base.trim_end_matches('/'), path);

    let response = HTTP_CLIENT
        .get(&url)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("upstream returned {}", status));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("failed to parse response: {}", e))
}

async fn load_activity(github: &GithubConfig, handle: &str) -> Result<ActivityResponse, String> {
    let events_path = format!("users/{}/events/public", handle);
    let user_path = format!("users/{}", handle);
    let (events, user) = tokio::try_join!(
        fetch::<Vec<GithubEvent>>(github, &events_path),
        fetch::<GithubUser>(github, &user_path),
    )?;

    let now = Utc::now();
    let events = events
        .into_iter()
        .take(EVENT_LIMIT)
        .map(|event| ActivityEvent {
            description: describe_event(&event.kind, event.payload.commits.len()),
            time_ago: time_ago(event.created_at, now),
            id: event.id,
            kind: event.kind,
            repo: event.repo.name,
            created_at: event.created_at,
        })
        .collect();

    Ok(ActivityResponse {
        events,
        stats: ActivityStats {
            repos: user.public_repos,
            gists: user.public_gists,
            followers: user.followers,
        },
        fallback: false,
    })
}

/// GET /api/github/activity
/// Recent public events and profile stats; placeholder stats when GitHub is unreachable
pub async fn get_activity(State(state): State<AppState>) -> Json<ActivityResponse> {
    let github = &state.config.github;
    let Some(handle) = github.handle.as_deref() else {
        return Json(ActivityResponse::fallback());
    };

    match load_activity(github, handle).await {
        Ok(activity) => Json(activity),
        Err(e) => {
            tracing::warn!(handle = %handle, error = %e, "github activity unavailable");
            Json(ActivityResponse::fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{get_json, spawn_upstream, TestApp};
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;

    #[tokio::test]
    async fn test_activity_without_handle_uses_fallback() {
        let app = TestApp::new().await;
        let (status, body) = get_json(app.router(), "/api/github/activity").await;
        assert_eq!(status, StatusCode::OK);
        let body: ActivityResponse = serde_json::from_value(body).unwrap();
        assert!(body.fallback);
        assert!(body.events.is_empty());
        assert_eq!(body.stats, ActivityStats::FALLBACK);
    }

    #[tokio::test]
    async fn test_activity_reads_events_and_stats() {
        let events: Vec<_> = (0..7)
            .map(|i| {
                json!({
                    "id": format!("e{}", i),
                    "type": if i == 0 { "PushEvent" } else { "WatchEvent" },
                    "repo": { "name": "ada/engine" },
                    "payload": { "commits": [{}, {}, {}] },
                    "created_at": "2024-01-01T00:00:00Z"
                })
            })
            .collect();
        let upstream = Router::new()
            .route(
                "/users/ada/events/public",
                get(move || {
                    let events = events.clone();
                    async move { Json(events) }
                }),
            )
            .route(
                "/users/ada",
                get(|| async {
                    Json(json!({ "public_repos": 21, "public_gists": 3, "followers": 40 }))
                }),
            );
        let base = spawn_upstream(upstream).await;

        let app = TestApp::with_config(|c| {
            c.github.api_base = base;
            c.github.handle = Some("ada".to_string());
        })
        .await;
        let (_, body) = get_json(app.router(), "/api/github/activity").await;
        let body: ActivityResponse = serde_json::from_value(body).unwrap();
        assert!(!body.fallback);
        assert_eq!(body.events.len(), 5);
        assert_eq!(body.events[0].description, "Pushed 3 commits to");
        assert_eq!(body.events[1].description, "Starred");
        assert_eq!(body.events[0].repo, "ada/engine");
        assert_eq!(
            body.stats,
            ActivityStats {
                repos: 21,
                gists: 3,
                followers: 40
            }
        );
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back() {
        let upstream = Router::new().route(
            "/users/ada",
            get(|| async { (StatusCode::FORBIDDEN, "rate limited") }),
        );
        let base = spawn_upstream(upstream).await;

        let app = TestApp::with_config(|c| {
            c.github.api_base = base;
            c.github.handle = Some("ada".to_string());
        })
        .await;
        let (status, body) = get_json(app.router(), "/api/github/activity").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallback"], true);
        assert_eq!(body["stats"]["repos"], 8);
    }
}
