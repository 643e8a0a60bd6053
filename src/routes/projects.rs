/**
 * Project Routes
 * Public project listing and the admin CRUD surface
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::db::models::{NewProject, Project, ProjectOrder, ProjectPatch};
use crate::error::{AppError, NotFoundFallback};
use crate::routes::extract::{AppJson, AppPath};
use crate::routes::{require, require_if_present, SuccessResponse};
use crate::session::AdminSession;
use crate::AppState;

const ADMIN_LIST: &str = "/admin/projects";

/// GET /api/projects - Featured projects first
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state.store.list_projects(ProjectOrder::FeaturedFirst).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Project>, AppError> {
    let project = state.store.get_project(id).await.fallback_to("/")?;
    Ok(Json(project))
}

/// GET /api/admin/projects - All projects by id
pub async fn admin_list_projects(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state.store.list_projects(ProjectOrder::ById).await?;
    Ok(Json(projects))
}

/// GET /api/admin/projects/{id} - Loads the edit form
pub async fn admin_get_project(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Project>, AppError> {
    let project = state.store.get_project(id).await.fallback_to(ADMIN_LIST)?;
    Ok(Json(project))
}

/// POST /api/admin/projects
pub async fn create_project(
    _session: AdminSession,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    require("Title", &payload.title)?;
    require("Description", &payload.description)?;
    require("GitHub link", &payload.github)?;
    if payload.tech.is_empty() {
        return Err(AppError::validation("Tech stack is required"));
    }

    let project = state.store.insert_project(payload).await?;
    tracing::info!(project_id = project.id, title = %project.title, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// PATCH /api/admin/projects/{id}
pub async fn update_project(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    require_if_present("Title", patch.title.as_ref())?;
    require_if_present("Description", patch.description.as_ref())?;
    require_if_present("GitHub link", patch.github.as_ref())?;
    if patch.tech.as_ref().is_some_and(|tech| tech.is_empty()) {
        return Err(AppError::validation("Tech stack is required"));
    }

    let project = state
        .store
        .update_project(id, patch)
        .await
        .fallback_to(ADMIN_LIST)?;
    tracing::info!(project_id = id, "project updated");
    Ok(Json(project))
}

/// DELETE /api/admin/projects/{id}
///
/// Only the record goes; an uploaded cover image stays in storage.
pub async fn delete_project(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .store
        .delete_project(id)
        .await
        .fallback_to(ADMIN_LIST)?;
    tracing::info!(project_id = id, "project deleted");
    Ok(Json(SuccessResponse::ok()))
}
