/**
 * Skill Routes
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::db::models::{NewSkillCategory, SkillCategory, SkillCategoryPatch};
use crate::error::{AppError, NotFoundFallback};
use crate::routes::extract::{AppJson, AppPath};
use crate::routes::{require, require_if_present, SuccessResponse};
use crate::session::AdminSession;
use crate::AppState;

const ADMIN_LIST: &str = "/admin/skills";

/// GET /api/skills - Categories in display order
pub async fn list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillCategory>>, AppError> {
    Ok(Json(state.store.list_skills().await?))
}

/// GET /api/admin/skills
pub async fn admin_list_skills(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillCategory>>, AppError> {
    Ok(Json(state.store.list_skills().await?))
}

/// GET /api/admin/skills/{id}
pub async fn admin_get_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SkillCategory>, AppError> {
    let skill = state.store.get_skill(id).await.fallback_to(ADMIN_LIST)?;
    Ok(Json(skill))
}

/// POST /api/admin/skills
pub async fn create_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewSkillCategory>,
) -> Result<(StatusCode, Json<SkillCategory>), AppError> {
    require("Category", &payload.category)?;
    if payload.items.is_empty() {
        return Err(AppError::validation("Skills are required"));
    }

    let skill = state.store.insert_skill(payload).await?;
    tracing::info!(skill_id = skill.id, items = skill.items.len(), "skill category created");
    Ok((StatusCode::CREATED, Json(skill)))
}

/// PATCH /api/admin/skills/{id}
pub async fn update_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<SkillCategoryPatch>,
) -> Result<Json<SkillCategory>, AppError> {
    require_if_present("Category", patch.category.as_ref())?;
    if patch.items.as_ref().is_some_and(|items| items.is_empty()) {
        return Err(AppError::validation("Skills are required"));
    }

    let skill = state
        .store
        .update_skill(id, patch)
        .await
        .fallback_to(ADMIN_LIST)?;
    tracing::info!(skill_id = id, "skill category updated");
    Ok(Json(skill))
}

/// DELETE /api/admin/skills/{id}
pub async fn delete_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_skill(id).await.fallback_to(ADMIN_LIST)?;
    tracing::info!(skill_id = id, "skill category deleted");
    Ok(Json(SuccessResponse::ok()))
}
