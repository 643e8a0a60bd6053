use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::media::{MediaFolder, UploadFile};
use crate::routes::extract::{AppJson, AppQuery};
use crate::session::AdminSession;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub folder: MediaFolder,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub removed: bool,
}

/// Pulls the `file` part out of a multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadFile, AppError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(AppError::validation("No file provided")),
            Err(e) => {
                tracing::warn!("Multipart error: {}", e);
                return Err(AppError::validation("Invalid multipart data"));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {}", e);
            AppError::validation("Failed to read file data")
        })?;

        return Ok(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

/// POST /api/admin/uploads?folder=blog|profiles|root
pub async fn upload_media(
    _session: AdminSession,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let file = read_file_field(&mut multipart).await?;
    let size = file.bytes.len();
    let url = state.media.upload(file, query.folder).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { url, size })))
}

/// DELETE /api/admin/uploads - Removes an object this site stored
pub async fn release_media(
    _session: AdminSession,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReleaseRequest>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let removed = state.media.release(&payload.url).await?;
    Ok(Json(ReleaseResponse { removed }))
}
