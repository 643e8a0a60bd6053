/**
 * Logs Route Handler
 * Endpoint for receiving client logs from frontend
 */

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_http::request_id::RequestId;
use crate::logging::config::{ClientLogBatch, ClientLogEntry, LogLevel, LogResponse};
use crate::routes::extract::AppJson;

/// Upper bound on entries accepted from one batch.
const MAX_BATCH: usize = 100;

/// POST /api/logs - Receive client logs
#[tracing::instrument(skip(logs), fields(batch_size = logs.logs.len()))]
pub async fn receive_client_logs(
    request_id: Option<Extension<RequestId>>,
    AppJson(logs): AppJson<ClientLogBatch>,
) -> impl IntoResponse {
    let req_id = request_id
        .as_ref()
        .and_then(|ext| ext.0.header_value().to_str().ok())
        .unwrap_or("unknown");

    let received = logs.logs.len();
    tracing::info!(request_id = %req_id, batch_size = received, "received client logs");

    let mut processed = 0;
    for log in logs.logs.iter().take(MAX_BATCH) {
        match process_client_log(log, req_id) {
            Ok(()) => processed += 1,
            Err(e) => {
                tracing::warn!(request_id = %req_id, error = %e, "failed to process client log")
            }
        }
    }

    let response = LogResponse {
        success: true,
        received,
        processed,
        error: (processed < received)
            .then(|| format!("{} entries dropped", received - processed)),
    };

    (StatusCode::ACCEPTED, Json(response))
}

/// Re-emits one browser entry as a server event at its own level.
fn process_client_log(log: &ClientLogEntry, request_id: &str) -> Result<(), String> {
    if log.message.trim().is_empty() {
        return Err("empty message".to_string());
    }

    let span = tracing::info_span!(
        "client_log",
        request_id = %request_id,
        timestamp = %log.timestamp,
        page = log.page.as_deref().unwrap_or("-"),
        source = "client",
    );
    let _enter = span.enter();

    match log.level {
        LogLevel::Trace => tracing::trace!(
            client_message = %log.message,
            context = ?log.context,
            metadata = ?log.metadata,
            "client log"
        ),
        LogLevel::Debug => tracing::debug!(
            client_message = %log.message,
            context = ?log.context,
            metadata = ?log.metadata,
            "client log"
        ),
        LogLevel::Info => tracing::info!(
            client_message = %log.message,
            context = ?log.context,
            metadata = ?log.metadata,
            "client log"
        ),
        LogLevel::Warn => tracing::warn!(
            client_message = %log.message,
            context = ?log.context,
            metadata = ?log.metadata,
            "client log"
        ),
        LogLevel::Error => tracing::error!(
            client_message = %log.message,
            context = ?log.context,
            metadata = ?log.metadata,
            "client log"
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{post_json, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_client_logs_accepted() {
        let app = TestApp::new().await;
        let batch = json!({
            "logs": [
                { "timestamp": "2024-01-01T00:00:00Z", "level": "info", "message": "page view", "page": "/blog" },
                { "timestamp": "2024-01-01T00:00:01Z", "level": "warning", "message": "slow image" },
                { "timestamp": "2024-01-01T00:00:02Z", "level": "error", "message": "" }
            ]
        });
        let (status, body) = post_json(app.router(), "/api/logs", &batch).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["received"], 3);
        assert_eq!(body["processed"], 2);
        assert_eq!(body["error"], "1 entries dropped");
    }

    #[tokio::test]
    async fn test_unknown_level_rejected() {
        let app = TestApp::new().await;
        let batch = json!({
            "logs": [{ "timestamp": "t", "level": "loud", "message": "x" }]
        });
        let (status, body) = post_json(app.router(), "/api/logs", &batch).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
        assert!(body["message"].as_str().unwrap().contains("unknown variant"));
    }
}
