/**
 * Contact Route
 * Relays the public contact form to the configured form service
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::routes::extract::AppJson;
use crate::routes::{require, SuccessResponse};
use crate::{AppState, HTTP_CLIENT};

const FROM_NAME: &str = "Portfolio Contact Form";

#[derive(Debug, Deserialize, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Payload understood by the form relay.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    from_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_email: Option<&'a str>,
}

/// POST /api/contact
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    require("Name", &payload.name)?;
    require("Email", &payload.email)?;
    require("Subject", &payload.subject)?;
    require("Message", &payload.message)?;
    if !payload.email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }

    let contact = &state.config.contact;
    if contact.access_key.is_empty() {
        tracing::error!("CONTACT_ACCESS_KEY is not set; contact form cannot be relayed");
        return Err(AppError::Upstream("Contact form is unavailable".to_string()));
    }

    let relay = RelayMessage {
        access_key: &contact.access_key,
        name: payload.name.trim(),
        email: payload.email.trim(),
        subject: payload.subject.trim(),
        message: &payload.message,
        from_name: FROM_NAME,
        to_email: contact.to_email.as_deref(),
    };

    let response = HTTP_CLIENT
        .post(&contact.relay_url)
        .json(&relay)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "contact relay request failed");
            AppError::Upstream("Failed to send message. Please try again.".to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = %status, "contact relay rejected message");
        return Err(AppError::Upstream(
            "Failed to send message. Please try again.".to_string(),
        ));
    }

    tracing::info!(subject = %relay.subject, "contact message relayed");
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::testing::{post_json, spawn_upstream, TestApp};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn form() -> Value {
        json!({
            "name": "Grace",
            "email": "grace@example.com",
            "subject": "Hello",
            "message": "Let's build something."
        })
    }

    #[tokio::test]
    async fn test_message_relayed_with_access_key() {
        let received: Arc<Mutex<Option<Value>>> = Arc::default();
        let sink = received.clone();
        let relay = Router::new().route(
            "/submit",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({ "success": true }))
                }
            }),
        );
        let base = spawn_upstream(relay).await;

        let app = TestApp::with_config(|c| c.contact.relay_url = format!("{}/submit", base)).await;
        let (status, body) = post_json(app.router(), "/api/contact", &form()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let sent = received.lock().unwrap().clone().unwrap();
        assert_eq!(sent["access_key"], "test-access-key");
        assert_eq!(sent["from_name"], "Portfolio Contact Form");
        assert_eq!(sent["subject"], "Hello");
    }

    #[tokio::test]
    async fn test_relay_failure_is_bad_gateway() {
        let relay = Router::new().route(
            "/submit",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_upstream(relay).await;

        let app = TestApp::with_config(|c| c.contact.relay_url = format!("{}/submit", base)).await;
        let (status, body) = post_json(app.router(), "/api/contact", &form()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to send message. Please try again.");
    }

    #[tokio::test]
    async fn test_missing_field_rejected_before_relay() {
        let app = TestApp::with_config(|c| c.contact.relay_url = "http://127.0.0.1:9/x".into()).await;
        let mut payload = form();
        payload["message"] = json!("");
        let (status, body) = post_json(app.router(), "/api/contact", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }
}
