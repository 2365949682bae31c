//! Wayfare HTTP API
//!
//! Axum server exposing the assistant over JSON. Each endpoint is a thin
//! handler over an inner function returning `(StatusCode, Value)`, so the
//! business path can be exercised without axum dispatch.
//!
//! Endpoints:
//! - GET  /health                    health check with backend status
//! - GET  /version                   server version info
//! - POST /assistant/chat            one dialogue turn
//! - POST /assistant/seats           manual seat submission
//! - POST /assistant/confirm-payment settle payment for a ready draft
//!
//! An upstream auth layer may vouch for the caller with an `x-user-id` header.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use wayfare_core::ipc::AssistantRequest;
use wayfare_core::AssistantError;

use crate::router::{dispatch, RouteError};
use crate::state::AppState;

pub const USER_HEADER: &str = "x-user-id";

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/assistant/chat", post(chat_handler))
        .route("/assistant/seats", post(seats_handler))
        .route("/assistant/confirm-payment", post(confirm_payment_handler))
        .with_state(state)
}

/// Serve until the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<AppState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Wayfare HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeatsRequest {
    pub session_id: Option<String>,
    #[serde(default)]
    pub seats: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub session_id: Option<String>,
    pub payment_result: Option<Value>,
}

// ============================================================================
// Inner functions
// ============================================================================

pub async fn health_inner(state: &AppState) -> (StatusCode, Value) {
    match dispatch(AssistantRequest::Health, state).await {
        Ok(mut body) => {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("socket".to_string(), json!(state.config.service.socket_path));
            }
            (StatusCode::OK, body)
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

pub fn version_inner() -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "wayfare/1",
    })
}

pub async fn chat_inner(
    state: &AppState,
    req: ChatRequest,
    user_id: Option<String>,
) -> (StatusCode, Value) {
    let message = match req.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return bad_request("message is required"),
    };

    respond(
        dispatch(
            AssistantRequest::Chat {
                message,
                session_id: req.session_id,
                user_id,
            },
            state,
        )
        .await,
    )
}

pub async fn seats_inner(state: &AppState, req: SeatsRequest) -> (StatusCode, Value) {
    let session_id = match req.session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return bad_request("sessionId is required"),
    };

    respond(
        dispatch(
            AssistantRequest::SubmitSeats {
                session_id,
                seats: req.seats,
            },
            state,
        )
        .await,
    )
}

pub async fn confirm_payment_inner(
    state: &AppState,
    req: ConfirmPaymentRequest,
    user_id: Option<String>,
) -> (StatusCode, Value) {
    let session_id = match req.session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return bad_request("sessionId is required"),
    };

    respond(
        dispatch(
            AssistantRequest::ConfirmPayment {
                session_id,
                payment_result: req.payment_result,
                user_id,
            },
            state,
        )
        .await,
    )
}

// ============================================================================
// Axum handler wrappers
// ============================================================================

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let (status, body) = chat_inner(&state, req, user_from(&headers)).await;
    (status, Json(body))
}

pub async fn seats_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeatsRequest>,
) -> impl IntoResponse {
    let (status, body) = seats_inner(&state, req).await;
    (status, Json(body))
}

pub async fn confirm_payment_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ConfirmPaymentRequest>,
) -> impl IntoResponse {
    let (status, body) = confirm_payment_inner(&state, req, user_from(&headers)).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

pub fn user_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn bad_request(msg: &str) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!({ "error": msg }))
}

fn respond(result: std::result::Result<Value, RouteError>) -> (StatusCode, Value) {
    match result {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => error_response(&e),
    }
}

/// Map a routing failure to its HTTP status and body.
pub fn error_response(e: &RouteError) -> (StatusCode, Value) {
    match e {
        RouteError::BadRequest(msg) => bad_request(msg),
        RouteError::Unhealthy(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "status": "unhealthy", "error": msg }),
        ),
        RouteError::Assistant(err) => {
            let status = match err {
                AssistantError::Collaborator(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AssistantError::Unauthorized => StatusCode::UNAUTHORIZED,
                AssistantError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                AssistantError::NoDraft(_) | AssistantError::InvalidSeats(_) => {
                    StatusCode::BAD_REQUEST
                }
            };
            if let AssistantError::Collaborator(inner) = err {
                return (
                    status,
                    json!({ "error": "assistant failed", "details": inner.to_string() }),
                );
            }
            (status, json!({ "error": err.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use wayfare_core::StoreError;

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string());
        assert_eq!(v["protocol"], "wayfare/1");
    }

    #[test]
    fn test_user_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_from(&headers), None);
        headers.insert(USER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(user_from(&headers), None);
        headers.insert(USER_HEADER, HeaderValue::from_static("user-42"));
        assert_eq!(user_from(&headers).as_deref(), Some("user-42"));
    }

    #[test]
    fn test_collaborator_failure_is_500() {
        let e = RouteError::Assistant(AssistantError::Collaborator(StoreError::Timeout(10)));
        let (status, body) = error_response(&e);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "assistant failed");
        assert_eq!(body["details"], "Collaborator call timed out after 10s");
    }

    #[test]
    fn test_error_statuses() {
        let cases = [
            (AssistantError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AssistantError::SessionNotFound("s".to_string()), StatusCode::NOT_FOUND),
            (AssistantError::NoDraft("s".to_string()), StatusCode::BAD_REQUEST),
            (AssistantError::InvalidSeats("dup".to_string()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            let (status, _) = error_response(&RouteError::Assistant(err));
            assert_eq!(status, expected);
        }
    }
}
