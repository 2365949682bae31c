use serde_json::{json, Value};
use thiserror::Error;
use wayfare_core::ipc::{AssistantRequest, AssistantResponse};
use wayfare_core::{AssistantError, AuthUser};

use crate::state::AppState;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("Health check failed: {0}")]
    Unhealthy(String),
}

/// IPC entry point: dispatch and wrap the outcome in the response envelope.
pub async fn handle_request(request: AssistantRequest, state: &AppState) -> AssistantResponse {
    match dispatch(request, state).await {
        Ok(data) => AssistantResponse::ok(data),
        Err(e) => AssistantResponse::err(e.to_string()),
    }
}

/// Shared by the IPC and HTTP transports.
pub async fn dispatch(request: AssistantRequest, state: &AppState) -> Result<Value, RouteError> {
    match request {
        AssistantRequest::Ping => Ok(json!({"pong": true})),
        AssistantRequest::Health => health(state).await,
        AssistantRequest::Chat {
            message,
            session_id,
            user_id,
        } => {
            if message.trim().is_empty() {
                return Err(RouteError::BadRequest("message is required".to_string()));
            }
            let user = user_id.map(AuthUser::new);
            let reply = state
                .engine
                .handle_message(session_id.as_deref(), &message, user.as_ref())
                .await?;
            Ok(to_value(&reply))
        }
        AssistantRequest::SubmitSeats { session_id, seats } => {
            let reply = state.engine.submit_seats(&session_id, &seats).await?;
            Ok(to_value(&reply))
        }
        AssistantRequest::ConfirmPayment {
            session_id,
            payment_result,
            user_id,
        } => {
            let user = user_id.map(AuthUser::new);
            let outcome = state
                .engine
                .confirm_payment(&session_id, payment_result, user.as_ref())
                .await?;
            Ok(to_value(&outcome))
        }
    }
}

async fn health(state: &AppState) -> Result<Value, RouteError> {
    let postgresql = match &state.pool {
        Some(pool) => Some(
            wayfare_core::db::health_check(pool)
                .await
                .map_err(|e| RouteError::Unhealthy(e.to_string()))?,
        ),
        None => None,
    };

    Ok(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "flights": state.engine.flights_backend(),
        "bookings": state.engine.bookings_backend(),
        "sessions": state.engine.sessions().len().await,
        "help": state.engine.help_enabled(),
        "postgresql": postgresql,
    }))
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize reply: {}", e);
        Value::Null
    })
}
