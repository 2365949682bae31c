use serde::{Deserialize, Serialize};

/// Request envelope shared by the IPC and HTTP transports.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AssistantRequest {
    Ping,
    Health,
    Chat {
        message: String,
        session_id: Option<String>,
        /// Identity vouched for by an upstream auth layer.
        user_id: Option<String>,
    },
    SubmitSeats {
        session_id: String,
        seats: Vec<String>,
    },
    ConfirmPayment {
        session_id: String,
        payment_result: Option<serde_json::Value>,
        user_id: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssistantResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl AssistantResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
