//! Optional free-text help responder.
//!
//! Consulted only when a message can't be resolved into a route. The engine
//! works without it; any failure here degrades to a canned clarification.
//!
//! - **OpenRouter**: chat-completions client with retry and backoff

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::models::{Role, Turn};

pub const SYSTEM_PROMPT: &str = "You are Wayfare, a friendly flight-booking assistant. \
The user's message could not be understood as a flight search. Reply in one or two short \
sentences: help them phrase a search with an origin, a destination and optionally a date \
(for example 'Flights from Chennai to Delhi tomorrow'), and mention that airport codes such \
as BLR or DEL also work. Never invent flights, prices or bookings.";

const TEMPERATURE: f32 = 0.25;

// ============================================================================
// HelpResponder trait
// ============================================================================

/// Side information handed to the responder with the user's text.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpContext {
    pub history: Vec<Turn>,
    pub last_results: usize,
}

#[async_trait]
pub trait HelpResponder: Send + Sync {
    /// `Ok(None)` when the model had nothing useful to say.
    async fn ask(
        &self,
        system_prompt: &str,
        user_text: &str,
        context: &HelpContext,
    ) -> Result<Option<String>, HelpError>;

    fn name(&self) -> &str;
}

#[derive(Error, Debug)]
pub enum HelpError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,

    #[error("All {attempts} retry attempts failed")]
    RetryExhausted { attempts: usize },
}

// ============================================================================
// OpenRouter client
// ============================================================================

#[derive(Debug, Clone)]
pub struct HelpConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl HelpConfig {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            model,
            base_url,
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<u16>,
    message: String,
}

#[derive(Debug, Clone)]
pub struct OpenRouterHelpClient {
    client: Client,
    config: HelpConfig,
}

impl OpenRouterHelpClient {
    pub fn new(config: HelpConfig) -> Result<Self, HelpError> {
        if config.api_key.is_empty() {
            return Err(HelpError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    async fn ask_once(&self, messages: &[ChatMessage]) -> Result<Option<String>, HelpError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error);
            let (code, message) = match detail {
                Some(d) => (d.code.unwrap_or(status.as_u16()), d.message),
                None => (status.as_u16(), body),
            };
            tracing::error!(code = code, message = %message, "Help responder API error");
            return Err(HelpError::Api { code, message });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

/// System prompt, a note about any listed results, the recent history, then
/// the user's message.
fn build_messages(system_prompt: &str, user_text: &str, context: &HelpContext) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage {
        role: "system".to_string(),
        content: system_prompt.to_string(),
    }];
    if context.last_results > 0 {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: format!(
                "The user has {} flight results listed from their last search. They can pick one by its number or flight code, or narrow the list with phrases like 'under 5000' or 'evening'.",
                context.last_results
            ),
        });
    }
    messages.extend(context.history.iter().map(|t| ChatMessage {
        role: match t.role {
            Role::User => "user".to_string(),
            Role::Assistant => "assistant".to_string(),
        },
        content: t.content.clone(),
    }));
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: user_text.to_string(),
    });
    messages
}

#[async_trait]
impl HelpResponder for OpenRouterHelpClient {
    async fn ask(
        &self,
        system_prompt: &str,
        user_text: &str,
        context: &HelpContext,
    ) -> Result<Option<String>, HelpError> {
        let messages = build_messages(system_prompt, user_text, context);

        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.config.max_retries);

        Retry::spawn(retry_strategy, || self.ask_once(&messages))
            .await
            .map_err(|e| {
                tracing::warn!(attempts = self.config.max_retries, error = %e, "Help responder retries exhausted");
                HelpError::RetryExhausted {
                    attempts: self.config.max_retries,
                }
            })
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_key: &str, base_url: String) -> HelpConfig {
        HelpConfig {
            api_key: api_key.to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url,
            max_retries: 2,
            retry_delay_ms: 10,
        }
    }

    fn completion(text: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })
    }

    #[tokio::test]
    async fn test_ask_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Try 'Flights from Pune to Goa'. ")))
            .mount(&server)
            .await;

        let client = OpenRouterHelpClient::new(test_config("test-key", server.uri())).unwrap();
        let reply = client
            .ask(SYSTEM_PROMPT, "i wanna go somewhere", &HelpContext::default())
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Try 'Flights from Pune to Goa'."));
    }

    #[tokio::test]
    async fn test_empty_choices_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = OpenRouterHelpClient::new(test_config("test-key", server.uri())).unwrap();
        let reply = client.ask(SYSTEM_PROMPT, "??", &HelpContext::default()).await.unwrap();
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_server_error_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "code": 500, "message": "upstream down" }
            })))
            .mount(&server)
            .await;

        let client = OpenRouterHelpClient::new(test_config("test-key", server.uri())).unwrap();
        match client.ask(SYSTEM_PROMPT, "hello?", &HelpContext::default()).await {
            Err(HelpError::RetryExhausted { attempts }) => assert_eq!(attempts, 2),
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retries_on_429_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .mount(&server)
            .await;

        let client = OpenRouterHelpClient::new(test_config("test-key", server.uri())).unwrap();
        let reply = client.ask(SYSTEM_PROMPT, "hm", &HelpContext::default()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("ok"));
    }

    #[test]
    fn test_messages_mention_listed_results() {
        let context = HelpContext {
            history: vec![Turn {
                role: Role::User,
                content: "flights from chennai to delhi".to_string(),
            }],
            last_results: 4,
        };
        let messages = build_messages(SYSTEM_PROMPT, "the second one?", &context);
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "system", "user", "user"]);
        assert!(messages[1].content.contains("4 flight results"));
        assert_eq!(messages[3].content, "the second one?");

        let bare = build_messages(SYSTEM_PROMPT, "hi", &HelpContext::default());
        assert_eq!(bare.len(), 2);
    }

    #[tokio::test]
    async fn test_result_count_is_sent_to_the_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("3 flight results listed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Reply with 1, 2 or 3.")))
            .mount(&server)
            .await;

        let client = OpenRouterHelpClient::new(test_config("test-key", server.uri())).unwrap();
        let context = HelpContext {
            history: Vec::new(),
            last_results: 3,
        };
        let reply = client.ask(SYSTEM_PROMPT, "which one", &context).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Reply with 1, 2 or 3."));
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenRouterHelpClient::new(test_config("", "http://localhost".to_string()));
        assert!(matches!(result, Err(HelpError::MissingApiKey)));
    }
}
