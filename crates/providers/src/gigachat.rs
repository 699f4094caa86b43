//! GigaChat provider.
//!
//! GigaChat speaks a chat-completions dialect with the older `functions` /
//! `function_call` calling convention:
//! - one function call per assistant turn, arguments as a JSON object
//! - results come back as `role: "function"` messages carrying the function
//!   name, and their content must be valid JSON
//!
//! Requests are authorized with a short-lived access token obtained from the
//! OAuth endpoint using the long-lived authorization key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopbot_core::error::ProviderError;
use shopbot_core::message::{Message, MessageToolCall, Role};
use shopbot_core::provider::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/// Tokens are refreshed this long before they expire.
const TOKEN_SLACK_MS: i64 = 60_000;

pub struct GigaChatProvider {
    base_url: String,
    auth_url: String,
    scope: String,
    credentials: String,
    client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AccessToken {
    access_token: String,
    /// Unix time in milliseconds
    expires_at: i64,
}

impl GigaChatProvider {
    /// `credentials` is the base64 authorization key issued for the account.
    pub fn new(credentials: impl Into<String>) -> Self {
        Self::with_options(credentials, Duration::from_secs(120), false)
    }

    pub fn with_options(
        credentials: impl Into<String>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .unwrap_or_default();

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            auth_url: DEFAULT_AUTH_URL.into(),
            scope: DEFAULT_SCOPE.into(),
            credentials: credentials.into(),
            client,
            token: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Return a valid access token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TOKEN_SLACK_MS > now {
                return Ok(token.access_token.clone());
            }
        }

        debug!(auth_url = %self.auth_url, "Requesting GigaChat access token");
        let response = self
            .client
            .post(&self.auth_url)
            .header("Authorization", format!("Basic {}", self.credentials))
            .header("RqUID", uuid::Uuid::new_v4().to_string())
            .header("Accept", "application/json")
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "GigaChat rejected the authorization key".into(),
            ));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            });
        }

        let token: AccessToken = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse token response: {e}"),
        })?;
        let value = token.access_token.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        let names: HashMap<&str, &str> = messages
            .iter()
            .flat_map(|m| m.tool_calls.iter())
            .map(|tc| (tc.id.as_str(), tc.name.as_str()))
            .collect();

        messages
            .iter()
            .map(|m| match m.role {
                Role::System => ApiMessage::text("system", &m.content),
                Role::User => ApiMessage::text("user", &m.content),
                Role::Assistant => {
                    let function_call = m.tool_calls.first().map(|tc| ApiFunctionCall {
                        name: tc.name.clone(),
                        arguments: serde_json::from_str(&tc.arguments)
                            .unwrap_or_else(|_| serde_json::json!({})),
                    });
                    ApiMessage {
                        function_call,
                        ..ApiMessage::text("assistant", &m.content)
                    }
                }
                Role::Tool => ApiMessage {
                    name: m
                        .tool_call_id
                        .as_deref()
                        .and_then(|id| names.get(id))
                        .map(|n| n.to_string()),
                    ..ApiMessage::text("function", &m.content)
                },
            })
            .collect()
    }

    fn to_api_functions(tools: &[ToolDefinition]) -> Vec<ApiFunctionDefinition> {
        tools
            .iter()
            .map(|t| ApiFunctionDefinition {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl shopbot_core::Provider for GigaChatProvider {
    fn name(&self) -> &str {
        "gigachat"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let token = self.access_token().await?;
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "profanity_check": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if !request.tools.is_empty() {
            body["functions"] = serde_json::json!(Self::to_api_functions(&request.tools));
            body["function_call"] = serde_json::json!("auto");
        }

        debug!(model = %request.model, "Sending GigaChat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 {
            // Token revoked early; drop it so the next call re-authenticates.
            *self.token.lock().await = None;
            return Err(ProviderError::AuthenticationFailed(
                "GigaChat access token rejected".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "GigaChat returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .function_call
            .into_iter()
            .map(|fc| MessageToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                name: fc.name,
                arguments: fc.arguments.to_string(),
            })
            .collect();

        let message = Message::assistant(choice.message.content).with_tool_calls(tool_calls);

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: api_response.model.unwrap_or(request.model),
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        self.access_token().await.map(|_| true)
    }
}

// --- GigaChat API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
}

impl ApiMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
            function_call: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDefinition {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
