//! Shared JSON-over-HTTP transport for the store and harness clients.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shopbot_core::error::ServiceError;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Clone)]
pub(crate) struct ServiceClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ServiceClient {
    pub(crate) fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    /// POST `body` to `path` and decode the JSON answer.
    ///
    /// An empty 2xx body decodes as `{}`.
    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "POST");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        trace!(%url, status = status.as_u16(), body = %text, "response");

        if !status.is_success() {
            return Err(ServiceError::api(status.as_u16(), error_detail(&text, status)));
        }

        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| ServiceError::Decode(format!("{path}: {e}")))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"detail": "..."}`, `{"error": "..."}`, `{"message": "..."}` and
/// falls back to the raw body, then to the status reason.
fn error_detail(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                return s.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
