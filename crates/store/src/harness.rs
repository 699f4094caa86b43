//! HTTP client for the benchmark harness (sessions, task lifecycle, LLM logs).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use shopbot_core::error::ServiceError;
use shopbot_core::store::StoreApi;
use shopbot_core::task::*;
use std::sync::Arc;
use tracing::debug;
use crate::client::ServiceClient;
use crate::http::HttpStoreClient;

/// Public harness endpoint.
pub const DEFAULT_BASE_URL: &str = "https://erc.timetoact-group.at";

pub struct HttpBenchmark {
    client: ServiceClient,
}

impl HttpBenchmark {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: ServiceClient::new(base_url, api_key),
        }
    }

    async fn call<B: Serialize + ?Sized>(&self, operation: &str, body: &B) -> Result<(), ServiceError> {
        let _: Value = self.client.post(&format!("core/{operation}"), body).await?;
        Ok(())
    }
}

#[async_trait]
impl Benchmark for HttpBenchmark {
    async fn start_session(&self, meta: &SessionMeta) -> Result<SessionStarted, ServiceError> {
        debug!(benchmark = %meta.benchmark, workspace = %meta.workspace, "Starting session");
        self.client.post("core/start_session", meta).await
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ServiceError> {
        self.client
            .post("core/session_status", &json!({ "session_id": session_id }))
            .await
    }

    async fn start_task(&self, task: &TaskInfo) -> Result<(), ServiceError> {
        self.call("start_task", &json!({ "task_id": task.task_id })).await
    }

    async fn complete_task(&self, task: &TaskInfo) -> Result<TaskCompletion, ServiceError> {
        self.client
            .post("core/complete_task", &json!({ "task_id": task.task_id }))
            .await
    }

    async fn submit_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.call("submit_session", &json!({ "session_id": session_id })).await
    }

    async fn log_llm(&self, log: &LlmLog) -> Result<(), ServiceError> {
        self.call("log_llm", log).await
    }

    fn store(&self, task: &TaskInfo) -> Arc<dyn StoreApi> {
        Arc::new(HttpStoreClient::from_client(self.client.clone(), task.task_id.clone()))
    }
}
