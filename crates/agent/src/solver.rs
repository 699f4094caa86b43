//! Tool-driven task solver: one agent loop per task.

use async_trait::async_trait;
use shopbot_config::AgentSettings;
use shopbot_core::message::{Conversation, Message};
use shopbot_core::provider::Provider;
use shopbot_core::store::StoreApi;
use shopbot_core::task::{SolveReport, TaskInfo, TaskSolver};
use shopbot_tools::store_registry;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use crate::loop_runner::AgentLoop;

pub struct LlmSolver {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    settings: AgentSettings,
}

impl LlmSolver {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            settings: AgentSettings::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }
}

#[async_trait]
impl TaskSolver for LlmSolver {
    async fn solve(&self, task: &TaskInfo, store: Arc<dyn StoreApi>) -> shopbot_core::Result<SolveReport> {
        let started = Instant::now();

        let mut agent = AgentLoop::new(
            self.provider.clone(),
            &self.model,
            self.temperature,
            Arc::new(store_registry(store)),
        )
        .with_max_iterations(self.settings.max_iterations)
        .with_max_nudges(self.settings.max_nudges);
        if let Some(max) = self.max_tokens {
            agent = agent.with_max_tokens(max);
        }

        let mut conversation = Conversation::new();
        conversation.push(Message::user(&task.task_text));
        let run = agent.run(&mut conversation).await?;

        info!(
            task_id = %task.task_id,
            iterations = run.iterations,
            nudges = run.nudges,
            checked_out = run.checked_out,
            prompt_tokens = run.usage.prompt_tokens,
            completion_tokens = run.usage.completion_tokens,
            "Agent finished task"
        );

        Ok(SolveReport {
            completion: run.answer,
            model: run.model,
            usage: run.usage,
            duration: started.elapsed(),
            checked_out: run.checked_out,
        })
    }
}
