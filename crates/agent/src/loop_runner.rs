//! The agent reasoning loop implementation.

use std::sync::Arc;
use shopbot_core::message::{Conversation, Message, Role};
use shopbot_core::provider::{Provider, ProviderRequest, Usage};
use shopbot_core::tool::{ToolCall, ToolOutcome, ToolRegistry, ToolResult};
use shopbot_core::ErrorKind;
use shopbot_tools::CHECKOUT_TOOL;
use tracing::{debug, info, warn};
use crate::prompt;

/// What one run of the loop produced.
#[derive(Debug, Clone, Default)]
pub struct AgentRun {
    /// Last text answer of the model
    pub answer: String,

    /// Model that actually answered
    pub model: String,

    /// Token usage summed over every response
    pub usage: Usage,

    pub iterations: u32,

    pub nudges: u32,

    /// Whether `checkout_basket` succeeded during the run
    pub checked_out: bool,
}

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    system_prompt: String,

    /// Maximum LLM round-trips per run
    max_iterations: u32,

    /// Autonomy reminders allowed before a text answer is accepted
    max_nudges: u32,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
            max_iterations: 100,
            max_nudges: 3,
        }
    }

    /// Set the maximum number of LLM round-trips.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_nudges(mut self, max: u32) -> Self {
        self.max_nudges = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Drive the conversation until the model answers with text.
    ///
    /// 1. Send the conversation and tool definitions to the provider
    /// 2. Execute every requested tool call in order, appending the results
    /// 3. On a text-only answer before checkout, append a reminder and go on
    /// 4. Stop on a text answer after checkout, when reminders run out, or at
    ///    the iteration cap
    pub async fn run(&self, conversation: &mut Conversation) -> Result<AgentRun, shopbot_core::Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Processing conversation"
        );

        if conversation.messages.first().map(|m| &m.role) != Some(&Role::System) {
            conversation
                .messages
                .insert(0, Message::system(&self.system_prompt));
        }

        let tool_definitions = self.tools.definitions();
        let mut run = AgentRun {
            model: self.model.clone(),
            ..AgentRun::default()
        };

        while run.iterations < self.max_iterations {
            run.iterations += 1;
            debug!(
                conversation_id = %conversation.id,
                iteration = run.iterations,
                "Agent loop iteration"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;
            if let Some(usage) = response.usage {
                run.usage += usage;
            }
            if !response.model.is_empty() {
                run.model = response.model.clone();
            }

            if response.message.tool_calls.is_empty() {
                run.answer = response.message.content.clone();
                conversation.push(response.message);

                if run.checked_out || run.nudges >= self.max_nudges {
                    return Ok(run);
                }

                run.nudges += 1;
                info!(nudge = run.nudges, "Model stopped before checkout, nudging");
                conversation.push(Message::user(prompt::NUDGE));
                continue;
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                let result = match parse_arguments(&tc.arguments) {
                    Ok(arguments) => {
                        let call = ToolCall {
                            id: tc.id.clone(),
                            name: tc.name.clone(),
                            arguments,
                        };
                        self.tools.execute(&call).await
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Unparseable tool arguments");
                        ToolResult::new(
                            &tc.id,
                            ToolOutcome::error(
                                ErrorKind::InvalidArguments,
                                format!("arguments are not valid JSON: {e}"),
                            ),
                        )
                    }
                };

                if tc.name == CHECKOUT_TOOL && result.success() {
                    run.checked_out = true;
                }
                conversation.push(Message::tool_result(&tc.id, result.output()));
            }
        }

        warn!(
            conversation_id = %conversation.id,
            iterations = run.iterations,
            checked_out = run.checked_out,
            "Max iterations reached"
        );
        if run.answer.is_empty() {
            run.answer = format!("Stopped after {} iterations without a final answer.", run.iterations);
        }
        Ok(run)
    }
}

/// Models sometimes send an empty string for "no arguments".
fn parse_arguments(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw)
}
