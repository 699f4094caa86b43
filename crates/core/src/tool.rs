//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are the only way the agent can touch the store: list the catalog,
//! edit the basket, apply coupons and check out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::{ErrorKind, ServiceError, ToolError};
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    pub name: String,

    pub arguments: serde_json::Value,
}

/// What a tool produced.
///
/// Both variants are rendered for the model by [`ToolOutcome::to_wire`]; the
/// error kind only survives on the Rust side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { data: serde_json::Value },
    Error { kind: ErrorKind, message: String },
}

impl ToolOutcome {
    /// Serialize any response record as a success.
    pub fn success<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(data) => Self::Success { data },
            Err(e) => Self::error(ErrorKind::Internal, e.to_string()),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }

    /// The compact JSON string handed to the model.
    ///
    /// Successes drop null fields; every failure becomes `{"error": message}`.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Success { data } => prune_nulls(data.clone()).to_string(),
            Self::Error { message, .. } => serde_json::json!({ "error": message }).to_string(),
        }
    }
}

impl From<ServiceError> for ToolOutcome {
    fn from(err: ServiceError) -> Self {
        Self::error(err.kind(), err.to_string())
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(err: ToolError) -> Self {
        Self::error(err.kind(), err.to_string())
    }
}

fn prune_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(prune_nulls).collect())
        }
        other => other,
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn new(call_id: impl Into<String>, outcome: ToolOutcome) -> Self {
        Self {
            call_id: call_id.into(),
            outcome,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn output(&self) -> String {
        self.outcome.to_wire()
    }
}

/// The core Tool trait.
///
/// Each store operation implements this trait. Tools are registered in the
/// ToolRegistry and made available to the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "view_basket").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    ///
    /// Service failures are reported inside the returned outcome; `Err` is
    /// reserved for calls the tool could not even attempt.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolOutcome, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool definitions, sorted by name so requests are stable.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool call. Never fails: lookup and argument errors become
    /// error outcomes like any other failure.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let outcome = match self.tools.get(&call.name) {
            Some(tool) => match tool.execute(call.arguments.clone()).await {
                Ok(outcome) => outcome,
                Err(e) => e.into(),
            },
            None => ToolError::NotFound(call.name.clone()).into(),
        };
        ToolResult::new(&call.id, outcome)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
