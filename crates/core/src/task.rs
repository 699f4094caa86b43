//! Benchmark tasks, sessions and the traits tying them to solvers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use crate::error::ServiceError;
use crate::provider::Usage;
use crate::store::StoreApi;

/// One benchmark scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub spec_id: String,
    pub task_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Session metadata sent when a run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub benchmark: String,
    pub workspace: String,
    pub name: String,
    pub architecture: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
}

/// Evaluation attached to a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEval {
    pub score: f64,
    #[serde(default)]
    pub logs: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCompletion {
    #[serde(default)]
    pub eval: Option<TaskEval>,
}

/// LLM usage reported to the harness after each task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmLog {
    pub task_id: String,
    pub model: String,
    pub completion: String,
    pub duration_sec: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The benchmark harness: sessions, task lifecycle and per-task stores.
#[async_trait]
pub trait Benchmark: Send + Sync {
    async fn start_session(&self, meta: &SessionMeta) -> Result<SessionStarted, ServiceError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ServiceError>;

    async fn start_task(&self, task: &TaskInfo) -> Result<(), ServiceError>;

    async fn complete_task(&self, task: &TaskInfo) -> Result<TaskCompletion, ServiceError>;

    async fn submit_session(&self, session_id: &str) -> Result<(), ServiceError>;

    async fn log_llm(&self, log: &LlmLog) -> Result<(), ServiceError>;

    /// The basket service bound to one task.
    fn store(&self, task: &TaskInfo) -> Arc<dyn StoreApi>;
}

/// What a solver hands back after working on a task.
#[derive(Debug, Clone, Default)]
pub struct SolveReport {
    /// Final free-text answer of the model (or a summary for non-LLM solvers)
    pub completion: String,
    pub model: String,
    pub usage: Usage,
    pub duration: Duration,
    pub checked_out: bool,
}

/// Drives one task to checkout against its store.
#[async_trait]
pub trait TaskSolver: Send + Sync {
    async fn solve(&self, task: &TaskInfo, store: Arc<dyn StoreApi>) -> crate::Result<SolveReport>;
}

/// An inclusive, 1-based range of task numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskRangeError {
    #[error("Invalid task number in '{0}'")]
    NotANumber(String),

    #[error("Invalid task range: {arg}. Valid range: 1-{max}")]
    OutOfBounds { arg: String, max: usize },
}

impl TaskRange {
    /// Parse `"3"` or `"1-5"` and validate it against the task count.
    pub fn parse(arg: &str, max_tasks: usize) -> Result<Self, TaskRangeError> {
        let number = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| TaskRangeError::NotANumber(arg.to_string()))
        };

        let (start, end) = match arg.split_once('-') {
            Some((a, b)) => (number(a)?, number(b)?),
            None => {
                let n = number(arg)?;
                (n, n)
            }
        };

        if start < 1 || end > max_tasks || start > end {
            return Err(TaskRangeError::OutOfBounds {
                arg: arg.to_string(),
                max: max_tasks,
            });
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, number: usize) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

impl std::fmt::Display for TaskRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_task_number() {
        assert_eq!(TaskRange::parse("3", 10).unwrap(), TaskRange { start: 3, end: 3 });
    }

    #[test]
    fn inclusive_range() {
        let range = TaskRange::parse("1-5", 10).unwrap();
        assert_eq!(range, TaskRange { start: 1, end: 5 });
        assert!(range.contains(1));
        assert!(range.contains(5));
        assert!(!range.contains(6));
        assert_eq!(range.to_string(), "1-5");
    }

    #[test]
    fn out_of_bounds_rejected() {
        assert!(matches!(
            TaskRange::parse("0", 10),
            Err(TaskRangeError::OutOfBounds { .. })
        ));
        assert!(TaskRange::parse("11", 10).is_err());
        assert!(TaskRange::parse("3-12", 10).is_err());
    }

    #[test]
    fn reversed_range_rejected() {
        let err = TaskRange::parse("5-2", 10).unwrap_err();
        assert_eq!(err.to_string(), "Invalid task range: 5-2. Valid range: 1-10");
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            TaskRange::parse("abc", 10),
            Err(TaskRangeError::NotANumber(_))
        ));
        assert!(TaskRange::parse("1-", 10).is_err());
    }

    #[test]
    fn completion_without_eval() {
        let done: TaskCompletion = serde_json::from_str("{}").unwrap();
        assert!(done.eval.is_none());

        let done: TaskCompletion =
            serde_json::from_str(r#"{"eval":{"score":1.0,"logs":"ok"}}"#).unwrap();
        assert_eq!(done.eval.unwrap().score, 1.0);
    }
}
