//! Sequential task runner over one benchmark session.

use shopbot_core::error::ServiceError;
use shopbot_core::task::{
    Benchmark, LlmLog, SessionMeta, TaskInfo, TaskRange, TaskRangeError, TaskSolver,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use crate::summary::{RunSummary, TaskOutcome, indent};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Benchmark harness error: {0}")]
    Harness(#[from] ServiceError),

    #[error(transparent)]
    Range(#[from] TaskRangeError),
}

/// An open session and its tasks in harness order.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub tasks: Vec<TaskInfo>,
}

impl Session {
    /// Start a session and fetch its task list.
    pub async fn open(benchmark: &dyn Benchmark, meta: &SessionMeta) -> Result<Self, RunnerError> {
        let started = benchmark.start_session(meta).await?;
        let status = benchmark.session_status(&started.session_id).await?;
        info!(session_id = %started.session_id, tasks = status.tasks.len(), "Session started");
        Ok(Self {
            id: started.session_id,
            tasks: status.tasks,
        })
    }

    /// `NN. [spec_id] task_text` for every task.
    pub fn listing(&self) -> Vec<String> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{:2}. [{}] {}", i + 1, t.spec_id, t.task_text))
            .collect()
    }

    /// Tasks to run with their 1-based numbers.
    pub fn select(&self, range: Option<TaskRange>) -> Vec<(usize, &TaskInfo)> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (i + 1, t))
            .filter(|(n, _)| range.is_none_or(|r| r.contains(*n)))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Task number or inclusive range, e.g. "3" or "1-5"
    pub task: Option<String>,
    pub stop_on_fail: bool,
}

pub struct TaskRunner {
    benchmark: Arc<dyn Benchmark>,
    solver: Arc<dyn TaskSolver>,
}

impl TaskRunner {
    pub fn new(benchmark: Arc<dyn Benchmark>, solver: Arc<dyn TaskSolver>) -> Self {
        Self { benchmark, solver }
    }

    pub async fn open_session(&self, meta: &SessionMeta) -> Result<Session, RunnerError> {
        Session::open(self.benchmark.as_ref(), meta).await
    }

    /// Run the selected tasks one after another.
    ///
    /// Solver and per-task harness failures are logged and scored 0; they
    /// never stop the run. The session is submitted only when every task ran.
    pub async fn run(&self, session: &Session, options: &RunOptions) -> Result<RunSummary, RunnerError> {
        let range = options
            .task
            .as_deref()
            .map(|arg| TaskRange::parse(arg, session.tasks.len()))
            .transpose()?;
        if let Some(r) = range {
            info!(range = %r, "Running task range");
        }

        let mut summary = RunSummary {
            session_id: session.id.clone(),
            total_tasks: session.tasks.len(),
            ..RunSummary::default()
        };

        for (number, task) in session.select(range) {
            let outcome = self.run_task(number, task).await;
            let failed = outcome.failed();
            summary.outcomes.push(outcome);

            if options.stop_on_fail && failed {
                warn!(task = number, "Stopping: task scored 0");
                summary.stopped_early = true;
                break;
            }
        }

        if range.is_none() && !summary.stopped_early {
            self.benchmark.submit_session(&session.id).await?;
            summary.submitted = true;
            info!(session_id = %session.id, "Session submitted");
        } else {
            info!(
                session_id = %session.id,
                ran = summary.completed(),
                total = summary.total_tasks,
                "Session left open"
            );
        }

        Ok(summary)
    }

    async fn run_task(&self, number: usize, task: &TaskInfo) -> TaskOutcome {
        info!(
            task = number,
            task_id = %task.task_id,
            spec_id = %task.spec_id,
            text = %task.task_text,
            "Starting task"
        );

        if let Err(e) = self.benchmark.start_task(task).await {
            error!(task_id = %task.task_id, error = %e, "Failed to start task");
        }

        let store = self.benchmark.store(task);
        let solve_error = match self.solver.solve(task, store).await {
            Ok(report) => {
                info!(
                    task_id = %task.task_id,
                    checked_out = report.checked_out,
                    duration_ms = report.duration.as_millis() as u64,
                    total_tokens = report.usage.total_tokens,
                    "Solver finished"
                );
                let log = LlmLog {
                    task_id: task.task_id.clone(),
                    model: report.model,
                    completion: report.completion,
                    duration_sec: report.duration.as_secs_f64(),
                    prompt_tokens: report.usage.prompt_tokens,
                    completion_tokens: report.usage.completion_tokens,
                };
                if let Err(e) = self.benchmark.log_llm(&log).await {
                    warn!(task_id = %task.task_id, error = %e, "Failed to report LLM usage");
                }
                None
            }
            Err(e) => {
                let chain = error_chain(&e);
                error!(task_id = %task.task_id, error = %chain, "Solver failed");
                Some(chain)
            }
        };

        let (score, logs) = match self.benchmark.complete_task(task).await {
            Ok(completion) => match completion.eval {
                Some(eval) => (eval.score, eval.logs),
                None => (0.0, String::new()),
            },
            Err(e) => {
                error!(task_id = %task.task_id, error = %e, "Failed to complete task");
                (0.0, String::new())
            }
        };
        info!(task = number, score, "Task scored\n{}", indent(&logs, "  "));

        TaskOutcome {
            number,
            task_id: task.task_id.clone(),
            spec_id: task.spec_id.clone(),
            score,
            logs,
            error: solve_error,
        }
    }
}

/// `outer: inner: root` for an error and its sources.
///
/// A cause already quoted at the end of its parent's message is skipped.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !chain.ends_with(&message) {
            chain.push_str(": ");
            chain.push_str(&message);
        }
        source = cause.source();
    }
    chain
}
