//! Per-task results and the run summary.

use std::fmt;

/// Result of one task as scored by the harness.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    /// 1-based position in the session
    pub number: usize,
    pub task_id: String,
    pub spec_id: String,
    pub score: f64,
    /// Evaluation log from the harness
    pub logs: String,
    /// Solver failure, if the solver did not finish
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn failed(&self) -> bool {
        self.score == 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub session_id: String,
    pub total_tasks: usize,
    pub outcomes: Vec<TaskOutcome>,
    pub stopped_early: bool,
    pub submitted: bool,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn total_score(&self) -> f64 {
        self.outcomes.iter().map(|o| o.score).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for o in &self.outcomes {
            writeln!(f, "  {:2}. [{}] score {}", o.number, o.spec_id, o.score)?;
        }
        writeln!(
            f,
            "Score: {} over {} task(s)",
            self.total_score(),
            self.completed()
        )?;
        if self.submitted {
            write!(f, "Session submitted: {}", self.session_id)
        } else {
            writeln!(
                f,
                "Session NOT submitted (ran {}/{} tasks)",
                self.completed(),
                self.total_tasks
            )?;
            write!(f, "  Session ID: {}", self.session_id)
        }
    }
}

/// Indent every line of a harness log for display.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
