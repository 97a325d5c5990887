//! Task and wire types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an analysis task
///
/// Transitions are one-directional: `Pending -> Running -> {Done, Error}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Error => "error",
        }
    }

    /// Done and Error are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }

    /// Whether moving from `self` to `next` is a legal step of the state machine
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Done)
                | (TaskStatus::Running, TaskStatus::Error)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished task produced
///
/// Serialized untagged so the HTTP surface returns either an object naming
/// the stored artifact or the raw text the model returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskOutcome {
    /// The artifact was validated and written to disk
    Artifact { message: String, path: String },

    /// Raw model output salvaged after a failed aggregation or write
    Raw(String),
}

impl TaskOutcome {
    pub fn artifact(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::Artifact {
            message: format!("Artifact generated and saved to: {}", path),
            path,
        }
    }
}

/// Point-in-time copy of a task record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSnapshot {
    pub id: String,
    pub target: String,
    pub status: TaskStatus,
    pub log: Vec<String>,
    pub result: Option<TaskOutcome>,
    pub created_at: i64,
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Response of `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub task_id: String,
}

/// Response of `GET /log/:task_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResponse {
    pub log: Vec<String>,
    pub status: TaskStatus,
}

/// Response of `GET /result/:task_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: Option<TaskOutcome>,
    pub status: TaskStatus,
}

/// Error body shared by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
