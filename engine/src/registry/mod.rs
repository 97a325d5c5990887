//! In-memory task registry
//!
//! Every submitted analysis gets one record here. The orchestrator running a
//! task is the only writer for that id; HTTP pollers read snapshots
//! concurrently. Records are never evicted, so memory grows with the number
//! of tasks submitted over the process lifetime.

use chrono::Utc;
use sdk::{TaskOutcome, TaskSnapshot, TaskStatus};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Illegal status transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Concurrency-safe store of task records
///
/// Injected into the orchestrator and the HTTP layer as `Arc<dyn TaskStore>`.
pub trait TaskStore: Send + Sync {
    /// Register a new pending task and return its fresh id
    fn create(&self, target: &str) -> String;

    /// Append one line to the task log
    fn append_log(&self, id: &str, line: &str) -> Result<()>;

    /// Move the task to `status`; illegal transitions are rejected
    fn set_status(&self, id: &str, status: TaskStatus) -> Result<()>;

    /// Record what the task produced
    fn set_result(&self, id: &str, outcome: TaskOutcome) -> Result<()>;

    /// Consistent copy of the record
    fn get(&self, id: &str) -> Result<TaskSnapshot>;

    /// Number of tasks ever registered
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Task record
#[derive(Debug, Clone)]
struct TaskRecord {
    target: String,
    status: TaskStatus,
    log: Vec<String>,
    result: Option<TaskOutcome>,
    created_at: i64,
}

/// `RwLock<HashMap>` backed registry
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(&self, id: &str, f: impl FnOnce(&mut TaskRecord) -> Result<T>) -> Result<T> {
        // A panic while holding the lock leaves records intact; keep serving them
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let record = tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        f(record)
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create(&self, target: &str) -> String {
        let record = TaskRecord {
            target: target.to_string(),
            status: TaskStatus::Pending,
            log: Vec::new(),
            result: None,
            created_at: Utc::now().timestamp(),
        };

        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !tasks.contains_key(&id) {
                tasks.insert(id.clone(), record);
                return id;
            }
        }
    }

    fn append_log(&self, id: &str, line: &str) -> Result<()> {
        self.with_record(id, |record| {
            record.log.push(line.to_string());
            Ok(())
        })
    }

    fn set_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        self.with_record(id, |record| {
            if !record.status.can_transition_to(status) {
                return Err(RegistryError::InvalidTransition {
                    id: id.to_string(),
                    from: record.status,
                    to: status,
                });
            }
            record.status = status;
            Ok(())
        })
    }

    fn set_result(&self, id: &str, outcome: TaskOutcome) -> Result<()> {
        self.with_record(id, |record| {
            record.result = Some(outcome);
            Ok(())
        })
    }

    fn get(&self, id: &str) -> Result<TaskSnapshot> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks
            .get(id)
            .map(|record| TaskSnapshot {
                id: id.to_string(),
                target: record.target.clone(),
                status: record.status,
                log: record.log.clone(),
                result: record.result.clone(),
                created_at: record.created_at,
            })
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn len(&self) -> usize {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
