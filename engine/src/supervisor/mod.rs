//! Background task supervision
//!
//! Every submitted analysis runs on its own tokio task. The supervisor keeps
//! the join handles so that:
//! - a panic inside a pipeline is caught and recorded on the task
//! - shutdown can wait for in-flight work to drain
//! - new submissions are refused once shutdown has started
//!
//! Tasks are never aborted. A task still running when the grace period runs
//! out is detached and dies with the runtime.

use crate::conductor::orchestrator::record_critical;
use crate::conductor::Orchestrator;
use crate::registry::TaskStore;
use futures::future::join_all;
use futures::FutureExt;
use sdk::errors::EngineError;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::Instrument;

/// Owns the background tasks spawned for submitted analyses
pub struct Supervisor {
    orchestrator: Arc<Orchestrator>,
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
    shutdown_flag: AtomicBool,
}

impl Supervisor {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            handles: Mutex::new(HashMap::new()),
            shutdown_flag: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        self.orchestrator.store()
    }

    /// Register a task for `target` and start it in the background.
    ///
    /// Returns the task id as soon as the task exists in the registry, before
    /// any pipeline work happens.
    pub fn submit(&self, target: &str) -> Result<String, EngineError> {
        if self.is_shutting_down() {
            return Err(EngineError::ShuttingDown);
        }

        let task_id = self.orchestrator.store().create(target);
        tracing::info!("Task {} submitted for {}", task_id, target);

        let orchestrator = Arc::clone(&self.orchestrator);
        let id = task_id.clone();
        let target = target.to_string();
        let span = tracing::info_span!("task", task_id = %task_id);

        let handle = tokio::spawn(
            async move {
                let outcome = AssertUnwindSafe(orchestrator.run(&id, &target))
                    .catch_unwind()
                    .await;

                if let Err(panic) = outcome {
                    let detail = format!("task panicked: {}", panic_message(panic.as_ref()));
                    tracing::error!("{}", detail);
                    record_critical(orchestrator.store().as_ref(), &id, &detail);
                }
            }
            .instrument(span),
        );

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|_, h| !h.is_finished());
        handles.insert(task_id.clone(), handle);

        Ok(task_id)
    }

    /// Number of background tasks that have not finished yet
    pub fn in_flight(&self) -> usize {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|_, h| !h.is_finished());
        handles.len()
    }

    /// Wait for one task to finish.
    ///
    /// Returns `false` if the supervisor holds no handle for `task_id`, which
    /// also happens once the handle was reaped after completion.
    pub async fn join(&self, task_id: &str) -> bool {
        let handle = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(task_id);

        match handle {
            Some(handle) => {
                if let Err(e) = handle.await {
                    tracing::error!("Task {} did not complete: {}", task_id, e);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }

    /// Refuse new submissions and wait up to `grace` for running tasks.
    ///
    /// Returns how many tasks were still running when the wait ended.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        tracing::info!("Starting graceful shutdown");
        self.shutdown_flag.store(true, Ordering::Relaxed);

        let mut pending: Vec<JoinHandle<()>> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, h)| h)
            .collect();

        if pending.is_empty() {
            return 0;
        }
        tracing::info!("Waiting for {} in-flight task(s)", pending.len());

        match timeout(grace, join_all(pending.iter_mut())).await {
            Ok(results) => {
                for e in results.into_iter().filter_map(Result::err) {
                    tracing::error!("Task did not complete: {}", e);
                }
                tracing::info!("All tasks drained");
                0
            }
            Err(_) => {
                let remaining = pending.iter().filter(|h| !h.is_finished()).count();
                tracing::warn!(
                    "Timeout waiting for tasks - {} still running, proceeding with shutdown",
                    remaining
                );
                remaining
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
