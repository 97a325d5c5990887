//! Conductor Orchestrator
//!
//! Drives one task through plan -> steps -> aggregation -> persistence and
//! mirrors every stage into the task registry. Components return typed
//! errors; this is the single place that turns them into log lines, a
//! result and a terminal status.

use crate::artifacts::ArtifactStore;
use crate::conductor::aggregator::Aggregator;
use crate::conductor::executor::StepExecutor;
use crate::conductor::planner::Planner;
use crate::conductor::types::{PipelineError, StepOutcome, StepResult};
use crate::fetcher::ContentFetcher;
use crate::llm::CompletionClient;
use crate::registry::TaskStore;
use crate::secrets::scrub_secrets;
use sdk::{TaskOutcome, TaskStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Per-task pipeline driver
pub struct Orchestrator {
    store: Arc<dyn TaskStore>,
    planner: Planner,
    executor: StepExecutor,
    aggregator: Aggregator,
    artifacts: Arc<dyn ArtifactStore>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        llm: Arc<dyn CompletionClient>,
        fetcher: Arc<dyn ContentFetcher>,
        artifacts: Arc<dyn ArtifactStore>,
        model: &str,
    ) -> Self {
        Self {
            store,
            planner: Planner::new(Arc::clone(&llm), model),
            executor: StepExecutor::new(Arc::clone(&llm), fetcher, model),
            aggregator: Aggregator::new(llm, model),
            artifacts,
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Run the task to a terminal status and return it.
    ///
    /// Never returns an error: every failure ends up in the task log and
    /// status instead.
    pub async fn run(&self, task_id: &str, target: &str) -> TaskStatus {
        match self.drive(task_id, target).await {
            Ok(path) => self.finish(task_id, path),
            Err(e) => self.fail(task_id, e),
        }
    }

    async fn drive(&self, task_id: &str, target: &str) -> Result<PathBuf, PipelineError> {
        self.store.set_status(task_id, TaskStatus::Running)?;
        self.log(task_id, "Requesting analysis plan...")?;

        let plan = self.planner.request_plan(target).await?;
        let total = plan.len();
        self.log(task_id, &format!("Plan received. Steps: {}", total))?;

        let mut results: Vec<StepResult> = Vec::with_capacity(total);
        for (idx, step) in plan.steps().iter().enumerate() {
            let n = idx + 1;
            self.log(task_id, &format!("[{}/{}] {}", n, total, step))?;

            let result = self.executor.execute_step(step, target).await;

            if result.used_fallback {
                self.log(
                    task_id,
                    &format!(
                        "Step {}: model could not access the target, retried with fetched page content",
                        n
                    ),
                )?;
            }
            match &result.outcome {
                StepOutcome::Answered(answer) => {
                    self.log(task_id, &format!("Answer: {}\n", answer))?
                }
                StepOutcome::Failed(detail) => {
                    self.log(task_id, &format!("Step {} failed: {}", n, detail))?
                }
            }

            results.push(result);
        }

        self.log(task_id, "Aggregating final artifact...")?;
        let (artifact, raw) = self.aggregator.aggregate(&results).await?;

        let path = self
            .artifacts
            .persist(&artifact, target, task_id)
            .await
            .map_err(|e| PipelineError::Persist {
                reason: e.to_string(),
                raw,
            })?;

        self.log(task_id, &format!("Artifact saved to: {}", path.display()))?;
        Ok(path)
    }

    fn finish(&self, task_id: &str, path: PathBuf) -> TaskStatus {
        let outcome = TaskOutcome::artifact(path.display().to_string());
        let recorded = self
            .store
            .set_result(task_id, outcome)
            .and_then(|_| self.store.set_status(task_id, TaskStatus::Done));

        match recorded {
            Ok(()) => {
                info!("Task {} done", task_id);
                TaskStatus::Done
            }
            Err(e) => self.fail(task_id, e.into()),
        }
    }

    fn fail(&self, task_id: &str, err: PipelineError) -> TaskStatus {
        let line = match &err {
            PipelineError::PlanParse { raw, .. } => format!("Error: {}\n{}", err, raw),
            PipelineError::AggregationParse { .. } | PipelineError::Persist { .. } => {
                format!("Failed to save artifact: {}", err)
            }
            PipelineError::Critical(detail) => format!("Critical error: {}", detail),
        };
        let line = scrub_secrets(&line);
        warn!("Task {} failed: {}", task_id, err);

        if let Err(e) = self.store.append_log(task_id, &line) {
            error!("Could not record failure for task {}: {}", task_id, e);
        }
        if let Some(raw) = err.salvage() {
            if let Err(e) = self
                .store
                .set_result(task_id, TaskOutcome::Raw(raw.to_string()))
            {
                error!("Could not record result for task {}: {}", task_id, e);
            }
        }

        mark_error(self.store.as_ref(), task_id)
    }

    fn log(&self, task_id: &str, line: &str) -> Result<(), PipelineError> {
        info!("{}", line.trim_end());
        self.store.append_log(task_id, line)?;
        Ok(())
    }
}

/// Move a task to `error` from wherever it is, passing through `running`
/// when it never got that far. Terminal tasks are left alone.
pub fn mark_error(store: &dyn TaskStore, task_id: &str) -> TaskStatus {
    let current = match store.get(task_id) {
        Ok(task) => task.status,
        Err(e) => {
            error!("Cannot mark task {} as failed: {}", task_id, e);
            return TaskStatus::Error;
        }
    };

    if current.is_terminal() {
        return current;
    }
    if current == TaskStatus::Pending {
        if let Err(e) = store.set_status(task_id, TaskStatus::Running) {
            error!("Cannot start task {}: {}", task_id, e);
        }
    }
    if let Err(e) = store.set_status(task_id, TaskStatus::Error) {
        error!("Cannot mark task {} as failed: {}", task_id, e);
    }
    TaskStatus::Error
}

/// Record a crash-level failure that escaped the orchestrator
pub fn record_critical(store: &dyn TaskStore, task_id: &str, detail: &str) -> TaskStatus {
    let line = format!("Critical error: {}", scrub_secrets(detail));
    if let Err(e) = store.append_log(task_id, &line) {
        error!("Could not record failure for task {}: {}", task_id, e);
    }
    mark_error(store, task_id)
}
