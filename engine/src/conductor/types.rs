//! Conductor types shared by the planner, executor, aggregator and
//! orchestrator.

use crate::llm::LLMError;
use crate::registry::RegistryError;
use serde::{Deserialize, Serialize};

/// Ordered, non-empty list of step instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    steps: Vec<String>,
}

impl Plan {
    /// Returns `None` for an empty list
    pub fn new(steps: Vec<String>) -> Option<Self> {
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps })
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum StepOutcome {
    Answered(String),
    Failed(String),
}

/// One executed plan step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub outcome: StepOutcome,
    /// The model could not see the target and was re-asked with fetched content
    pub used_fallback: bool,
}

impl StepResult {
    /// Text fed to the aggregator: the answer, or an error marker
    pub fn text(&self) -> String {
        match &self.outcome {
            StepOutcome::Answered(answer) => answer.clone(),
            StepOutcome::Failed(detail) => format!("Error: {}", detail),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed(_))
    }
}

/// Per-step failure; recorded, never fatal to the task
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("model call failed: {0}")]
    Completion(#[from] LLMError),

    #[error("model call failed after content fallback: {0}")]
    FallbackCompletion(LLMError),
}

/// Failures that end a task in `error`
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Plan response was not usable; no steps ran
    #[error("invalid plan content: {reason}")]
    PlanParse { reason: String, raw: String },

    /// Aggregated output was not structured data
    #[error("aggregated output is not valid structured data: {reason}")]
    AggregationParse { reason: String, raw: String },

    /// Artifact could not be written
    #[error("failed to persist artifact: {reason}")]
    Persist { reason: String, raw: String },

    /// Anything else
    #[error("{0}")]
    Critical(String),
}

impl PipelineError {
    /// Raw model text worth surfacing as the task result
    pub fn salvage(&self) -> Option<&str> {
        match self {
            Self::AggregationParse { raw, .. } | Self::Persist { raw, .. } => Some(raw),
            Self::PlanParse { .. } | Self::Critical(_) => None,
        }
    }
}

impl From<RegistryError> for PipelineError {
    fn from(err: RegistryError) -> Self {
        Self::Critical(err.to_string())
    }
}

impl From<LLMError> for PipelineError {
    fn from(err: LLMError) -> Self {
        Self::Critical(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_rejects_empty() {
        assert!(Plan::new(vec![]).is_none());
        let plan = Plan::new(vec!["check titles".to_string()]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0], "check titles");
    }

    #[test]
    fn test_step_result_text() {
        let ok = StepResult {
            step: "check meta".to_string(),
            outcome: StepOutcome::Answered("meta looks fine".to_string()),
            used_fallback: false,
        };
        assert_eq!(ok.text(), "meta looks fine");
        assert!(!ok.is_failure());

        let failed = StepResult {
            step: "check meta".to_string(),
            outcome: StepOutcome::Failed("Timeout".to_string()),
            used_fallback: false,
        };
        assert_eq!(failed.text(), "Error: Timeout");
        assert!(failed.is_failure());
    }

    #[test]
    fn test_salvage_only_for_late_failures() {
        let err = PipelineError::AggregationParse {
            reason: "expected value".to_string(),
            raw: "prose".to_string(),
        };
        assert_eq!(err.salvage(), Some("prose"));

        let err = PipelineError::PlanParse {
            reason: "expected value".to_string(),
            raw: "not json".to_string(),
        };
        assert_eq!(err.salvage(), None);
        assert!(err.to_string().contains("invalid plan content"));
    }
}
