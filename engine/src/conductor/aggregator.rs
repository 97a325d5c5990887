//! Folds every step result into one summarization request and validates the
//! answer as structured data.

use crate::conductor::types::{PipelineError, StepResult};
use crate::llm::{parse_structured, CompletionClient, Message};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// System instruction for the final summarization
pub const SUMMARY_PROMPT: &str = "Based on all intermediate results of the website analysis \
steps, assemble the final SEO core. Return the final SEO core strictly as structured JSON.";

/// Render step results as `Step:`/`Result:` blocks separated by a blank line
pub fn summary_input(results: &[StepResult]) -> String {
    results
        .iter()
        .map(|r| format!("Step: {}\nResult: {}", r.step, r.text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Validate aggregator output: a JSON object or array
pub fn parse_artifact(content: &str) -> Result<Value, PipelineError> {
    let value = parse_structured(content).map_err(|e| PipelineError::AggregationParse {
        reason: e.to_string(),
        raw: content.to_string(),
    })?;

    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        _ => Err(PipelineError::AggregationParse {
            reason: "expected a JSON object or array".to_string(),
            raw: content.to_string(),
        }),
    }
}

pub struct Aggregator {
    llm: Arc<dyn CompletionClient>,
    model: String,
}

impl Aggregator {
    pub fn new(llm: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Ask the model for the final artifact
    ///
    /// Returns the parsed artifact together with the raw text it came from,
    /// which is salvaged as the task result if persisting fails later.
    pub async fn aggregate(&self, results: &[StepResult]) -> Result<(Value, String), PipelineError> {
        let messages = [
            Message::system(SUMMARY_PROMPT),
            Message::user(summary_input(results)),
        ];
        let raw = self.llm.complete(&messages, &self.model).await?;

        match parse_artifact(&raw) {
            Ok(artifact) => Ok((artifact, raw)),
            Err(e) => {
                warn!("Aggregated output rejected: {}", e);
                Err(e)
            }
        }
    }
}
