//! Conductor Executor
//!
//! Executes individual plan steps. The step text is the system instruction,
//! the target address is the user message. When the model answers that it
//! cannot reach the target, the page is fetched and the step is re-asked
//! with the raw content in place of the address.

use crate::conductor::types::{StepError, StepOutcome, StepResult};
use crate::fetcher::ContentFetcher;
use crate::llm::{CompletionClient, Message};
use crate::secrets::scrub_secrets;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Phrases (compared lowercase) that mark an answer as "I can't see the site"
pub const NO_ACCESS_PHRASES: &[&str] = &["не могу", "нет доступа", "cannot", "no access"];

/// Whether the model admits it could not access the target.
///
/// A plain substring match: "I cannot stress enough" triggers it, a refusal
/// phrased any other way does not.
pub fn admits_no_access(answer: &str) -> bool {
    let lowered = answer.to_lowercase();
    NO_ACCESS_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Executes individual plan steps against the model
pub struct StepExecutor {
    llm: Arc<dyn CompletionClient>,
    fetcher: Arc<dyn ContentFetcher>,
    model: String,
}

impl StepExecutor {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        fetcher: Arc<dyn ContentFetcher>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            fetcher,
            model: model.into(),
        }
    }

    /// Execute a single plan step
    ///
    /// Never fails: model errors become a `Failed` outcome so the remaining
    /// steps still run.
    pub async fn execute_step(&self, step: &str, target: &str) -> StepResult {
        let start = Instant::now();

        match self.answer(step, target).await {
            Ok((answer, used_fallback)) => {
                info!(
                    "Step completed in {:.1}s{}",
                    start.elapsed().as_secs_f64(),
                    if used_fallback { " (content fallback)" } else { "" }
                );
                StepResult {
                    step: step.to_string(),
                    outcome: StepOutcome::Answered(answer),
                    used_fallback,
                }
            }
            Err(e) => {
                let detail = scrub_secrets(&e.to_string());
                warn!("Step failed: {}", detail);
                StepResult {
                    step: step.to_string(),
                    outcome: StepOutcome::Failed(detail),
                    used_fallback: matches!(e, StepError::FallbackCompletion(_)),
                }
            }
        }
    }

    async fn answer(&self, step: &str, target: &str) -> Result<(String, bool), StepError> {
        let first = self
            .llm
            .complete(&[Message::system(step), Message::user(target)], &self.model)
            .await?;

        if !admits_no_access(&first) {
            return Ok((first, false));
        }

        debug!("Model reports no access to {}, fetching raw content", target);
        let content = self.fetcher.fetch(target).await;

        let second = self
            .llm
            .complete(&[Message::system(step), Message::user(content)], &self.model)
            .await
            .map_err(StepError::FallbackCompletion)?;

        Ok((second, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_no_access_english() {
        assert!(admits_no_access("I cannot browse the internet."));
        assert!(admits_no_access("Sorry, I have NO ACCESS to external sites"));
        assert!(!admits_no_access("The title tag is 54 characters long."));
    }

    #[test]
    fn test_admits_no_access_russian() {
        assert!(admits_no_access("К сожалению, я не могу открыть сайт"));
        assert!(admits_no_access("Нет доступа к ресурсу"));
    }

    #[test]
    fn test_admits_no_access_is_naive_substring() {
        // Known false positive of the heuristic
        assert!(admits_no_access("You cannot ignore the meta description."));
        // Known false negative
        assert!(!admits_no_access("I'm unable to open URLs."));
    }
}
