//! Conductor Planner
//!
//! Asks the model for an ordered list of analysis steps for a target and
//! normalizes whatever JSON shape comes back into a `Plan`.

use crate::conductor::types::{PipelineError, Plan};
use crate::llm::{parse_structured, CompletionClient, Message};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// System instruction for plan generation
pub const PLAN_PROMPT: &str = "Create a step-by-step plan (5-6 steps) for analyzing the website \
at the given address and producing its SEO core: the keywords and content themes the site \
should rank for. Return the result as JSON, one step per prompt.";

/// The JSON shapes a plan response is accepted in, tried in declaration order
#[derive(Debug, Clone, PartialEq)]
pub enum PlanShape {
    /// `["step", ...]`
    Sequence(Vec<Value>),

    /// `{"steps": ["step", ...], ...}`
    StepsField(Vec<Value>),

    /// Any other object: its values in document order
    MappingValues(Vec<Value>),

    /// Nothing usable
    Unsupported(&'static str),
}

impl PlanShape {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => match map.get("steps") {
                Some(Value::Array(items)) if !items.is_empty() => Self::StepsField(items.clone()),
                Some(steps) if is_truthy(steps) => {
                    Self::Unsupported("the steps field is not a list")
                }
                // Absent or empty steps: every value of the object, steps included
                _ => Self::MappingValues(map.into_iter().map(|(_, v)| v).collect()),
            },
            _ => Self::Unsupported("expected a list of steps or an object"),
        }
    }

    pub fn into_plan(self) -> Result<Plan, &'static str> {
        let items = match self {
            Self::Sequence(items) | Self::StepsField(items) | Self::MappingValues(items) => items,
            Self::Unsupported(reason) => return Err(reason),
        };

        Plan::new(items.into_iter().map(render_step).collect())
            .ok_or("the plan contains no steps")
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render_step(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Parse a raw model response into a plan
pub fn parse_plan(content: &str) -> Result<Plan, PipelineError> {
    let value = parse_structured(content).map_err(|e| PipelineError::PlanParse {
        reason: format!("response is not JSON ({})", e),
        raw: content.to_string(),
    })?;

    PlanShape::classify(value)
        .into_plan()
        .map_err(|reason| PipelineError::PlanParse {
            reason: reason.to_string(),
            raw: content.to_string(),
        })
}

/// Requests analysis plans from the model
pub struct Planner {
    llm: Arc<dyn CompletionClient>,
    model: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Generate a plan for `target`
    ///
    /// The model is called once; an unusable answer is a `PlanParse` error.
    pub async fn request_plan(&self, target: &str) -> Result<Plan, PipelineError> {
        let messages = [Message::system(PLAN_PROMPT), Message::user(target)];
        let content = self.llm.complete(&messages, &self.model).await?;
        debug!("plan response: {} bytes", content.len());

        parse_plan(&content).map_err(|e| {
            warn!("Failed to parse plan for {}: {}", target, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn steps(plan: &Plan) -> Vec<&str> {
        plan.steps().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_sequence() {
        let plan = parse_plan(r#"["check titles", "check meta"]"#).unwrap();
        assert_eq!(steps(&plan), vec!["check titles", "check meta"]);
    }

    #[test]
    fn test_parse_steps_field() {
        let plan = parse_plan(r#"{"goal": "seo", "steps": ["a", "b", "c"]}"#).unwrap();
        assert_eq!(steps(&plan), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_mapping_values_in_document_order() {
        let plan =
            parse_plan(r#"{"step_2": "second", "step_1": "first", "step_3": "third"}"#).unwrap();
        assert_eq!(steps(&plan), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_empty_steps_field_falls_back_to_values() {
        let plan = parse_plan(r#"{"steps": [], "one": "only step"}"#).unwrap();
        assert_eq!(steps(&plan), vec!["[]", "only step"]);
    }

    #[test]
    fn test_non_list_steps_field_is_rejected() {
        let err = parse_plan(r#"{"steps": "do everything"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::PlanParse { .. }));
    }

    #[test]
    fn test_non_string_steps_rendered_as_json() {
        let plan = parse_plan(r#"[{"prompt": "check h1"}, "check meta"]"#).unwrap();
        assert_eq!(steps(&plan), vec![r#"{"prompt":"check h1"}"#, "check meta"]);
    }

    #[test]
    fn test_fenced_plan_is_accepted() {
        let plan = parse_plan("```json\n[\"a\"]\n```").unwrap();
        assert_eq!(steps(&plan), vec!["a"]);
    }

    #[test]
    fn test_not_json_is_plan_parse_error() {
        let err = parse_plan("not json").unwrap_err();
        match err {
            PipelineError::PlanParse { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("expected PlanParse, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_shapes_rejected() {
        assert!(parse_plan("[]").is_err());
        assert!(parse_plan("{}").is_err());
        assert!(parse_plan("42").is_err());
        assert!(parse_plan(r#""just a string""#).is_err());
    }

    #[test]
    fn test_classify_tags() {
        assert!(matches!(
            PlanShape::classify(json!(["a"])),
            PlanShape::Sequence(_)
        ));
        assert!(matches!(
            PlanShape::classify(json!({"steps": ["a"]})),
            PlanShape::StepsField(_)
        ));
        assert!(matches!(
            PlanShape::classify(json!({"x": "a"})),
            PlanShape::MappingValues(_)
        ));
        assert!(matches!(
            PlanShape::classify(json!(null)),
            PlanShape::Unsupported(_)
        ));
    }
}
