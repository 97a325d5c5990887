//! Conductor System
//!
//! Orchestrates planning, step execution, aggregation and persistence for a
//! single analysis task.

pub mod aggregator;
pub mod executor;
pub mod orchestrator;
pub mod planner;
pub mod types;

pub use aggregator::Aggregator;
pub use executor::{admits_no_access, StepExecutor};
pub use orchestrator::Orchestrator;
pub use planner::{PlanShape, Planner};
pub use types::{PipelineError, Plan, StepError, StepOutcome, StepResult};
