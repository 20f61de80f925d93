//! # cyr-analyst
//!
//! Turns fetched articles into a board-level risk picture.
//!
//! Three language-model stages, each constrained to a JSON Schema from
//! `cyr-schema` and validated before it is accepted:
//!
//! 1. [`RiskAnalyzer::analyze_risks`]: emerging risks with impact and
//!    likelihood scores, plus a board summary
//! 2. [`RiskAnalyzer::plan_actions`]: prioritized board action points
//! 3. [`RiskAnalyzer::plan_projects`]: one project plan per action point,
//!    drafted concurrently with failures isolated per action
//!
//! [`trends::analyze`] adds a deterministic month-by-month volume view of the
//! same articles.

mod analyzer;
mod error;
mod llm;
pub mod prompts;
mod structured;
pub mod trends;

pub use analyzer::{ProjectPlanOutcomes, RiskAnalyzer, order_action_points};
pub use error::{AnalysisError, FailureReason, LlmError, Stage};
pub use llm::{ChatMessage, CompletionRequest, LanguageModel, OpenAiClient, Role};
pub use structured::{Completion, StructuredClient, StructuredOutput};
