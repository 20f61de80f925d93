//! Entity structs for every cyrisk pipeline stage.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`. The types
//! produced by the language model (`RiskAnalysis`, `ActionPlan`,
//! `ProjectPlan`) deny unknown fields so their generated schemas are closed,
//! which strict structured generation requires. Field doc comments become
//! schema descriptions and therefore guide the model.

mod action;
mod article;
mod project;
mod risk;
mod trends;

pub use action::{ActionPlan, ActionPoint};
pub use article::Article;
pub use project::{KeyedProjectPlan, ProjectPlan, ProjectPlans, RiskMitigation, TimelinePhase};
pub use risk::{Risk, RiskAnalysis, MAX_SCORE, MIN_SCORE};
pub use trends::{MonthlyVolume, ThreatTrends, TrendDirection};

use crate::errors::CoreError;

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
