use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::errors::CoreError;

/// A single prioritized recommendation for the Board.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ActionPoint {
    /// A short title for the action.
    pub title: String,
    /// A clear, single-sentence action item for the Board to consider.
    pub description: String,
    /// The role or department suggested to own the action, e.g. `CISO`.
    pub owner: String,
    /// Priority rank, where 1 is the highest.
    #[schemars(range(min = 1))]
    pub priority: u32,
    /// Names of the analysed risks this action addresses.
    pub related_risks: Vec<String>,
}

impl ActionPoint {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for blank text or a zero priority.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("action title", &self.title)?;
        require_text("action description", &self.description)?;
        require_text("action owner", &self.owner)?;
        if self.priority == 0 {
            return Err(CoreError::Validation(format!(
                "action '{}' has priority 0, ranks start at 1",
                self.title
            )));
        }
        Ok(())
    }
}

/// Output of the second analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ActionPlan {
    pub action_points: Vec<ActionPoint>,
}

impl ActionPlan {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the plan is empty or any action is
    /// invalid.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.action_points.is_empty() {
            return Err(CoreError::Validation("action plan contains no action points".into()));
        }
        self.action_points.iter().try_for_each(ActionPoint::validate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.action_points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action_points.is_empty()
    }
}
