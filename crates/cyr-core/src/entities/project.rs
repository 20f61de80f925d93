use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::errors::CoreError;

/// One phase of a project timeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TimelinePhase {
    /// Phase name, e.g. `Discovery`.
    pub phase: String,
    /// Duration or milestone, e.g. `4 weeks` or `Q3 board review`.
    pub duration: String,
}

/// A project-level risk and how to mitigate it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RiskMitigation {
    /// An obstacle that could hinder the project.
    pub risk: String,
    /// How the obstacle will be mitigated.
    pub mitigation: String,
}

/// A structured, high-level project plan for one action point.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectPlan {
    /// The title of the project, derived from the action point.
    pub title: String,
    /// A clear statement of what the project aims to achieve.
    pub objective: String,
    /// Key roles or departments involved in the project.
    pub stakeholders: Vec<String>,
    /// Ordered high-level phases of the project.
    pub timeline: Vec<TimelinePhase>,
    /// Key Performance Indicators to measure the project's success.
    pub kpis: Vec<String>,
    /// Potential obstacles and their mitigations.
    pub risks_and_mitigations: Vec<RiskMitigation>,
}

impl ProjectPlan {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a blank title or objective, or
    /// when stakeholders or the timeline are empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("project title", &self.title)?;
        require_text("project objective", &self.objective)?;
        if self.stakeholders.is_empty() {
            return Err(CoreError::Validation(format!(
                "project '{}' lists no stakeholders",
                self.title
            )));
        }
        if self.timeline.is_empty() {
            return Err(CoreError::Validation(format!(
                "project '{}' has no timeline phases",
                self.title
            )));
        }
        Ok(())
    }
}

/// A project plan bound to the action point it expands.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct KeyedProjectPlan {
    /// Zero-based index into the ordered action plan.
    pub action_index: usize,
    pub action_title: String,
    pub plan: ProjectPlan,
}

/// Project plans for one action plan, ordered by action index.
///
/// Only accepts plans for action points that exist, at most one per action.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProjectPlans {
    action_count: usize,
    plans: Vec<KeyedProjectPlan>,
}

impl ProjectPlans {
    #[must_use]
    pub const fn new(action_count: usize) -> Self {
        Self {
            action_count,
            plans: Vec::new(),
        }
    }

    /// Add a plan, keeping the collection sorted by action index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownActionPoint`] if the index is out of range
    /// and [`CoreError::DuplicatePlan`] if the action already has a plan.
    pub fn insert(&mut self, plan: KeyedProjectPlan) -> Result<(), CoreError> {
        if plan.action_index >= self.action_count {
            return Err(CoreError::UnknownActionPoint {
                index: plan.action_index,
                count: self.action_count,
            });
        }
        match self
            .plans
            .binary_search_by_key(&plan.action_index, |p| p.action_index)
        {
            Ok(_) => Err(CoreError::DuplicatePlan {
                index: plan.action_index,
            }),
            Err(pos) => {
                self.plans.insert(pos, plan);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn get(&self, action_index: usize) -> Option<&KeyedProjectPlan> {
        self.plans
            .binary_search_by_key(&action_index, |p| p.action_index)
            .ok()
            .map(|pos| &self.plans[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyedProjectPlan> {
        self.plans.iter()
    }

    /// Action indices that have no plan.
    #[must_use]
    pub fn missing(&self) -> Vec<usize> {
        (0..self.action_count)
            .filter(|idx| self.get(*idx).is_none())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keyed(action_index: usize) -> KeyedProjectPlan {
        KeyedProjectPlan {
            action_index,
            action_title: format!("Action {action_index}"),
            plan: ProjectPlan {
                title: "Zero trust rollout".into(),
                objective: "Reduce lateral movement".into(),
                stakeholders: vec!["CISO".into()],
                timeline: vec![TimelinePhase {
                    phase: "Discovery".into(),
                    duration: "4 weeks".into(),
                }],
                kpis: vec!["MFA coverage".into()],
                risks_and_mitigations: vec![],
            },
        }
    }

    #[test]
    fn insert_keeps_index_order() {
        let mut plans = ProjectPlans::new(3);
        plans.insert(keyed(2)).unwrap();
        plans.insert(keyed(0)).unwrap();
        let order: Vec<usize> = plans.iter().map(|p| p.action_index).collect();
        assert_eq!(order, vec![0, 2]);
        assert_eq!(plans.missing(), vec![1]);
    }

    #[test]
    fn rejects_unknown_action() {
        let mut plans = ProjectPlans::new(2);
        let err = plans.insert(keyed(2)).unwrap_err();
        assert_eq!(err, CoreError::UnknownActionPoint { index: 2, count: 2 });
    }

    #[test]
    fn rejects_duplicate_plan() {
        let mut plans = ProjectPlans::new(2);
        plans.insert(keyed(1)).unwrap();
        let err = plans.insert(keyed(1)).unwrap_err();
        assert_eq!(err, CoreError::DuplicatePlan { index: 1 });
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn plan_requires_timeline() {
        let mut plan = keyed(0).plan;
        plan.timeline.clear();
        assert!(plan.validate().is_err());
    }
}
