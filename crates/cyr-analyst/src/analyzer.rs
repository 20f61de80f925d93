//! The three analysis stages over a [`LanguageModel`].

use std::sync::Arc;
use std::time::Duration;

use cyr_config::LlmConfig;
use cyr_core::entities::{
    ActionPlan, ActionPoint, Article, KeyedProjectPlan, ProjectPlan, ProjectPlans, Risk,
    RiskAnalysis,
};
use cyr_schema::SchemaError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{AnalysisError, FailureReason, Stage};
use crate::llm::LanguageModel;
use crate::prompts;
use crate::structured::StructuredClient;

/// Stage 3 results: every plan that succeeded, plus each failure by action
/// index.
#[derive(Debug)]
pub struct ProjectPlanOutcomes {
    pub plans: ProjectPlans,
    /// Sorted by action index.
    pub failures: Vec<(usize, AnalysisError)>,
}

/// Runs risk analysis, action planning, and project planning.
pub struct RiskAnalyzer<M> {
    client: StructuredClient<M>,
    config: LlmConfig,
}

impl<M: LanguageModel> RiskAnalyzer<M> {
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the output schemas cannot be built.
    pub fn new(model: M, config: &LlmConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            client: StructuredClient::new(model, config.max_retries)?,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.client = self.client.with_retry_backoff(backoff);
        self
    }

    pub const fn model(&self) -> &M {
        self.client.model()
    }

    /// Stage 1: identify emerging risks in the articles.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if `articles` is empty or no valid analysis
    /// was produced.
    pub async fn analyze_risks(&self, articles: &[Article]) -> Result<RiskAnalysis, AnalysisError> {
        if articles.is_empty() {
            return Err(AnalysisError::new(
                Stage::RiskAnalysis,
                0,
                FailureReason::EmptyInput("no articles to analyse"),
            ));
        }
        tracing::info!(articles = articles.len(), "analysing emerging risks");
        let analysis: RiskAnalysis = self
            .client
            .generate(
                Stage::RiskAnalysis,
                prompts::risk_analysis_messages(articles),
                &self.config.risk_analysis,
            )
            .await?;
        tracing::info!(risks = analysis.risks.len(), "risk analysis complete");
        Ok(analysis)
    }

    /// Stage 2: board action points, ordered by [`order_action_points`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if no valid plan was produced.
    pub async fn plan_actions(&self, analysis: &RiskAnalysis) -> Result<ActionPlan, AnalysisError> {
        tracing::info!(risks = analysis.risks.len(), "drafting board action plan");
        let plan: ActionPlan = self
            .client
            .generate(
                Stage::ActionPlan,
                prompts::action_plan_messages(analysis),
                &self.config.action_plan,
            )
            .await?;
        Ok(ActionPlan {
            action_points: order_action_points(plan.action_points, analysis),
        })
    }

    /// Stage 3 for one action point.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if no valid plan was produced.
    pub async fn plan_project(
        &self,
        action: &ActionPoint,
        risks: &[Risk],
    ) -> Result<ProjectPlan, AnalysisError> {
        self.client
            .generate(
                Stage::ProjectPlan,
                prompts::project_plan_messages(action, risks),
                &self.config.project_plan,
            )
            .await
    }
}

impl<M: LanguageModel + 'static> RiskAnalyzer<M> {
    /// Stage 3 for every action point, at most `max_concurrent_plans` at a
    /// time. A failing action point does not affect the others.
    pub async fn plan_projects(
        self: &Arc<Self>,
        plan: &ActionPlan,
        risks: &[Risk],
    ) -> ProjectPlanOutcomes {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_plans.max(1)));
        let risks: Arc<[Risk]> = risks.into();
        let mut set = JoinSet::new();

        for (idx, action) in plan.action_points.iter().cloned().enumerate() {
            let analyzer = Arc::clone(self);
            let sem = Arc::clone(&semaphore);
            let risks = Arc::clone(&risks);
            set.spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (idx, action, Err(None));
                };
                tracing::info!(action = idx + 1, title = %action.title, "drafting project plan");
                let result = analyzer.plan_project(&action, &risks).await.map_err(Some);
                (idx, action, result)
            });
        }

        let mut outcomes = ProjectPlanOutcomes {
            plans: ProjectPlans::new(plan.action_points.len()),
            failures: Vec::new(),
        };
        while let Some(joined) = set.join_next().await {
            let (idx, action, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "project plan task aborted");
                    continue;
                }
            };
            match result {
                Ok(plan) => {
                    let keyed = KeyedProjectPlan {
                        action_index: idx,
                        action_title: action.title,
                        plan,
                    };
                    if let Err(e) = outcomes.plans.insert(keyed) {
                        tracing::error!(action = idx + 1, error = %e, "discarding project plan");
                    }
                }
                Err(Some(e)) => {
                    tracing::warn!(action = idx + 1, error = %e, "project plan failed");
                    outcomes.failures.push((idx, e));
                }
                Err(None) => {
                    tracing::warn!(action = idx + 1, "project plan pool closed");
                }
            }
        }
        outcomes.failures.sort_by_key(|(idx, _)| *idx);
        outcomes
    }
}

/// Order action points by priority rank (1 first). Equal ranks go by the
/// earliest analysed risk each action names, and actions naming no known risk
/// follow those that do. Remaining ties keep the model's order.
#[must_use]
pub fn order_action_points(
    mut points: Vec<ActionPoint>,
    analysis: &RiskAnalysis,
) -> Vec<ActionPoint> {
    points.sort_by_key(|point| {
        let earliest_risk = point
            .related_risks
            .iter()
            .filter_map(|name| analysis.position_of(name))
            .min()
            .unwrap_or(usize::MAX);
        (point.priority, earliest_risk)
    });
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn risk(name: &str) -> Risk {
        Risk {
            name: name.into(),
            description: "d".into(),
            impact: 5,
            likelihood: 5,
            affected_targets: "t".into(),
        }
    }

    fn analysis() -> RiskAnalysis {
        RiskAnalysis {
            risks: vec![risk("Deepfake fraud"), risk("Ransomware"), risk("Supply chain")],
            board_summary: "s".into(),
        }
    }

    fn point(title: &str, priority: u32, related: &[&str]) -> ActionPoint {
        ActionPoint {
            title: title.into(),
            description: "d".into(),
            owner: "CISO".into(),
            priority,
            related_risks: related.iter().map(ToString::to_string).collect(),
        }
    }

    fn titles(points: &[ActionPoint]) -> Vec<&str> {
        points.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn priority_rank_comes_first() {
        let ordered = order_action_points(
            vec![point("c", 3, &[]), point("a", 1, &[]), point("b", 2, &[])],
            &analysis(),
        );
        assert_eq!(titles(&ordered), ["a", "b", "c"]);
    }

    #[test]
    fn ties_break_on_earliest_related_risk() {
        let ordered = order_action_points(
            vec![
                point("supply", 1, &["Supply chain"]),
                point("unknown", 1, &["Quantum"]),
                point("mixed", 1, &["supply chain", "deepfake FRAUD"]),
                point("ransom", 1, &["Ransomware"]),
            ],
            &analysis(),
        );
        assert_eq!(titles(&ordered), ["mixed", "ransom", "supply", "unknown"]);
    }

    #[test]
    fn full_ties_keep_model_order() {
        let ordered = order_action_points(
            vec![point("first", 2, &[]), point("second", 2, &["nope"])],
            &analysis(),
        );
        assert_eq!(titles(&ordered), ["first", "second"]);
    }

    #[test]
    fn ordering_is_deterministic() {
        let input = vec![
            point("x", 2, &["Ransomware"]),
            point("y", 1, &["Supply chain"]),
            point("z", 2, &["Deepfake fraud"]),
        ];
        let once = order_action_points(input.clone(), &analysis());
        let twice = order_action_points(once.clone(), &analysis());
        assert_eq!(once, twice);
        assert_eq!(titles(&once), ["y", "z", "x"]);
    }
}
