//! End-to-end run: fetch → trends → risks → actions → project plans →
//! reports → dashboard.
//!
//! Fetch failures are tolerated per query, and project plan failures per
//! action point. Zero articles, or a failed risk analysis or action plan,
//! ends the run. A report file that fails to write is recorded and the run
//! continues, so the dashboard is still attempted.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use cyr_analyst::{LanguageModel, RiskAnalyzer, trends};
use cyr_core::entities::{ActionPlan, RiskAnalysis, ThreatTrends};
use cyr_news::{ArticleCache, NewsFetcher, SearchProvider};
use cyr_report::{DashboardData, ReportWriter, WriteError, render_dashboard};

use crate::progress::Progress;

/// Reason shown for an action point whose planning task ended without
/// reporting an error.
const NO_RESULT_REASON: &str = "planning task ended without a result";

/// An action point that ended the run without a project plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlan {
    /// 1-based, matching the `3_project_plan_{n}.json` numbering.
    pub number: usize,
    pub title: String,
    pub reason: String,
}

/// What happened during one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub queries: usize,
    pub failed_queries: Vec<String>,
    pub cache_hits: usize,
    pub articles: usize,
    pub risks: usize,
    pub action_points: usize,
    pub project_plans: usize,
    pub missing_plans: Vec<MissingPlan>,
    pub written: Vec<PathBuf>,
    pub write_failures: Vec<String>,
    pub dashboard: Option<PathBuf>,
    /// Set when the run stopped before producing its reports.
    pub aborted: Option<String>,
}

impl RunSummary {
    /// Non-zero on abort or on any file that failed to write.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.aborted.is_some() || !self.write_failures.is_empty())
    }

    fn record_write(&mut self, result: Result<PathBuf, WriteError>) -> Option<PathBuf> {
        match result {
            Ok(path) => {
                self.written.push(path.clone());
                Some(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "report file not written");
                self.write_failures.push(e.to_string());
                None
            }
        }
    }

    fn abort(mut self, reason: String) -> Self {
        tracing::error!(%reason, "run aborted");
        self.aborted = Some(reason);
        self
    }
}

/// The pipeline and its collaborators.
pub struct Pipeline<S, C, M> {
    fetcher: NewsFetcher<S, C>,
    analyzer: Arc<RiskAnalyzer<M>>,
    writer: ReportWriter,
    keywords: Vec<String>,
    dashboard_file: String,
}

impl<S, C, M> Pipeline<S, C, M>
where
    S: SearchProvider,
    C: ArticleCache,
    M: LanguageModel + 'static,
{
    pub fn new(
        fetcher: NewsFetcher<S, C>,
        analyzer: RiskAnalyzer<M>,
        writer: ReportWriter,
        keywords: Vec<String>,
        dashboard_file: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            analyzer: Arc::new(analyzer),
            writer,
            keywords,
            dashboard_file: dashboard_file.into(),
        }
    }

    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary {
            output_dir: self.writer.dir().to_path_buf(),
            ..RunSummary::default()
        };

        let progress = Progress::spinner("Fetching cybersecurity news");
        let report = self.fetcher.fetch(&self.keywords).await;
        summary.queries = report.queries;
        summary.cache_hits = report.cache_hits;
        summary.failed_queries = report.failures.iter().map(|f| f.query.clone()).collect();
        summary.articles = report.articles.len();
        if report.articles.is_empty() {
            progress.finish_err("No articles fetched");
            return summary.abort(format!(
                "no articles were fetched ({} of {} queries failed)",
                report.failures.len(),
                report.queries
            ));
        }
        progress.finish_ok(&format!(
            "Fetched {} articles from {} of {} queries",
            report.articles.len(),
            report.succeeded(),
            report.queries
        ));
        let articles = report.articles;

        let threat_trends = trends::analyze(&articles);

        let progress = Progress::spinner("Analysing emerging risks");
        let analysis = match self.analyzer.analyze_risks(&articles).await {
            Ok(analysis) => analysis,
            Err(e) => {
                progress.finish_err("Risk analysis failed");
                return summary.abort(e.to_string());
            }
        };
        progress.finish_ok(&format!("Identified {} emerging risks", analysis.risks.len()));
        summary.risks = analysis.risks.len();
        summary.record_write(self.writer.write_risk_analysis(&analysis));

        let progress = Progress::spinner("Drafting board action plan");
        let actions = match self.analyzer.plan_actions(&analysis).await {
            Ok(actions) => actions,
            Err(e) => {
                progress.finish_err("Action plan failed");
                if let Err(clear) = self.writer.clear_after_risk_analysis(&self.dashboard_file) {
                    tracing::error!(error = %clear, "earlier reports not removed");
                    summary.write_failures.push(clear.to_string());
                }
                return summary.abort(e.to_string());
            }
        };
        progress.finish_ok(&format!("Drafted {} action points", actions.len()));
        summary.action_points = actions.len();
        summary.record_write(self.writer.write_action_plan(&actions));

        self.project_plans(&mut summary, &analysis, &actions, &threat_trends)
            .await;
        summary
    }

    async fn project_plans(
        &self,
        summary: &mut RunSummary,
        analysis: &RiskAnalysis,
        actions: &ActionPlan,
        threat_trends: &ThreatTrends,
    ) {
        let progress = Progress::spinner("Drafting project plans");
        let outcomes = self.analyzer.plan_projects(actions, &analysis.risks).await;
        if outcomes.failures.is_empty() {
            progress.finish_ok(&format!("Drafted {} project plans", outcomes.plans.len()));
        } else {
            progress.finish_warn(&format!(
                "Drafted {} of {} project plans",
                outcomes.plans.len(),
                actions.len()
            ));
        }
        summary.project_plans = outcomes.plans.len();
        summary.missing_plans = outcomes
            .plans
            .missing()
            .into_iter()
            .map(|idx| MissingPlan {
                number: idx + 1,
                title: actions
                    .action_points
                    .get(idx)
                    .map(|a| a.title.clone())
                    .unwrap_or_default(),
                reason: outcomes
                    .failures
                    .iter()
                    .find(|(failed, _)| *failed == idx)
                    .map_or_else(|| String::from(NO_RESULT_REASON), |(_, e)| e.to_string()),
            })
            .collect();

        if let Err(e) = self.writer.clear_project_plans() {
            tracing::error!(error = %e, "stale project plans not removed");
            summary.write_failures.push(e.to_string());
        }
        for plan in outcomes.plans.iter() {
            summary.record_write(self.writer.write_project_plan(plan));
        }
        summary.record_write(self.writer.write_threat_trends(threat_trends));

        let data = DashboardData {
            analysis,
            actions,
            plans: &outcomes.plans,
            trends: Some(threat_trends),
        };
        match render_dashboard(&data, Utc::now()) {
            Ok(html) => {
                summary.dashboard = summary
                    .record_write(self.writer.write_dashboard(&self.dashboard_file, &html));
            }
            Err(e) => {
                tracing::error!(error = %e, "dashboard not rendered");
                summary.write_failures.push(format!("dashboard: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests;
