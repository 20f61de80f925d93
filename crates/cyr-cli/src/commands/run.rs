use std::fmt::Write as _;

use anyhow::Context;
use cyr_analyst::{OpenAiClient, RiskAnalyzer};
use cyr_config::CyriskConfig;
use cyr_news::{FsCache, GoogleSearchClient, NewsFetcher};
use cyr_report::ReportWriter;

use crate::pipeline::{Pipeline, RunSummary};
use crate::ui;

/// Handle `cyrisk` / `cyrisk run`. Returns the process exit code.
pub async fn handle(config: &CyriskConfig) -> anyhow::Result<i32> {
    config.require_credentials()?;

    let search = GoogleSearchClient::new(&config.search).context("failed to build search client")?;
    let fetcher = NewsFetcher::new(
        search,
        FsCache::new(&config.search.cache_dir),
        config.search.recency_days,
        config.search.results_per_query,
    );
    let model = OpenAiClient::new(&config.llm).context("failed to build language model client")?;
    let analyzer = RiskAnalyzer::new(model, &config.llm)?;
    let pipeline = Pipeline::new(
        fetcher,
        analyzer,
        ReportWriter::new(&config.output.dir),
        config.search.keywords.clone(),
        config.output.dashboard_file.clone(),
    );

    let summary = pipeline.run().await;
    if !ui::prefs().quiet || summary.exit_code() != 0 {
        print!("{}", render_summary(&summary));
    }
    Ok(summary.exit_code())
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Articles: {} from {} queries ({} cached, {} failed)",
        summary.articles,
        summary.queries,
        summary.cache_hits,
        summary.failed_queries.len()
    );
    for query in &summary.failed_queries {
        let _ = writeln!(out, "  warning: query failed: {query}");
    }
    if let Some(reason) = &summary.aborted {
        let _ = writeln!(out, "Run aborted: {reason}");
        return out;
    }
    let _ = writeln!(
        out,
        "Risks: {}  Action points: {}  Project plans: {}/{}",
        summary.risks, summary.action_points, summary.project_plans, summary.action_points
    );
    for missing in &summary.missing_plans {
        let _ = writeln!(
            out,
            "  warning: no project plan for action {} ({}): {}",
            missing.number, missing.title, missing.reason
        );
    }
    for failure in &summary.write_failures {
        let _ = writeln!(out, "  error: {failure}");
    }
    let _ = writeln!(
        out,
        "Reports: {} files in {}",
        summary.written.len(),
        summary.output_dir.display()
    );
    if let Some(dashboard) = &summary.dashboard {
        let _ = writeln!(out, "Dashboard: {}", dashboard.display());
    }
    out
}
