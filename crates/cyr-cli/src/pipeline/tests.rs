use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use cyr_analyst::{CompletionRequest, LlmError};
use cyr_config::LlmConfig;
use cyr_core::entities::Article;
use cyr_news::{MemoryCache, SearchError, SearchQuery};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

/// Returns `per_query` articles for every query except `"broken"`.
struct FakeSearch {
    per_query: u32,
}

impl SearchProvider for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>, SearchError> {
        if query.keywords() == "broken" {
            return Err(SearchError::QuotaExceeded("dailyLimitExceeded".into()));
        }
        Ok((1..=self.per_query)
            .map(|i| Article {
                title: format!("{} story {i}", query.keywords()),
                url: format!("https://news.example.com/{}/{i}", query.keywords()),
                published_date: NaiveDate::from_ymd_opt(2026, 9 + i % 2, i),
                snippet: "Threat actors changed tactics.".into(),
                source: "news.example.com".into(),
                query: query.keywords().to_string(),
            })
            .collect())
    }
}

struct FakeModel<F> {
    respond: F,
    calls: AtomicUsize,
}

impl<F> LanguageModel for FakeModel<F>
where
    F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync,
{
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(request)
    }
}

const RISKS: [&str; 5] = [
    "AI-crafted phishing",
    "Deepfake payment fraud",
    "Edge device exploitation",
    "Extortion without encryption",
    "Cloud identity abuse",
];

/// Five risks, three action points, and a project plan for every action
/// except the one titled `Vendor assurance`.
fn scripted_reply(request: &CompletionRequest) -> Result<String, LlmError> {
    let reply = match request.schema_name.as_str() {
        "risk_analysis" => json!({
            "risks": RISKS.iter().enumerate().map(|(i, name)| json!({
                "name": name,
                "description": format!("{name} is accelerating."),
                "impact": 10 - i,
                "likelihood": 3 + i,
                "affected_targets": "Financial services"
            })).collect::<Vec<_>>(),
            "board_summary": "Attackers are scaling social engineering with AI."
        }),
        "action_plan" => json!({
            "action_points": [
                { "title": "Vendor assurance", "description": "Audit critical suppliers.", "owner": "CRO", "priority": 2, "related_risks": ["Edge device exploitation"] },
                { "title": "Payment verification", "description": "Require call-back checks.", "owner": "CFO", "priority": 1, "related_risks": ["Deepfake payment fraud"] },
                { "title": "Identity hardening", "description": "Adopt phishing-resistant MFA.", "owner": "CISO", "priority": 1, "related_risks": ["AI-crafted phishing"] }
            ]
        }),
        _ if request.messages[1].content.contains("Vendor assurance") => {
            return Ok(String::from("{\"title\": \"truncated"));
        }
        _ => json!({
            "title": "Programme",
            "objective": "Reduce exposure.",
            "stakeholders": ["CISO"],
            "timeline": [{ "phase": "Discovery", "duration": "4 weeks" }],
            "kpis": ["Coverage"],
            "risks_and_mitigations": []
        }),
    };
    Ok(reply.to_string())
}

type ScriptedModel = FakeModel<fn(&CompletionRequest) -> Result<String, LlmError>>;

fn pipeline(
    output: &Path,
    keywords: &[&str],
    per_query: u32,
    respond: fn(&CompletionRequest) -> Result<String, LlmError>,
) -> Pipeline<FakeSearch, MemoryCache, ScriptedModel> {
    let model = FakeModel {
        respond,
        calls: AtomicUsize::new(0),
    };
    let analyzer = RiskAnalyzer::new(model, &LlmConfig::default())
        .unwrap()
        .with_retry_backoff(Duration::ZERO);
    Pipeline::new(
        NewsFetcher::new(FakeSearch { per_query }, MemoryCache::new(), 30, 10),
        analyzer,
        ReportWriter::new(output),
        keywords.iter().map(ToString::to_string).collect(),
        "dashboard.html",
    )
}

fn model_calls(pipeline: &Pipeline<FakeSearch, MemoryCache, ScriptedModel>) -> usize {
    pipeline.analyzer.model().calls.load(Ordering::SeqCst)
}

#[tokio::test]
async fn zero_articles_abort_before_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let pipeline = pipeline(&output, &["broken", "broken"], 0, scripted_reply);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.failed_queries, ["broken", "broken"]);
    assert!(summary.aborted.as_deref().unwrap().contains("no articles"));
    assert_eq!(model_calls(&pipeline), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn empty_results_also_abort() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let pipeline = pipeline(&output, &["\"malware\""], 0, scripted_reply);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 1);
    assert!(summary.failed_queries.is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn failing_project_plan_still_yields_a_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let pipeline = pipeline(&output, &["ransomware", "phishing", "broken"], 5, scripted_reply);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 0, "{summary:#?}");
    assert!(summary.aborted.is_none());
    assert_eq!(summary.articles, 10);
    assert_eq!(summary.failed_queries, ["broken"]);
    assert_eq!(summary.risks, 5);
    assert_eq!(summary.action_points, 3);
    assert_eq!(summary.project_plans, 2);
    assert_eq!(summary.missing_plans.len(), 1);
    assert_eq!(summary.missing_plans[0].number, 3);
    assert_eq!(summary.missing_plans[0].title, "Vendor assurance");

    for name in [
        "1_risk_analysis.json",
        "2_board_action_plan.json",
        "3_project_plan_1.json",
        "3_project_plan_2.json",
        "4_threat_trends.json",
        "dashboard.html",
    ] {
        assert!(output.join(name).is_file(), "missing {name}");
    }
    assert!(!output.join("3_project_plan_3.json").exists());

    let html = fs::read_to_string(summary.dashboard.as_ref().unwrap()).unwrap();
    assert_eq!(html.matches("class=\"item action\"").count(), 3);
    assert_eq!(html.matches("class=\"item plan\"").count(), 2);
    assert_eq!(html.matches("No project plan available for this action point.").count(), 1);
}

#[tokio::test]
async fn action_plan_file_is_in_priority_order() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), &["ransomware"], 4, scripted_reply);

    pipeline.run().await;

    let plan: ActionPlan =
        serde_json::from_str(&fs::read_to_string(dir.path().join("2_board_action_plan.json")).unwrap())
            .unwrap();
    let titles: Vec<_> = plan.action_points.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Identity hardening", "Payment verification", "Vendor assurance"]);
}

#[tokio::test]
async fn stale_project_plans_are_replaced() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("3_project_plan_9.json"), "{}").unwrap();
    let pipeline = pipeline(dir.path(), &["ransomware"], 2, scripted_reply);

    pipeline.run().await;

    assert!(!dir.path().join("3_project_plan_9.json").exists());
    assert!(dir.path().join("3_project_plan_1.json").exists());
}

#[tokio::test]
async fn risk_analysis_failure_is_fatal() {
    fn refuse(_: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Refusal("cannot comply".into()))
    }
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let pipeline = pipeline(&output, &["ransomware"], 3, refuse);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 1);
    assert!(summary.aborted.as_deref().unwrap().starts_with("risk analysis failed"));
    assert!(!output.exists());
}

#[tokio::test]
async fn action_plan_failure_is_fatal_after_stage_one_is_written() {
    fn no_actions(request: &CompletionRequest) -> Result<String, LlmError> {
        if request.schema_name == "action_plan" {
            Ok(json!({ "action_points": [] }).to_string())
        } else {
            scripted_reply(request)
        }
    }
    let dir = tempfile::tempdir().unwrap();
    for earlier in ["2_board_action_plan.json", "3_project_plan_1.json", "4_threat_trends.json", "dashboard.html"] {
        fs::write(dir.path().join(earlier), "from an earlier run").unwrap();
    }
    let pipeline = pipeline(dir.path(), &["ransomware"], 3, no_actions);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 1);
    assert!(summary.write_failures.is_empty(), "{:?}", summary.write_failures);
    assert!(dir.path().join("1_risk_analysis.json").exists());
    let mut left: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, ["1_risk_analysis.json"]);
    assert!(summary.dashboard.is_none());
}

#[tokio::test]
async fn plan_lost_without_an_error_is_still_reported() {
    fn crash_on_vendor(request: &CompletionRequest) -> Result<String, LlmError> {
        if request.schema_name == "project_plan"
            && request.messages[1].content.contains("Vendor assurance")
        {
            panic!("model client crashed");
        }
        scripted_reply(request)
    }
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), &["ransomware"], 3, crash_on_vendor);

    let summary = pipeline.run().await;

    assert_eq!(summary.exit_code(), 0, "{summary:#?}");
    assert_eq!(summary.project_plans, 2);
    assert_eq!(
        summary.missing_plans,
        [MissingPlan {
            number: 3,
            title: "Vendor assurance".into(),
            reason: NO_RESULT_REASON.into(),
        }]
    );
    let html = fs::read_to_string(summary.dashboard.as_ref().unwrap()).unwrap();
    assert_eq!(html.matches("No project plan available for this action point.").count(), 1);
}

#[tokio::test]
async fn write_failures_set_exit_code_but_do_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("output");
    fs::write(&blocker, "not a directory").unwrap();
    let pipeline = pipeline(&blocker, &["ransomware"], 3, scripted_reply);

    let summary = pipeline.run().await;

    assert!(summary.aborted.is_none());
    assert_eq!(summary.exit_code(), 1);
    assert!(summary.written.is_empty());
    // 1, 2, stale-plan cleanup, two plans, 4, dashboard
    assert!(summary.write_failures.len() >= 6, "{:?}", summary.write_failures);
    assert!(summary.dashboard.is_none());
}
