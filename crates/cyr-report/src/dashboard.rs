//! Single-file HTML dashboard.
//!
//! Rendering is a pure function of its inputs plus the `generated_at`
//! timestamp. Chart data is embedded as inline JSON and drawn client-side by
//! Chart.js loaded from a CDN.

use std::collections::BTreeSet;

use askama::Template;
use chrono::{DateTime, Utc};
use cyr_core::entities::{ActionPlan, ProjectPlan, ProjectPlans, RiskAnalysis, ThreatTrends};
use serde::Serialize;

use crate::error::RenderError;

pub const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Everything the dashboard shows.
#[derive(Debug, Clone, Copy)]
pub struct DashboardData<'a> {
    pub analysis: &'a RiskAnalysis,
    pub actions: &'a ActionPlan,
    pub plans: &'a ProjectPlans,
    pub trends: Option<&'a ThreatTrends>,
}

struct RiskView<'a> {
    name: &'a str,
    description: &'a str,
    affected_targets: &'a str,
    impact: u8,
    likelihood: u8,
    score: u16,
    severity_class: &'static str,
    severity_label: &'static str,
}

struct ActionView<'a> {
    number: usize,
    title: &'a str,
    description: &'a str,
    owner: &'a str,
    priority: u32,
    related_risks: String,
    has_plan: bool,
}

struct PlanView<'a> {
    number: usize,
    action_title: &'a str,
    plan: &'a ProjectPlan,
}

#[derive(Serialize)]
struct MatrixPoint<'a> {
    name: &'a str,
    impact: u8,
    likelihood: u8,
    score: u16,
    severity: &'static str,
    color: &'static str,
}

#[derive(Serialize)]
struct TrendChart<'a> {
    labels: Vec<&'a str>,
    totals: Vec<usize>,
    series: Vec<TrendSeries<'a>>,
}

#[derive(Serialize)]
struct TrendSeries<'a> {
    label: &'a str,
    data: Vec<usize>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    generated_at: String,
    board_summary: &'a str,
    risks: Vec<RiskView<'a>>,
    actions: Vec<ActionView<'a>>,
    plans: Vec<PlanView<'a>>,
    missing_plans: usize,
    trend_summary: Option<&'a str>,
    trend_patterns: Vec<&'a str>,
    most_volatile_query: Option<&'a str>,
    chart_js_url: &'static str,
    matrix_json: String,
    trend_json: String,
}

/// Serialize `value` for a `<script type="application/json">` block.
///
/// `<`, `>` and `&` only occur inside JSON strings, so replacing them with
/// unicode escapes keeps the JSON equal while leaving the HTML tokenizer
/// nothing to act on (no `</script>`, no `<!--`).
fn inline_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn trend_chart(trends: &ThreatTrends) -> Option<TrendChart<'_>> {
    if trends.months.is_empty() {
        return None;
    }
    let queries: BTreeSet<&str> = trends
        .months
        .iter()
        .flat_map(|m| m.by_query.keys().map(String::as_str))
        .collect();
    Some(TrendChart {
        labels: trends.months.iter().map(|m| m.month.as_str()).collect(),
        totals: trends.months.iter().map(|m| m.total).collect(),
        series: queries
            .into_iter()
            .map(|label| TrendSeries {
                label,
                data: trends
                    .months
                    .iter()
                    .map(|m| m.by_query.get(label).copied().unwrap_or(0))
                    .collect(),
            })
            .collect(),
    })
}

/// Render the dashboard HTML.
///
/// # Errors
///
/// Returns [`RenderError`] if chart data cannot be serialized or the template
/// fails to render.
pub fn render_dashboard(
    data: &DashboardData<'_>,
    generated_at: DateTime<Utc>,
) -> Result<String, RenderError> {
    let risks: Vec<RiskView<'_>> = data
        .analysis
        .risks
        .iter()
        .map(|r| {
            let severity = r.severity();
            RiskView {
                name: &r.name,
                description: &r.description,
                affected_targets: &r.affected_targets,
                impact: r.impact,
                likelihood: r.likelihood,
                score: r.severity_score(),
                severity_class: severity.as_str(),
                severity_label: severity.label(),
            }
        })
        .collect();

    let matrix: Vec<MatrixPoint<'_>> = data
        .analysis
        .risks
        .iter()
        .map(|r| MatrixPoint {
            name: &r.name,
            impact: r.impact,
            likelihood: r.likelihood,
            score: r.severity_score(),
            severity: r.severity().as_str(),
            color: r.severity().color(),
        })
        .collect();

    let actions: Vec<ActionView<'_>> = data
        .actions
        .action_points
        .iter()
        .enumerate()
        .map(|(idx, a)| ActionView {
            number: idx + 1,
            title: &a.title,
            description: &a.description,
            owner: &a.owner,
            priority: a.priority,
            related_risks: a.related_risks.join(", "),
            has_plan: data.plans.get(idx).is_some(),
        })
        .collect();

    let plans: Vec<PlanView<'_>> = data
        .plans
        .iter()
        .map(|p| PlanView {
            number: p.action_index + 1,
            action_title: &p.action_title,
            plan: &p.plan,
        })
        .collect();

    let chart = data.trends.and_then(trend_chart);
    let template = DashboardTemplate {
        generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        board_summary: &data.analysis.board_summary,
        missing_plans: actions.iter().filter(|a| !a.has_plan).count(),
        risks,
        actions,
        plans,
        trend_summary: data.trends.map(|t| t.summary.as_str()),
        trend_patterns: data
            .trends
            .map(|t| t.patterns.iter().map(String::as_str).collect())
            .unwrap_or_default(),
        most_volatile_query: data.trends.and_then(|t| t.most_volatile_query.as_deref()),
        chart_js_url: CHART_JS_URL,
        matrix_json: inline_json(&matrix)?,
        trend_json: inline_json(&chart)?,
    };
    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inline_json_cannot_close_script() {
        let out = inline_json(&["</script><script>alert(1)</script>"]).unwrap();
        assert!(!out.contains('<'));
        assert_eq!(
            out,
            r#"["\u003c/script\u003e\u003cscript\u003ealert(1)\u003c/script\u003e"]"#
        );
    }

    #[test]
    fn inline_json_escapes_comment_openers_and_ampersands() {
        let value = ["<!--<script>", "R&D"];
        let out = inline_json(&value).unwrap();
        assert_eq!(out, r#"["\u003c!--\u003cscript\u003e","R\u0026D"]"#);
        let decoded: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn empty_trends_have_no_chart() {
        let trends = ThreatTrends {
            months: vec![],
            undated: 3,
            overall: cyr_core::entities::TrendDirection::InsufficientData,
            most_volatile_query: None,
            patterns: vec![],
            summary: String::new(),
        };
        assert!(trend_chart(&trends).is_none());
        assert_eq!(inline_json(&trend_chart(&trends)).unwrap(), "null");
    }
}
