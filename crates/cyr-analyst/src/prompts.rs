//! System prompts and message builders for the three analysis stages.

use cyr_core::entities::{ActionPoint, Article, Risk, RiskAnalysis};
use serde::Serialize;

use crate::llm::ChatMessage;

pub const RISK_ANALYST: &str = "\
You are a senior cyber risk analyst at a major insurance firm. Analyse the \
news articles provided and identify novel and emerging cyber risks: new attack \
vectors, exploitation of new technologies such as AI, significant shifts in \
ransomware tactics, or threats reaching new sectors or regions.

Use each article's published_date to spot themes that are new or accelerating, \
and correlate evidence across articles rather than summarising them one by one.

Return the top 3 to 5 emerging risks. For each give a short name, a detailed \
description, the affected sectors or targets, and integer scores from 1 to 10 \
for impact and for likelihood. Then write a concise board summary in clear, \
non-technical language.

Do not name specific companies or individuals. Describe the nature of the risk.";

pub const BOARD_ADVISOR: &str = "\
You are a strategic advisor to the Board of Directors. From the cyber risk \
analysis provided, formulate 3 high-level, actionable recommendations.

Each action point needs a short title, a single complete sentence describing \
the action, a suggested owner (a role or department), a priority rank where 1 \
is the most urgent, and the names of the analysed risks it addresses, copied \
exactly as they appear in the analysis. Focus on strategic initiatives, not \
low-level technical tasks.";

pub const PROJECT_MANAGER: &str = "\
You are a senior project manager. Expand the strategic action point provided \
into a structured, high-level project plan: title, objective, stakeholders, an \
ordered timeline of phases with durations, KPIs, and the main project risks \
with mitigations. Keep every field plausible, concise, and relevant; the plan \
is a starting point for internal discussion.";

#[derive(Serialize)]
struct ArticleDigest<'a> {
    title: &'a str,
    published_date: Option<String>,
    source: &'a str,
    snippet: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct ProjectBrief<'a> {
    action_point: &'a ActionPoint,
    related_risks: Vec<&'a Risk>,
}

/// Pretty JSON for a prompt body. Plain data structs always serialize.
fn to_prompt_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[must_use]
pub fn risk_analysis_messages(articles: &[Article]) -> Vec<ChatMessage> {
    let digests: Vec<_> = articles
        .iter()
        .map(|a| ArticleDigest {
            title: &a.title,
            published_date: a.published_date.map(|d| d.to_string()),
            source: &a.source,
            snippet: &a.snippet,
            url: &a.url,
        })
        .collect();
    vec![
        ChatMessage::system(RISK_ANALYST),
        ChatMessage::user(format!(
            "Here are {} news articles to analyse:\n{}",
            articles.len(),
            to_prompt_json(&digests)
        )),
    ]
}

#[must_use]
pub fn action_plan_messages(analysis: &RiskAnalysis) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(BOARD_ADVISOR),
        ChatMessage::user(format!(
            "Here is the risk analysis:\n{}",
            to_prompt_json(analysis)
        )),
    ]
}

/// Only the risks the action point names are included, matched
/// case-insensitively; with no match the full risk list is sent.
#[must_use]
pub fn project_plan_messages(action: &ActionPoint, risks: &[Risk]) -> Vec<ChatMessage> {
    let mut related: Vec<&Risk> = risks
        .iter()
        .filter(|r| {
            action
                .related_risks
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(r.name.trim()))
        })
        .collect();
    if related.is_empty() {
        related = risks.iter().collect();
    }
    let brief = ProjectBrief {
        action_point: action,
        related_risks: related,
    };
    vec![
        ChatMessage::system(PROJECT_MANAGER),
        ChatMessage::user(format!(
            "Generate a project plan for this action point:\n{}",
            to_prompt_json(&brief)
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn risk(name: &str) -> Risk {
        Risk {
            name: name.into(),
            description: "d".into(),
            impact: 5,
            likelihood: 5,
            affected_targets: "t".into(),
        }
    }

    fn action(related: &[&str]) -> ActionPoint {
        ActionPoint {
            title: "Harden identity".into(),
            description: "Roll out phishing-resistant MFA.".into(),
            owner: "CISO".into(),
            priority: 1,
            related_risks: related.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn project_brief_includes_only_named_risks() {
        let risks = [risk("AI phishing"), risk("Supply chain")];
        let messages = project_plan_messages(&action(&["ai PHISHING"]), &risks);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("AI phishing"));
        assert!(!messages[1].content.contains("Supply chain"));
    }

    #[test]
    fn project_brief_falls_back_to_all_risks() {
        let risks = [risk("AI phishing"), risk("Supply chain")];
        let messages = project_plan_messages(&action(&[]), &risks);
        assert!(messages[1].content.contains("AI phishing"));
        assert!(messages[1].content.contains("Supply chain"));
    }

    #[test]
    fn article_digest_counts_articles() {
        let messages = risk_analysis_messages(&[]);
        assert!(messages[1].content.starts_with("Here are 0 news articles"));
    }
}
