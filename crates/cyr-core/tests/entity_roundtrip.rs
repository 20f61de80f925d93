//! Serde roundtrip and JsonSchema validation tests for the entity types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::schema_for;
use cyr_core::entities::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_risk() -> Risk {
    Risk {
        name: "AI-generated spear phishing".into(),
        description: "Language models lower the cost of tailored lures.".into(),
        impact: 8,
        likelihood: 9,
        affected_targets: "Financial services, executives".into(),
    }
}

fn sample_plan() -> ProjectPlan {
    ProjectPlan {
        title: "Executive phishing resilience".into(),
        objective: "Cut successful executive phishing to zero.".into(),
        stakeholders: vec!["CISO".into(), "HR".into()],
        timeline: vec![
            TimelinePhase {
                phase: "Discovery".into(),
                duration: "3 weeks".into(),
            },
            TimelinePhase {
                phase: "Rollout".into(),
                duration: "2 months".into(),
            },
        ],
        kpis: vec!["Simulation click rate below 2%".into()],
        risks_and_mitigations: vec![RiskMitigation {
            risk: "Training fatigue".into(),
            mitigation: "Short monthly modules".into(),
        }],
    }
}

roundtrip_and_validate!(
    article_roundtrip,
    Article,
    Article {
        title: "Ransomware gangs pivot to data extortion".into(),
        url: "https://example.com/news/1".into(),
        published_date: NaiveDate::from_ymd_opt(2026, 9, 30),
        snippet: "Groups skip encryption entirely.".into(),
        source: "example.com".into(),
        query: "\"ransomware attack\"".into(),
    }
);

roundtrip_and_validate!(
    risk_analysis_roundtrip,
    RiskAnalysis,
    RiskAnalysis {
        risks: vec![sample_risk()],
        board_summary: "Phishing is being industrialised by AI.".into(),
    }
);

roundtrip_and_validate!(
    action_plan_roundtrip,
    ActionPlan,
    ActionPlan {
        action_points: vec![ActionPoint {
            title: "Harden executive email".into(),
            description: "Mandate phishing-resistant MFA for executives.".into(),
            owner: "CISO".into(),
            priority: 1,
            related_risks: vec!["AI-generated spear phishing".into()],
        }],
    }
);

roundtrip_and_validate!(project_plan_roundtrip, ProjectPlan, sample_plan());

roundtrip_and_validate!(
    keyed_project_plan_roundtrip,
    KeyedProjectPlan,
    KeyedProjectPlan {
        action_index: 0,
        action_title: "Harden executive email".into(),
        plan: sample_plan(),
    }
);

roundtrip_and_validate!(
    threat_trends_roundtrip,
    ThreatTrends,
    ThreatTrends {
        months: vec![MonthlyVolume {
            month: "2026-09".into(),
            total: 4,
            by_query: BTreeMap::from([("\"malware\"".to_string(), 4)]),
        }],
        undated: 1,
        overall: TrendDirection::InsufficientData,
        most_volatile_query: None,
        patterns: vec![],
        summary: "Analysis of 4 cybersecurity articles across 1 months.".into(),
    }
);

#[test]
fn risk_schema_rejects_out_of_range_scores() {
    let schema = serde_json::to_value(schema_for!(Risk)).unwrap();
    let mut instance = serde_json::to_value(sample_risk()).unwrap();
    instance["impact"] = serde_json::json!(11);
    let errors = validate_against_schema(&schema, &instance);
    assert!(!errors.is_empty(), "impact 11 should violate the schema");
}

#[test]
fn risk_schema_is_closed() {
    let schema = serde_json::to_value(schema_for!(Risk)).unwrap();
    let mut instance = serde_json::to_value(sample_risk()).unwrap();
    instance["severity"] = serde_json::json!("high");
    let errors = validate_against_schema(&schema, &instance);
    assert!(!errors.is_empty(), "unknown fields should violate the schema");
}
