use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::errors::CoreError;
use crate::scoring::{Severity, severity_score};

/// Lowest allowed impact / likelihood score.
pub const MIN_SCORE: u8 = 1;
/// Highest allowed impact / likelihood score.
pub const MAX_SCORE: u8 = 10;

/// A single identified emerging cyber risk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Risk {
    /// A concise, descriptive title for the emerging risk.
    pub name: String,
    /// A detailed explanation of the risk and its nature.
    pub description: String,
    /// Potential business impact from 1 (negligible) to 10 (severe).
    #[schemars(range(min = 1, max = 10))]
    pub impact: u8,
    /// Likelihood of the risk materializing from 1 (rare) to 10 (almost certain).
    #[schemars(range(min = 1, max = 10))]
    pub likelihood: u8,
    /// Sectors, technologies, or organisation types most exposed to the risk.
    pub affected_targets: String,
}

impl Risk {
    /// Combined score, `impact × likelihood`.
    #[must_use]
    pub fn severity_score(&self) -> u16 {
        severity_score(self.impact, self.likelihood)
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from_score(self.severity_score())
    }

    /// Check score ranges and required text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("risk name", &self.name)?;
        require_text("risk description", &self.description)?;
        for (field, score) in [("impact", self.impact), ("likelihood", self.likelihood)] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(CoreError::Validation(format!(
                    "risk '{}' has {field} {score}, expected {MIN_SCORE}-{MAX_SCORE}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Output of the first analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RiskAnalysis {
    /// The top 3-5 notable emerging cyber risks.
    pub risks: Vec<Risk>,
    /// A high-level summary for the Board of Directors, synthesizing the
    /// identified risks and their strategic implications.
    pub board_summary: String,
}

impl RiskAnalysis {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if there are no risks, the summary is
    /// blank, or any risk is invalid.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.risks.is_empty() {
            return Err(CoreError::Validation("risk analysis contains no risks".into()));
        }
        require_text("board summary", &self.board_summary)?;
        self.risks.iter().try_for_each(Risk::validate)
    }

    /// Position of a risk by name (case-insensitive).
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.risks
            .iter()
            .position(|r| r.name.trim().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn risk(name: &str, impact: u8, likelihood: u8) -> Risk {
        Risk {
            name: name.into(),
            description: "desc".into(),
            impact,
            likelihood,
            affected_targets: "finance".into(),
        }
    }

    #[test]
    fn score_is_product() {
        let r = risk("AI phishing", 8, 7);
        assert_eq!(r.severity_score(), 56);
        assert_eq!(r.severity(), Severity::Critical);
    }

    #[test]
    fn rejects_out_of_range_scores() {
        assert!(risk("a", 0, 5).validate().is_err());
        assert!(risk("a", 5, 11).validate().is_err());
        assert!(risk("a", 1, 10).validate().is_ok());
    }

    #[test]
    fn analysis_requires_risks_and_summary() {
        let empty = RiskAnalysis {
            risks: vec![],
            board_summary: "summary".into(),
        };
        assert!(empty.validate().is_err());

        let blank = RiskAnalysis {
            risks: vec![risk("a", 2, 2)],
            board_summary: "  ".into(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn position_of_ignores_case_and_whitespace() {
        let analysis = RiskAnalysis {
            risks: vec![risk("Ransomware", 9, 8), risk("Deepfake fraud", 6, 5)],
            board_summary: "s".into(),
        };
        assert_eq!(analysis.position_of(" deepfake FRAUD "), Some(1));
        assert_eq!(analysis.position_of("unknown"), None);
    }
}
