//! Risk severity scoring.
//!
//! Severity is the product of impact and likelihood (both 1–10), giving a
//! score in 1–100. The band thresholds split the 10×10 matrix into the four
//! colour zones shown on the dashboard.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score in the `Critical` band.
pub const CRITICAL_THRESHOLD: u16 = 50;
/// Lowest score in the `High` band.
pub const HIGH_THRESHOLD: u16 = 25;
/// Lowest score in the `Medium` band.
pub const MEDIUM_THRESHOLD: u16 = 10;

/// Combined severity score for an impact/likelihood pair.
#[must_use]
pub fn severity_score(impact: u8, likelihood: u8) -> u16 {
    u16::from(impact) * u16::from(likelihood)
}

/// Severity band derived from the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Band for a combined score.
    #[must_use]
    pub const fn from_score(score: u16) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Dashboard colour for the band (RGB hex).
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#48bb78",
            Self::Medium => "#ecc94b",
            Self::High => "#ed8936",
            Self::Critical => "#e53e3e",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
