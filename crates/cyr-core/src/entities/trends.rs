use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Direction of article volume over the analysed months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Article volume for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MonthlyVolume {
    /// Month as `YYYY-MM`.
    pub month: String,
    pub total: usize,
    /// Article count per keyword query.
    pub by_query: BTreeMap<String, usize>,
}

/// Month-by-month view of the fetched news volume.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ThreatTrends {
    /// Months in ascending order.
    pub months: Vec<MonthlyVolume>,
    /// Articles without a publication date, excluded from `months`.
    pub undated: usize,
    pub overall: TrendDirection,
    /// Query whose monthly counts vary the most. `None` with fewer than two
    /// months or when no query's count changes.
    #[serde(default)]
    pub most_volatile_query: Option<String>,
    pub patterns: Vec<String>,
    pub summary: String,
}
