//! News search configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default Google Custom Search endpoint.
fn default_endpoint() -> String {
    String::from("https://www.googleapis.com/customsearch/v1")
}

/// Default keyword queries, one search request each.
fn default_keywords() -> Vec<String> {
    [
        "\"cybersecurity risk\"",
        "\"cyber threat\"",
        "\"data breach\"",
        "\"ransomware attack\"",
        "\"phishing\"",
        "\"malware\"",
        "\"cyber attack\"",
        "\"information security\"",
        "\"cyber insurance\"",
        "\"data protection\"",
        "\"privacy regulations\"",
        "\"GDPR compliance\"",
        "\"cyber risk management\"",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_recency_days() -> u32 {
    30
}

/// The search API returns at most 10 results per request.
pub const MAX_RESULTS_PER_QUERY: u32 = 10;

const fn default_results_per_query() -> u32 {
    MAX_RESULTS_PER_QUERY
}

fn default_language() -> String {
    String::from("lang_en")
}

fn default_country() -> String {
    String::from("countryUS")
}

const fn default_timeout_secs() -> u64 {
    15
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("news")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Search API key (`GOOGLE_CUSTOMSEARCH_API_KEY`).
    #[serde(default)]
    pub api_key: String,

    /// Programmable search engine ID (`GOOGLE_CUSTOMSEARCH_CX_KEY`).
    #[serde(default)]
    pub engine_id: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Keyword queries issued against the search API.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Only return articles published within this many days.
    #[serde(default = "default_recency_days")]
    pub recency_days: u32,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,

    /// Language restriction (`lr` parameter); empty disables it.
    #[serde(default = "default_language")]
    pub language: String,

    /// Country restriction (`cr` parameter); empty disables it.
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory holding cached search results.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id: String::new(),
            endpoint: default_endpoint(),
            keywords: default_keywords(),
            recency_days: default_recency_days(),
            results_per_query: default_results_per_query(),
            language: default_language(),
            country: default_country(),
            timeout_secs: default_timeout_secs(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl SearchConfig {
    /// Both search credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.engine_id.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.is_empty() {
            return Err(ConfigError::invalid(
                "search.keywords",
                "at least one keyword query is required",
            ));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "search.keywords",
                "keyword queries must not be blank",
            ));
        }
        if self.recency_days == 0 {
            return Err(ConfigError::invalid(
                "search.recency_days",
                "must be a positive number of days",
            ));
        }
        if !(1..=MAX_RESULTS_PER_QUERY).contains(&self.results_per_query) {
            return Err(ConfigError::invalid(
                "search.results_per_query",
                format!("must be between 1 and {MAX_RESULTS_PER_QUERY}"),
            ));
        }
        Ok(())
    }
}
