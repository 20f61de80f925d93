//! Language-model configuration, one model/temperature per analysis stage.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_endpoint() -> String {
    String::from("https://api.openai.com/v1")
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_retries() -> u32 {
    1
}

const fn default_max_concurrent_plans() -> usize {
    3
}

const DEFAULT_MODEL: &str = "gpt-4o";

fn default_risk_analysis() -> StageModel {
    StageModel::new(DEFAULT_MODEL, 0.2)
}

fn default_action_plan() -> StageModel {
    StageModel::new(DEFAULT_MODEL, 0.3)
}

fn default_project_plan() -> StageModel {
    StageModel::new(DEFAULT_MODEL, 0.4)
}

/// Model settings for a single analysis stage.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StageModel {
    /// Model identifier, e.g. `gpt-4o`.
    pub model: String,
    /// Sampling temperature, 0.0–2.0.
    pub temperature: f32,
}

impl StageModel {
    #[must_use]
    pub fn new(model: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            temperature,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid(field, "model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                field,
                format!("temperature {} is outside 0.0-2.0", self.temperature),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LlmConfig {
    /// API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout; a timeout counts as a retryable failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt of each structured request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound on concurrent project-plan requests.
    #[serde(default = "default_max_concurrent_plans")]
    pub max_concurrent_plans: usize,

    #[serde(default = "default_risk_analysis")]
    pub risk_analysis: StageModel,

    #[serde(default = "default_action_plan")]
    pub action_plan: StageModel,

    #[serde(default = "default_project_plan")]
    pub project_plan: StageModel,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_concurrent_plans: default_max_concurrent_plans(),
            risk_analysis: default_risk_analysis(),
            action_plan: default_action_plan(),
            project_plan: default_project_plan(),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.risk_analysis.validate("llm.risk_analysis")?;
        self.action_plan.validate("llm.action_plan")?;
        self.project_plan.validate("llm.project_plan")?;
        if self.max_concurrent_plans == 0 {
            return Err(ConfigError::invalid(
                "llm.max_concurrent_plans",
                "must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("llm.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}
