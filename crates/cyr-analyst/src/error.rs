//! Language-model and analysis error types.

use std::fmt;

use cyr_schema::SchemaError;
use thiserror::Error;

/// Errors from the language-model collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The model declined to answer.
    #[error("model refused: {0}")]
    Refusal(String),

    /// The API response had no message content.
    #[error("empty response")]
    EmptyResponse,

    /// The API response envelope could not be decoded.
    #[error("malformed API response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Whether sending the same request again could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Refusal(_) | Self::EmptyResponse | Self::Malformed(_) => false,
        }
    }
}

/// The analysis stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RiskAnalysis,
    ActionPlan,
    ProjectPlan,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RiskAnalysis => "risk analysis",
            Self::ActionPlan => "action plan",
            Self::ProjectPlan => "project plan",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage gave up.
#[derive(Debug, Error)]
pub enum FailureReason {
    /// Every attempt produced output that failed validation.
    #[error("output failed validation: {}", errors.join("; "))]
    SchemaInvalid { errors: Vec<String> },

    #[error(transparent)]
    Service(#[from] LlmError),

    /// Nothing to analyse.
    #[error("no input: {0}")]
    EmptyInput(&'static str),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A stage that could not produce a valid result.
#[derive(Debug, Error)]
#[error("{stage} failed after {attempts} attempt(s): {reason}")]
pub struct AnalysisError {
    pub stage: Stage,
    pub attempts: u32,
    #[source]
    pub reason: FailureReason,
}

impl AnalysisError {
    pub(crate) fn new(stage: Stage, attempts: u32, reason: impl Into<FailureReason>) -> Self {
        Self {
            stage,
            attempts,
            reason: reason.into(),
        }
    }
}
