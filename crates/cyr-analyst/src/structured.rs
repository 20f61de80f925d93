//! Schema-validated structured generation with retry-with-feedback.

use std::time::Duration;

use cyr_config::StageModel;
use cyr_core::entities::{ActionPlan, ProjectPlan, RiskAnalysis};
use cyr_core::errors::CoreError;
use cyr_schema::{SchemaError, SchemaRegistry, structured_output_schema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AnalysisError, FailureReason, LlmError, Stage};
use crate::llm::{ChatMessage, CompletionRequest, LanguageModel};

/// A type the model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    /// Registry name of the JSON Schema the output must satisfy.
    const SCHEMA: &'static str;

    /// Domain checks beyond what the schema can express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] describing the first violation.
    fn check(&self) -> Result<(), CoreError>;
}

impl StructuredOutput for RiskAnalysis {
    const SCHEMA: &'static str = cyr_schema::RISK_ANALYSIS;

    fn check(&self) -> Result<(), CoreError> {
        self.validate()
    }
}

impl StructuredOutput for ActionPlan {
    const SCHEMA: &'static str = cyr_schema::ACTION_PLAN;

    fn check(&self) -> Result<(), CoreError> {
        self.validate()
    }
}

impl StructuredOutput for ProjectPlan {
    const SCHEMA: &'static str = cyr_schema::PROJECT_PLAN;

    fn check(&self) -> Result<(), CoreError> {
        self.validate()
    }
}

/// Result of a single structured request.
#[derive(Debug)]
pub enum Completion<T> {
    Success(T),
    /// The model answered, but the answer is not a valid `T`.
    SchemaInvalid { raw: String, errors: Vec<String> },
    ServiceError(LlmError),
}

/// Wraps a [`LanguageModel`] with schema validation and retries.
pub struct StructuredClient<M> {
    model: M,
    registry: SchemaRegistry,
    max_retries: u32,
    retry_backoff: Duration,
}

impl<M: LanguageModel> StructuredClient<M> {
    /// # Errors
    ///
    /// Returns [`SchemaError::Generation`] if the schemas cannot be built.
    pub fn new(model: M, max_retries: u32) -> Result<Self, SchemaError> {
        Ok(Self {
            model,
            registry: SchemaRegistry::new()?,
            max_retries,
            retry_backoff: Duration::from_secs(2),
        })
    }

    /// Delay before re-sending after a retryable service error, multiplied by
    /// the attempt number. Rate limits wait at least their `Retry-After`.
    #[must_use]
    pub const fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Issue one request and validate the reply as `T`.
    pub async fn request<T: StructuredOutput>(
        &self,
        settings: &StageModel,
        messages: &[ChatMessage],
    ) -> Completion<T> {
        let schema = match self.registry.get(T::SCHEMA) {
            Some(schema) => structured_output_schema(schema),
            None => {
                return Completion::SchemaInvalid {
                    raw: String::new(),
                    errors: vec![SchemaError::NotFound(T::SCHEMA.to_string()).to_string()],
                };
            }
        };
        let request = CompletionRequest {
            model: settings.model.clone(),
            temperature: settings.temperature,
            messages: messages.to_vec(),
            schema_name: T::SCHEMA.to_string(),
            schema,
        };
        match self.model.complete(&request).await {
            Ok(raw) => match self.decode::<T>(&raw) {
                Ok(value) => Completion::Success(value),
                Err(errors) => Completion::SchemaInvalid { raw, errors },
            },
            Err(e) => Completion::ServiceError(e),
        }
    }

    /// Wait before attempt `attempt + 1`. A rate limit is never retried
    /// sooner than the service asked for.
    fn retry_delay(&self, error: &LlmError, attempt: u32) -> Duration {
        let backoff = self.retry_backoff * attempt;
        match error {
            LlmError::RateLimited { retry_after_secs } => {
                backoff.max(Duration::from_secs(*retry_after_secs))
            }
            _ => backoff,
        }
    }

    /// JSON parse, schema validation, typed decode, then domain checks.
    fn decode<T: StructuredOutput>(&self, raw: &str) -> Result<T, Vec<String>> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| vec![format!("reply is not valid JSON: {e}")])?;
        self.registry
            .validate(T::SCHEMA, &value)
            .map_err(|e| match e {
                SchemaError::ValidationFailed { errors } => errors,
                other => vec![other.to_string()],
            })?;
        let typed: T = serde_json::from_value(value).map_err(|e| vec![e.to_string()])?;
        typed.check().map_err(|e| vec![e.to_string()])?;
        Ok(typed)
    }

    /// Request `T` up to `1 + max_retries` times.
    ///
    /// An invalid reply is sent back to the model together with the
    /// violations before the next attempt. Retryable service errors resend the
    /// same conversation; other service errors end the stage immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] carrying the last failure once attempts are
    /// exhausted.
    pub async fn generate<T: StructuredOutput>(
        &self,
        stage: Stage,
        mut messages: Vec<ChatMessage>,
        settings: &StageModel,
    ) -> Result<T, AnalysisError> {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            match self.request::<T>(settings, &messages).await {
                Completion::Success(value) => {
                    tracing::debug!(%stage, attempt, "structured output accepted");
                    return Ok(value);
                }
                Completion::SchemaInvalid { raw, errors } => {
                    tracing::warn!(%stage, attempt, violations = errors.len(), "model output failed validation");
                    messages.push(ChatMessage::assistant(raw));
                    messages.push(ChatMessage::user(feedback(&errors)));
                    last_failure = Some(FailureReason::SchemaInvalid { errors });
                }
                Completion::ServiceError(e) if e.is_retryable() => {
                    tracing::warn!(%stage, attempt, error = %e, "retryable model error");
                    let delay = self.retry_delay(&e, attempt);
                    last_failure = Some(FailureReason::Service(e));
                    if attempt < max_attempts && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Completion::ServiceError(e) => {
                    return Err(AnalysisError::new(stage, attempt, e));
                }
            }
        }

        Err(AnalysisError::new(
            stage,
            max_attempts,
            last_failure.unwrap_or(FailureReason::EmptyInput("no attempts were made")),
        ))
    }
}

fn feedback(errors: &[String]) -> String {
    let mut message = String::from(
        "Your previous reply did not satisfy the required schema. Fix these problems and reply again with only the corrected JSON:\n",
    );
    for error in errors {
        message.push_str("- ");
        message.push_str(error);
        message.push('\n');
    }
    message
}
