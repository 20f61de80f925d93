//! Central registry of the structured-output schemas.
//!
//! The `SchemaRegistry` builds JSON Schemas from cyr-core types at construction
//! time using [`schemars::schema_for!`] and provides validation via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;
use serde_json::Value;

use crate::error::SchemaError;

/// Stage 1 output: risks and board summary.
pub const RISK_ANALYSIS: &str = "risk_analysis";
/// Stage 2 output: action points.
pub const ACTION_PLAN: &str = "action_plan";
/// Stage 3 output: one project plan.
pub const PROJECT_PLAN: &str = "project_plan";

/// Keywords stripped before a schema is sent to the model API. Strict
/// structured output rejects them; local validation keeps them.
const API_UNSUPPORTED_KEYWORDS: &[&str] = &["$schema", "format"];

/// Store of the JSON Schemas used for structured generation.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
    validators: HashMap<&'static str, jsonschema::Validator>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            serde_json::to_value(schema_for!($ty))
                .map_err(|e| SchemaError::Generation(format!("{}: {e}", $name)))?,
        );
    };
}

impl SchemaRegistry {
    /// Build the registry and compile a validator per schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Generation`] if a schema cannot be serialized or
    /// compiled.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas = HashMap::new();

        register!(schemas, RISK_ANALYSIS, cyr_core::entities::RiskAnalysis);
        register!(schemas, ACTION_PLAN, cyr_core::entities::ActionPlan);
        register!(schemas, PROJECT_PLAN, cyr_core::entities::ProjectPlan);

        let mut validators = HashMap::new();
        for (name, schema) in &schemas {
            let validator = jsonschema::validator_for(schema)
                .map_err(|e| SchemaError::Generation(format!("{name}: {e}")))?;
            validators.insert(*name, validator);
        }

        Ok(Self {
            schemas,
            validators,
        })
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` with every violation found.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let validator = self
            .validators
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    format!("{e}")
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// List all registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// Copy of `schema` with keywords the model API rejects removed.
#[must_use]
pub fn structured_output_schema(schema: &Value) -> Value {
    let mut schema = schema.clone();
    strip_keywords(&mut schema);
    schema
}

fn strip_keywords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for keyword in API_UNSUPPORTED_KEYWORDS {
                map.remove(*keyword);
            }
            map.values_mut().for_each(strip_keywords);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_keywords),
        _ => {}
    }
}
