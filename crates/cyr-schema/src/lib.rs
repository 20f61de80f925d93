//! # cyr-schema
//!
//! JSON Schema generation, validation, and registry for cyrisk.
//!
//! Entity types are defined in `cyr-core` with `#[derive(JsonSchema)]`. This
//! crate builds the schemas the language model is constrained to, validates
//! model replies against them, and exports them for `cyrisk schema`.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::{
    ACTION_PLAN, PROJECT_PLAN, RISK_ANALYSIS, SchemaRegistry, structured_output_schema,
};
