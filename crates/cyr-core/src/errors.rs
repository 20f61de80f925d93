//! Cross-cutting error types for cyrisk.
//!
//! Stage-specific errors (`FetchError`, `AnalysisError`, `WriteError`) live in
//! their respective crates. They converge into `anyhow` in `cyr-cli`.

use thiserror::Error;

/// Errors that can be raised by any cyrisk crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Data failed domain validation (ranges, required content).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A project plan referenced an action point that does not exist.
    #[error("Project plan references action point {index}, but the plan has {count} action points")]
    UnknownActionPoint { index: usize, count: usize },

    /// A second project plan was supplied for the same action point.
    #[error("Action point {index} already has a project plan")]
    DuplicatePlan { index: usize },
}
