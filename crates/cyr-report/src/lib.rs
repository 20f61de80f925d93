//! # cyr-report
//!
//! Output side of a cyrisk run: stage-numbered JSON report files written
//! atomically by [`ReportWriter`], and the self-contained HTML dashboard
//! produced by [`render_dashboard`].

pub mod dashboard;
mod error;
pub mod writer;

pub use dashboard::{DashboardData, render_dashboard};
pub use error::{ReadError, RenderError, WriteError};
pub use writer::{ReportWriter, project_plan_file, read_risk_analysis};
