//! Stage-numbered report files.
//!
//! Every write goes to a temporary file in the output directory and is then
//! renamed into place, so a reader never sees a partial file.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use cyr_core::entities::{ActionPlan, KeyedProjectPlan, RiskAnalysis, ThreatTrends};
use serde::Serialize;

use crate::error::{ReadError, WriteError};

pub const RISK_ANALYSIS_FILE: &str = "1_risk_analysis.json";
pub const ACTION_PLAN_FILE: &str = "2_board_action_plan.json";
pub const THREAT_TRENDS_FILE: &str = "4_threat_trends.json";

const PROJECT_PLAN_PREFIX: &str = "3_project_plan_";
const JSON_SUFFIX: &str = ".json";

/// File name for the project plan of action point `number` (1-based).
#[must_use]
pub fn project_plan_file(number: usize) -> String {
    format!("{PROJECT_PLAN_PREFIX}{number}{JSON_SUFFIX}")
}

fn is_project_plan_file(name: &str) -> bool {
    name.strip_prefix(PROJECT_PLAN_PREFIX)
        .and_then(|rest| rest.strip_suffix(JSON_SUFFIX))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Writes report files into one output directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// # Errors
    ///
    /// Returns [`WriteError`] if the file cannot be written.
    pub fn write_risk_analysis(&self, analysis: &RiskAnalysis) -> Result<PathBuf, WriteError> {
        self.write_json(RISK_ANALYSIS_FILE, analysis)
    }

    /// # Errors
    ///
    /// Returns [`WriteError`] if the file cannot be written.
    pub fn write_action_plan(&self, plan: &ActionPlan) -> Result<PathBuf, WriteError> {
        self.write_json(ACTION_PLAN_FILE, plan)
    }

    /// Write the plan under its action point's 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the file cannot be written.
    pub fn write_project_plan(&self, plan: &KeyedProjectPlan) -> Result<PathBuf, WriteError> {
        self.write_json(&project_plan_file(plan.action_index + 1), &plan.plan)
    }

    /// # Errors
    ///
    /// Returns [`WriteError`] if the file cannot be written.
    pub fn write_threat_trends(&self, trends: &ThreatTrends) -> Result<PathBuf, WriteError> {
        self.write_json(THREAT_TRENDS_FILE, trends)
    }

    /// # Errors
    ///
    /// Returns [`WriteError`] if the file cannot be written.
    pub fn write_dashboard(&self, file_name: &str, html: &str) -> Result<PathBuf, WriteError> {
        self.write_atomic(file_name, html.as_bytes())
    }

    /// Remove project plan files left by an earlier run, returning how many
    /// were removed. A missing output directory has nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] on the first file that cannot be removed.
    pub fn clear_project_plans(&self) -> Result<usize, WriteError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(WriteError::new(&self.dir, e)),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| WriteError::new(&self.dir, e))?.path();
            let stale = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_project_plan_file);
            if stale && path.is_file() {
                fs::remove_file(&path).map_err(|e| WriteError::new(&path, e))?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, dir = %self.dir.display(), "removed stale project plans");
        }
        Ok(removed)
    }

    /// Remove every file a run writes after stage 1 (action plan, project
    /// plans, threat trends and `dashboard_file`), so a run that stops after
    /// stage 1 does not leave an earlier run's later stages next to the new
    /// risk analysis. Returns how many files were removed.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] on the first file that cannot be removed.
    pub fn clear_after_risk_analysis(&self, dashboard_file: &str) -> Result<usize, WriteError> {
        let mut removed = self.clear_project_plans()?;
        for name in [ACTION_PLAN_FILE, THREAT_TRENDS_FILE, dashboard_file] {
            let path = self.dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(WriteError::new(&path, e)),
            }
        }
        Ok(removed)
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, WriteError> {
        let mut json = serde_json::to_vec_pretty(value)
            .map_err(|e| WriteError::new(self.dir.join(file_name), e))?;
        json.push(b'\n');
        self.write_atomic(file_name, &json)
    }

    fn write_atomic(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, WriteError> {
        let path = self.dir.join(file_name);
        fs::create_dir_all(&self.dir).map_err(|e| WriteError::new(&self.dir, e))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| WriteError::new(&path, e))?;
        tmp.write_all(bytes).map_err(|e| WriteError::new(&path, e))?;
        tmp.persist(&path).map_err(|e| WriteError::new(&path, e.error))?;
        tracing::info!(path = %path.display(), "wrote report file");
        Ok(path)
    }
}

/// Load a stage 1 report written by [`ReportWriter::write_risk_analysis`].
///
/// # Errors
///
/// Returns [`ReadError`] if the file is missing or is not a risk analysis.
pub fn read_risk_analysis(path: &Path) -> Result<RiskAnalysis, ReadError> {
    let raw = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ReadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
