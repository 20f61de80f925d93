//! Output location configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_dashboard_file() -> String {
    String::from("dashboard.html")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory receiving the stage JSON files and the dashboard.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            dashboard_file: default_dashboard_file(),
        }
    }
}
