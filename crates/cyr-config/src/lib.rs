//! # cyr-config
//!
//! Layered configuration loading for cyrisk using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Credential variables (`GOOGLE_CUSTOMSEARCH_API_KEY`,
//!    `GOOGLE_CUSTOMSEARCH_CX_KEY`, `OPENAI_API_KEY`)
//! 2. Environment variables (`CYRISK_*` prefix, `__` as separator)
//! 3. Explicit `--config` file, or `./cyrisk.toml`
//! 4. User-level `~/.config/cyrisk/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CYRISK_SEARCH__RECENCY_DAYS` -> `search.recency_days`,
//! `CYRISK_LLM__PROJECT_PLAN__MODEL` -> `llm.project_plan.model`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use cyr_config::CyriskConfig;
//!
//! let config = CyriskConfig::load_with_dotenv(None).expect("config");
//! config.validate().expect("valid config");
//! println!("writing reports to {}", config.output.dir.display());
//! ```

mod error;
mod llm;
mod output;
mod search;

pub use error::ConfigError;
pub use llm::{LlmConfig, StageModel};
pub use output::OutputConfig;
pub use search::{MAX_RESULTS_PER_QUERY, SearchConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Search API key variable.
pub const SEARCH_API_KEY_VAR: &str = "GOOGLE_CUSTOMSEARCH_API_KEY";
/// Search engine ID variable.
pub const SEARCH_ENGINE_ID_VAR: &str = "GOOGLE_CUSTOMSEARCH_CX_KEY";
/// Language-model API key variable.
pub const LLM_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "cyrisk.toml";

/// Dotenv file read from the current directory.
pub const DOTENV_FILE: &str = ".env";

/// Load `path` into the process environment, overriding variables already
/// set. Returns `false` when the file does not exist, which is normal when
/// credentials come from the environment.
///
/// # Errors
///
/// Returns [`ConfigError::Dotenv`] if the file exists but cannot be read or
/// parsed.
pub fn load_dotenv(path: &Path) -> Result<bool, ConfigError> {
    match dotenvy::from_path_override(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ConfigError::Dotenv {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CyriskConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl CyriskConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT read `.env` -- use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if `config_file` is given but does
    /// not exist, or [`ConfigError::Figment`] if extraction fails.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_file
            && !path.exists()
        {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        Self::figment(config_file).extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// Values in `.env` take priority over variables already present in the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] for an unreadable or malformed `.env`,
    /// otherwise the same as [`Self::load`].
    pub fn load_with_dotenv(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        load_dotenv(Path::new(DOTENV_FILE))?;
        Self::load(config_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Explicit or project-local config
        let local_path =
            config_file.map_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Prefixed environment variables
        figment = figment.merge(Env::prefixed("CYRISK_").split("__"));

        // Layer 4: Conventional credential variables
        figment.merge(credential_env())
    }

    /// Check value ranges across all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.llm.validate()
    }

    /// Credential variables that are not set.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.search.engine_id.is_empty() {
            missing.push(SEARCH_ENGINE_ID_VAR);
        }
        if self.search.api_key.is_empty() {
            missing.push(SEARCH_API_KEY_VAR);
        }
        if self.llm.api_key.is_empty() {
            missing.push(LLM_API_KEY_VAR);
        }
        missing
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] listing every unset variable.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials(missing))
        }
    }

    /// Path of the dashboard file inside the output directory.
    #[must_use]
    pub fn dashboard_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.dashboard_file)
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cyrisk").join("config.toml"))
    }
}

/// Map the conventional credential variables onto their config keys.
fn credential_env() -> Env {
    Env::raw()
        .only(&[SEARCH_API_KEY_VAR, SEARCH_ENGINE_ID_VAR, LLM_API_KEY_VAR])
        .map(|key| {
            let key = key.as_str();
            if key.eq_ignore_ascii_case(SEARCH_API_KEY_VAR) {
                "search.api_key".into()
            } else if key.eq_ignore_ascii_case(SEARCH_ENGINE_ID_VAR) {
                "search.engine_id".into()
            } else {
                "llm.api_key".into()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = CyriskConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.search.is_configured());
        assert!(!config.llm.is_configured());
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn missing_credentials_lists_all_unset() {
        let config = CyriskConfig::default();
        assert_eq!(
            config.missing_credentials(),
            vec![SEARCH_ENGINE_ID_VAR, SEARCH_API_KEY_VAR, LLM_API_KEY_VAR]
        );
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn dashboard_path_joins_output_dir() {
        let config = CyriskConfig::default();
        assert_eq!(
            config.dashboard_path(),
            PathBuf::from("output").join("dashboard.html")
        );
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let err = CyriskConfig::load(Some(Path::new("/nonexistent/cyrisk.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }
}
