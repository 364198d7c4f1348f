//! Grid settings loaded from `~/.scopegrid/config.json`.
//!
//! Priority for every setting: environment variable > config file > default.

use crate::error::{Error, Result};
use crate::model::DEFAULT_BUDGET;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default timeout for the remote hierarchy fetch.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// On-disk configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// URL of the remote milestone hierarchy (enables the remote variant).
    pub api_url: Option<String>,
    /// Total budget that `amount` is derived from.
    pub budget: Option<f64>,
    /// Remote fetch timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Refresh from the remote source before read-only commands.
    pub refresh_on_start: Option<bool>,
}

/// Effective settings after applying defaults and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: Option<String>,
    pub budget: f64,
    pub timeout: Duration,
    pub refresh_on_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            budget: DEFAULT_BUDGET,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_on_start: false,
        }
    }
}

impl Settings {
    /// Load the config file (if any) and apply process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// an override is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => load_config_file(p)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a config file with overrides looked up through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range or an override does not parse.
    pub fn resolve<F>(file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = env("SG_API_URL")
            .or(file.api_url)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let budget = match env("SG_BUDGET").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::Config(format!("SG_BUDGET is not a number: {e}")))?,
            None => file.budget.unwrap_or(defaults.budget),
        };
        if !budget.is_finite() || budget < 0.0 {
            return Err(Error::Config(format!(
                "budget must be a non-negative number, got {budget}"
            )));
        }

        let timeout = file
            .timeout_secs
            .filter(|s| *s > 0)
            .map_or(defaults.timeout, Duration::from_secs);

        Ok(Self {
            api_url,
            budget,
            timeout,
            refresh_on_start: file.refresh_on_start.unwrap_or(defaults.refresh_on_start),
        })
    }

    /// The remote URL, or a configuration error naming how to set it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no `api_url` is configured.
    pub fn require_api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .ok_or_else(|| Error::Config("no api_url configured for remote reload".to_string()))
    }
}

/// Read and parse a config file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}
