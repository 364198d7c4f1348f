//! Configuration management.
//!
//! This module resolves where scopegrid keeps its data and settings, and who
//! is acting on the grid.
//!
//! # Layout
//!
//! - **Database**: `~/.scopegrid/data/scopegrid.db`
//! - **Config**: `~/.scopegrid/config.json`
//!
//! Both can be redirected with `--db` / `SG_DB` and `--config` / `SG_CONFIG`.

mod settings;

pub use settings::{ConfigFile, DEFAULT_TIMEOUT_SECS, Settings, load_config_file};

use std::path::{Path, PathBuf};

/// Get the global scopegrid directory location (`~/.scopegrid/`).
#[must_use]
pub fn global_scopegrid_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".scopegrid"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (flag or `SG_DB`), use it directly
/// 2. Global location: `~/.scopegrid/data/scopegrid.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    global_scopegrid_dir().map(|dir| dir.join("data").join("scopegrid.db"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. If `explicit_path` is provided (flag or `SG_CONFIG`), use it directly
/// 2. Global location: `~/.scopegrid/config.json`
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    global_scopegrid_dir().map(|dir| dir.join("config.json"))
}

/// Get the default actor name for the audit trail.
///
/// Priority:
/// 1. `SG_ACTOR` environment variable
/// 2. Git user name
/// 3. System username
/// 4. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var("SG_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(output) = std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    if let Ok(user) = std::env::var("USER") {
        return user;
    }

    "unknown".to_string()
}
