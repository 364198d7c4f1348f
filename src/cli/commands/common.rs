//! Shared plumbing for command handlers: opening the grid session, running
//! remote refreshes and printing notices.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use colored::Colorize;
use tracing::debug;

use crate::config::{Settings, default_actor, resolve_config_path, resolve_db_path};
use crate::error::{Error, Result};
use crate::grid::{GridSession, LoadOrigin, RefreshOutcome};
use crate::remote::HttpHierarchySource;
use crate::storage::SqliteStorage;

/// Global options every handler needs.
#[derive(Debug, Clone)]
pub struct Globals {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub actor: Option<String>,
    pub json: bool,
    pub yes: bool,
}

impl Globals {
    /// Load settings from the resolved config file.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file or an override is malformed.
    pub fn settings(&self) -> Result<Settings> {
        let path = resolve_config_path(self.config.as_deref());
        Settings::load(path.as_deref())
    }

    /// Resolve the database path.
    ///
    /// # Errors
    ///
    /// Returns a config error if no home directory can be found.
    pub fn db_path(&self) -> Result<PathBuf> {
        resolve_db_path(self.db.as_deref()).ok_or_else(|| {
            Error::Config("cannot determine home directory; pass --db or set SG_DB".to_string())
        })
    }

    #[must_use]
    pub fn actor(&self) -> String {
        self.actor.clone().unwrap_or_else(default_actor)
    }
}

/// Today's date as the status rules see it (UTC calendar date).
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// How a command uses the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read-only; refreshes on request or when `refresh_on_start` is set.
    Read { refresh: bool },
    /// Mutating; never refreshes a cached collection, since a refresh
    /// regenerates every record id.
    Write,
    /// The command drives the refresh itself; never fetch on open.
    Manual,
}

/// Open the grid session, fetching from the remote source when one is
/// configured and either nothing was cached or the access asks for it.
///
/// # Errors
///
/// Returns an error if settings, storage or the seed write fail. Fetch
/// failures are reported as notices, never as errors.
pub fn open_session(globals: &Globals, access: Access) -> Result<(GridSession, Settings)> {
    let settings = globals.settings()?;
    let db_path = globals.db_path()?;
    let mut session = open_at(&db_path, &settings, &globals.actor())?;

    let wants_fetch = match access {
        Access::Read { refresh } => {
            refresh || settings.refresh_on_start || session.origin() == LoadOrigin::Empty
        }
        Access::Write => session.origin() == LoadOrigin::Empty,
        Access::Manual => false,
    };
    if settings.api_url.is_some() && wants_fetch {
        refresh_from_remote(&mut session, &settings)?;
    }

    Ok((session, settings))
}

fn open_at(db_path: &Path, settings: &Settings, actor: &str) -> Result<GridSession> {
    debug!(db = %db_path.display(), "Opening grid");
    let storage = SqliteStorage::open(db_path)?;
    GridSession::open(storage, settings.budget, settings.api_url.is_some(), actor)
}

/// Fetch the remote hierarchy into the session and report the outcome.
///
/// # Errors
///
/// Returns a config error if no `api_url` is set, or an error if the
/// runtime cannot start or the refreshed snapshot cannot be saved.
pub fn refresh_from_remote(
    session: &mut GridSession,
    settings: &Settings,
) -> Result<RefreshOutcome> {
    let source = remote_source(settings)?;
    loading_notice();
    let outcome = block_on(session.refresh(&source))??;

    report_refresh(&outcome);
    Ok(outcome)
}

/// HTTP source for the configured `api_url`.
///
/// # Errors
///
/// Returns a config error if no `api_url` is set.
pub fn remote_source(settings: &Settings) -> Result<HttpHierarchySource> {
    let url = settings.require_api_url()?;
    HttpHierarchySource::new(url, settings.timeout)
}

/// Run a future to completion on a fresh runtime.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    Ok(rt.block_on(future))
}

pub fn loading_notice() {
    notice(&"Loading data from server...".dimmed().to_string());
}

/// Print the user-facing notice for a refresh outcome.
pub fn report_refresh(outcome: &RefreshOutcome) {
    let Some(message) = outcome.message() else {
        return;
    };
    match outcome {
        RefreshOutcome::Refreshed { .. } => success(message),
        RefreshOutcome::KeptCache { .. } => warning(message),
        RefreshOutcome::StartedEmpty { .. } => failure(message),
        RefreshOutcome::Superseded => {}
    }
}

/// Print a notice on stderr unless `--quiet`.
pub fn notice(message: &str) {
    if !crate::is_quiet() {
        eprintln!("{message}");
    }
}

pub fn success(message: &str) {
    notice(&format!("{} {message}", "✓".green()));
}

pub fn warning(message: &str) {
    notice(&format!("{} {message}", "!".yellow()));
}

pub fn failure(message: &str) {
    notice(&format!("{} {message}", "✗".red()));
}

/// Print a serializable value as one line of JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
