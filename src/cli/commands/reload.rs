//! Reload command: replace local rows with a fresh remote snapshot.

use serde::Serialize;

use crate::cli::commands::common::{
    Access, Globals, block_on, notice, open_session, print_json, remote_source,
    report_refresh,
};
use crate::cli::commands::prompt::TerminalPrompt;
use crate::error::Result;
use crate::grid::RefreshOutcome;

#[derive(Serialize)]
struct ReloadOutput {
    reloaded: bool,
    outcome: &'static str,
    count: usize,
}

/// Execute the reload command.
///
/// # Errors
///
/// Returns a config error when no `api_url` is configured, or an error if
/// the grid cannot be loaded or saved. A failed fetch is not an error.
pub fn execute(globals: &Globals) -> Result<()> {
    let source = remote_source(&globals.settings()?)?;
    let (mut session, _) = open_session(globals, Access::Manual)?;
    let mut prompt = TerminalPrompt::new(globals.yes);

    let outcome = block_on(session.reload(&source, &mut prompt))??;
    if let Some(outcome) = &outcome {
        report_refresh(outcome);
    }

    let label = match &outcome {
        None => "declined",
        Some(RefreshOutcome::Refreshed { .. }) => "refreshed",
        Some(RefreshOutcome::KeptCache { .. }) => "kept_cache",
        Some(RefreshOutcome::StartedEmpty { .. }) => "started_empty",
        Some(RefreshOutcome::Superseded) => "superseded",
    };

    if globals.json {
        print_json(&ReloadOutput {
            reloaded: matches!(outcome, Some(RefreshOutcome::Refreshed { .. })),
            outcome: label,
            count: session.records().len(),
        })?;
    } else {
        match outcome {
            None => notice("Reload cancelled."),
            Some(RefreshOutcome::Refreshed { count }) => println!("{count} rows loaded."),
            Some(_) => {}
        }
    }
    Ok(())
}
