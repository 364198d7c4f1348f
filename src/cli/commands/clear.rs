//! Clear command implementation.

use serde::Serialize;

use crate::cli::commands::common::{Access, Globals, notice, open_session, print_json, success};
use crate::cli::commands::prompt::TerminalPrompt;
use crate::error::Result;

#[derive(Serialize)]
struct ClearOutput {
    cleared: bool,
    count: usize,
}

/// Execute the clear command.
///
/// # Errors
///
/// Returns an error if the grid cannot be loaded or saved.
pub fn execute(globals: &Globals) -> Result<()> {
    let (mut session, _) = open_session(globals, Access::Write)?;
    let mut prompt = TerminalPrompt::new(globals.yes);
    let cleared = session.clear(&mut prompt)?.is_applied();

    if globals.json {
        print_json(&ClearOutput {
            cleared,
            count: session.records().len(),
        })?;
    } else if cleared {
        success("All rows cleared.");
    } else {
        notice("Clear cancelled.");
    }
    Ok(())
}
