//! Import and export commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::commands::common::{
    Access, Globals, notice, open_session, print_json, success, today,
};
use crate::cli::commands::prompt::TerminalPrompt;
use crate::error::{Error, Result};
use crate::grid::Outcome;
use crate::sync::{export_to_dir, parse_import, snapshot_json};

#[derive(Serialize)]
struct ImportOutput {
    imported: bool,
    count: usize,
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    count: usize,
}

/// Execute the import command.
///
/// The file is parsed before anything is asked or loaded, so a malformed
/// file never touches the stored collection.
///
/// # Errors
///
/// Returns a format error for anything but a JSON array of objects, or an
/// error if the file cannot be read or the save fails.
pub fn execute_import(file: &Path, globals: &Globals) -> Result<()> {
    let raw = read_source(file)?;
    let settings = globals.settings()?;
    let records = parse_import(&raw, settings.budget)?;

    let (mut session, _) = open_session(globals, Access::Write)?;
    let mut prompt = TerminalPrompt::new(globals.yes);
    let outcome = session.import(records, &file.display().to_string(), &mut prompt)?;
    let imported = outcome == Outcome::Applied;

    if crate::is_silent() {
        if imported {
            for record in session.records() {
                println!("{}", record.id);
            }
        }
        return Ok(());
    }

    if globals.json {
        print_json(&ImportOutput {
            imported,
            count: session.records().len(),
        })?;
    } else if imported {
        success(&format!(
            "Data imported successfully! ({} rows)",
            session.records().len()
        ));
    } else {
        notice("Import cancelled.");
    }
    Ok(())
}

fn read_source(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    std::fs::read_to_string(file).map_err(|e| {
        Error::InvalidArgument(format!("cannot read import file {}: {e}", file.display()))
    })
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the grid cannot be loaded or the file not written.
pub fn execute_export(dir: Option<&Path>, to_stdout: bool, globals: &Globals) -> Result<()> {
    let (session, _) = open_session(globals, Access::Read { refresh: false })?;

    if to_stdout {
        println!("{}", snapshot_json(session.records())?);
        return Ok(());
    }

    let dir = dir.unwrap_or_else(|| Path::new("."));
    let path = export_to_dir(session.records(), dir, today())?;

    if crate::is_silent() {
        println!("{}", path.display());
        return Ok(());
    }

    if globals.json {
        print_json(&ExportOutput {
            path,
            count: session.records().len(),
        })?;
    } else {
        success(&format!(
            "Exported {} rows to {}",
            session.records().len(),
            path.display()
        ));
    }
    Ok(())
}
