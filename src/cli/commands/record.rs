//! Row commands: add, set, delete.

use serde::Serialize;

use crate::cli::commands::common::{Access, Globals, notice, open_session, print_json, success};
use crate::cli::commands::prompt::TerminalPrompt;
use crate::error::Result;
use crate::grid::Outcome;
use crate::model::{Field, Record};

#[derive(Serialize)]
struct DeleteOutput<'a> {
    id: &'a str,
    deleted: bool,
    count: usize,
}

/// Execute the add command.
///
/// # Errors
///
/// Returns an error if the grid cannot be loaded or saved.
pub fn execute_add(globals: &Globals) -> Result<()> {
    let (mut session, _) = open_session(globals, Access::Write)?;
    let record = session.add()?;

    if crate::is_silent() {
        println!("{}", record.id);
        return Ok(());
    }

    if globals.json {
        print_json(&record)?;
    } else {
        println!("Added row {}: {}", record.no, record.id);
    }
    Ok(())
}

/// Execute the set command.
///
/// # Errors
///
/// Returns an error if the field is not editable, the id is unknown, the
/// value is invalid, or the save fails.
pub fn execute_set(id: &str, field: &str, value: &str, globals: &Globals) -> Result<()> {
    let field: Field = field.parse()?;
    let (mut session, _) = open_session(globals, Access::Write)?;
    let record = session.set_field(id, field, value)?;

    if crate::is_silent() {
        println!("{}", record.id);
        return Ok(());
    }

    if globals.json {
        print_json(&record)?;
    } else {
        print_updated(&record, field);
    }
    Ok(())
}

fn print_updated(record: &Record, field: Field) {
    let shown = match record.get(field) {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    println!("Updated row {} {field}: {shown}", record.no);
    if field.is_numeric() {
        println!("  amount: {}", record.amount);
    }
}

/// Execute the delete command.
///
/// # Errors
///
/// Returns an error if the id is unknown or the save fails.
pub fn execute_delete(id: &str, globals: &Globals) -> Result<()> {
    let (mut session, _) = open_session(globals, Access::Write)?;
    let mut prompt = TerminalPrompt::new(globals.yes);
    let outcome = session.delete(id, &mut prompt)?;
    let deleted = outcome == Outcome::Applied;

    if crate::is_silent() {
        if deleted {
            println!("{id}");
        }
        return Ok(());
    }

    if globals.json {
        print_json(&DeleteOutput {
            id,
            deleted,
            count: session.records().len(),
        })?;
    } else if deleted {
        success(&format!("Deleted {id}"));
    } else {
        notice("Delete cancelled.");
    }
    Ok(())
}
