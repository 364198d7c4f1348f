//! History command: the audit trail of saves.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::cli::commands::common::{Globals, print_json};
use crate::error::Result;
use crate::storage::{Event, SqliteStorage};

#[derive(Serialize)]
struct HistoryOutput {
    count: usize,
    events: Vec<Event>,
}

/// Execute the history command.
///
/// Reads the audit table directly; the grid itself is not loaded.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn execute(limit: u32, globals: &Globals) -> Result<()> {
    let storage = SqliteStorage::open(&globals.db_path()?)?;
    let events = storage.recent_events(Some(limit))?;

    if globals.json {
        return print_json(&HistoryOutput {
            count: events.len(),
            events,
        });
    }

    if events.is_empty() {
        println!("No changes recorded.");
        return Ok(());
    }

    for event in &events {
        let when = DateTime::from_timestamp_millis(event.created_at)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let target = event.record_id.as_deref().unwrap_or("-");
        let detail = event.detail.as_deref().unwrap_or("");
        println!(
            "{when}  {:<22} {:<32} {:>4} rows  {}  {detail}",
            event.event_type.as_str(),
            target,
            event.record_count,
            event.actor,
        );
    }
    Ok(())
}
