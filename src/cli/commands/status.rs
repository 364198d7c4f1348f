//! Status command implementation.

use serde::Serialize;

use crate::cli::commands::common::{Access, Globals, open_session, print_json, today};
use crate::error::Result;
use crate::grid::{Status, Summary, compute_summary, format_number, status};

#[derive(Serialize)]
struct StatusOutput {
    db_path: String,
    api_url: Option<String>,
    budget: f64,
    last_saved_at: Option<i64>,
    summary: Summary,
    statuses: StatusBreakdown,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "kebab-case")]
struct StatusBreakdown {
    pending: usize,
    demo_done: usize,
    deployed: usize,
}

/// Execute status command.
///
/// # Errors
///
/// Returns an error if settings or storage cannot be loaded.
pub fn execute(globals: &Globals) -> Result<()> {
    let db_path = globals.db_path()?;
    let (session, settings) = open_session(globals, Access::Read { refresh: false })?;

    let today = today();
    let mut statuses = StatusBreakdown::default();
    for record in session.records() {
        match status(record, today) {
            Status::Pending => statuses.pending += 1,
            Status::DemoDone => statuses.demo_done += 1,
            Status::Deployed => statuses.deployed += 1,
        }
    }
    let summary = compute_summary(session.records());

    if globals.json {
        return print_json(&StatusOutput {
            db_path: db_path.display().to_string(),
            api_url: settings.api_url,
            budget: settings.budget,
            last_saved_at: session.last_saved_at(),
            summary,
            statuses,
        });
    }

    println!("scopegrid Status");
    println!("================");
    println!();
    println!("Database: {}", db_path.display());
    match &settings.api_url {
        Some(url) => println!("Remote:   {url}"),
        None => println!("Remote:   (none)"),
    }
    println!("Budget:   ${}", format_number(settings.budget));
    println!();
    println!("Rows: {}", summary.count);
    println!("  Pending:   {}", statuses.pending);
    println!("  Demo done: {}", statuses.demo_done);
    println!("  Deployed:  {}", statuses.deployed);
    println!("Total cost:   ${}", format_number(summary.total_amount));
    println!("Avg progress: {:.1}%", summary.avg_progress);
    Ok(())
}
