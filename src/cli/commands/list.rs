//! List and summary commands.

use colored::{ColoredString, Colorize};

use crate::cli::ListArgs;
use crate::cli::commands::common::{Access, Globals, open_session, print_json, today, truncate};
use crate::error::Result;
use crate::grid::{Column, RowView, SortDirection, Status, ViewModel, ViewState, render};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if a filter is invalid or the grid cannot be loaded.
pub fn execute(args: &ListArgs, globals: &Globals) -> Result<()> {
    let view = ViewState {
        search: args.search.clone().unwrap_or_default(),
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
        sort_column: args.sort.parse::<Column>()?,
        sort_direction: if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        },
    };

    let (session, _) = open_session(globals, Access::Read { refresh: args.refresh })?;
    let model = render(
        session.records(),
        &view,
        today(),
        session.is_loading(),
        session.last_saved_at(),
    );

    if crate::is_silent() {
        for row in &model.rows {
            println!("{}", row.id);
        }
        return Ok(());
    }

    if crate::is_csv() {
        print_csv(session.records(), &model);
    } else if globals.json {
        print_json(&model)?;
    } else if model.rows.is_empty() {
        println!("No rows found.");
        print_footer(&model);
    } else {
        print_table(&model);
        print_footer(&model);
    }

    Ok(())
}

/// Execute the summary command.
///
/// # Errors
///
/// Returns an error if the grid cannot be loaded.
pub fn execute_summary(refresh: bool, globals: &Globals) -> Result<()> {
    let (session, _) = open_session(globals, Access::Read { refresh })?;
    let summary = crate::grid::compute_summary(session.records());

    if globals.json {
        return print_json(&summary);
    }

    let model = render(
        session.records(),
        &ViewState::default(),
        today(),
        false,
        session.last_saved_at(),
    );
    println!("Total rows:   {}", model.summary.total_rows);
    println!("Total cost:   {}", model.summary.total_cost);
    println!("Avg progress: {}", model.summary.avg_progress);
    if let Some(saved) = &model.last_saved {
        println!("Last saved:   {saved}");
    }
    Ok(())
}

fn print_csv(records: &[crate::model::Record], model: &ViewModel) {
    println!(
        "no,id,page,childPage,milestone,description,remarks,demoDate,deploymentDate,percentCost,amount,status"
    );
    for row in &model.rows {
        if let Some(record) = records.iter().find(|r| r.id == row.id) {
            println!("{}", csv_row(record, row.status));
        }
    }
}

/// One CSV line; every free-form column is escaped, dates included since
/// imports do not validate them.
fn csv_row(record: &crate::model::Record, status: Status) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        record.no,
        crate::csv_escape(&record.id),
        crate::csv_escape(&record.page),
        crate::csv_escape(&record.child_page),
        crate::csv_escape(&record.milestone),
        crate::csv_escape(&record.description),
        crate::csv_escape(&record.remarks),
        crate::csv_escape(&record.demo_date),
        crate::csv_escape(&record.deployment_date),
        record.percent_cost,
        record.amount,
        status,
    )
}

fn paint(row: &RowView, text: &str) -> ColoredString {
    match row.status {
        Status::Deployed => text.green(),
        Status::DemoDone => text.yellow(),
        Status::Pending => text.normal(),
    }
}

fn header_label(model: &ViewModel, column: Column, label: &str) -> String {
    if model.sort_column != column {
        return label.to_string();
    }
    let arrow = match model.sort_direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    };
    format!("{label}{arrow}")
}

fn print_table(model: &ViewModel) {
    let header = format!(
        "{:>4}  {:<18} {:<14} {:<22} {:<10} {:<10} {:>6} {:>12}  {:<9}  {}",
        header_label(model, Column::No, "No"),
        header_label(model, Column::Page, "Page"),
        header_label(model, Column::ChildPage, "Child Page"),
        header_label(model, Column::Milestone, "Milestone"),
        header_label(model, Column::DemoDate, "Demo"),
        header_label(model, Column::DeploymentDate, "Deploy"),
        header_label(model, Column::PercentCost, "%"),
        header_label(model, Column::Amount, "Amount"),
        "Status",
        "ID",
    );
    println!("{}", header.as_str().bold());

    for row in &model.rows {
        let line = format!(
            "{:>4}  {:<18} {:<14} {:<22} {:<10} {:<10} {:>6} {:>12}  {:<9}  {}",
            row.no,
            truncate(&row.page, 18),
            truncate(&row.child_page, 14),
            truncate(&row.milestone, 22),
            row.demo_date,
            row.deployment_date,
            row.percent_cost,
            row.amount,
            row.status,
            row.id,
        );
        println!("{}", paint(row, &line));
    }
}

fn print_footer(model: &ViewModel) {
    println!();
    println!(
        "{} rows · total {} · avg progress {}",
        model.summary.total_rows, model.summary.total_cost, model.summary.avg_progress
    );
    if let Some(saved) = &model.last_saved {
        println!("Last saved: {saved}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    #[test]
    fn test_csv_row_escapes_dates() {
        let mut record = Record::new(1);
        record.id = "row_1".into();
        record.page = "Home, main".into();
        record.demo_date = "1,2".into();
        record.percent_cost = 25.0;
        record.amount = 25_000.0;

        let line = csv_row(&record, Status::Pending);
        assert_eq!(
            line,
            "1,row_1,\"Home, main\",,,,,\"1,2\",,25,25000,pending"
        );
    }
}
