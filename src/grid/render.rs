//! View model for display.
//!
//! [`render`] turns the collection and view state into display-ready rows
//! and summary strings. It does no I/O; the CLI decides how to print it.

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::grid::view::{
    Column, SortDirection, Status, ViewState, compute_summary, compute_visible, status,
};
use crate::model::Record;

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: String,
    pub no: u32,
    pub page: String,
    pub child_page: String,
    pub milestone: String,
    pub description: String,
    pub remarks: String,
    pub demo_date: String,
    pub deployment_date: String,
    /// e.g. `25%`
    pub percent_cost: String,
    /// e.g. `$25,000`
    pub amount: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub total_rows: usize,
    pub total_cost: String,
    pub avg_progress: String,
}

/// Everything a table display needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub rows: Vec<RowView>,
    pub summary: SummaryView,
    pub sort_column: Column,
    pub sort_direction: SortDirection,
    pub loading: bool,
    /// Local wall-clock time of the last save, `HH:MM:SS`.
    pub last_saved: Option<String>,
}

/// Build the view model.
///
/// The summary always covers the whole collection, not just visible rows.
#[must_use]
pub fn render(
    records: &[Record],
    view: &ViewState,
    today: NaiveDate,
    loading: bool,
    last_saved_at: Option<i64>,
) -> ViewModel {
    let rows = compute_visible(records, view, today)
        .into_iter()
        .map(|r| row_view(r, today))
        .collect();

    let summary = compute_summary(records);

    ViewModel {
        rows,
        summary: SummaryView {
            total_rows: summary.count,
            total_cost: format!("${}", format_number(summary.total_amount)),
            avg_progress: format!("{:.1}%", round_half_away(summary.avg_progress, 1)),
        },
        sort_column: view.sort_column,
        sort_direction: view.sort_direction,
        loading,
        last_saved: last_saved_at.and_then(local_time),
    }
}

fn row_view(record: &Record, today: NaiveDate) -> RowView {
    RowView {
        id: record.id.clone(),
        no: record.no,
        page: record.page.clone(),
        child_page: record.child_page.clone(),
        milestone: record.milestone.clone(),
        description: record.description.clone(),
        remarks: record.remarks.clone(),
        demo_date: record.demo_date.clone(),
        deployment_date: record.deployment_date.clone(),
        percent_cost: format!("{}%", record.percent_cost),
        amount: format!("${}", format_number(record.amount)),
        status: status(record, today),
    }
}

fn local_time(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
}

/// Round to `places` decimals with ties away from zero.
///
/// `format!` precision rounds ties to even, so `16.25` would show as `16.2`.
fn round_half_away(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Format with `,` thousands grouping and at most two fraction digits,
/// trailing zeros dropped (`1234.5` → `1,234.5`).
#[must_use]
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", round_half_away(value.abs(), 2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
