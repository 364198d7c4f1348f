//! Query layer: status derivation, filtering, sorting and summary statistics.
//!
//! Everything here is a pure function of the records and a [`ViewState`];
//! nothing is persisted.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::Record;
use crate::validate::{normalize_column, normalize_status};

/// Derived delivery status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    DemoDone,
    Deployed,
}

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DemoDone => "demo-done",
            Self::Deployed => "deployed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_status(s) {
            Ok(canonical) => Ok(match canonical {
                "deployed" => Self::Deployed,
                "demo-done" => Self::DemoDone,
                _ => Self::Pending,
            }),
            Err((input, Some(suggestion))) => Err(Error::InvalidArgument(format!(
                "unknown status '{input}' (did you mean '{suggestion}'?)"
            ))),
            Err((input, None)) => Err(Error::InvalidArgument(format!("unknown status '{input}'"))),
        }
    }
}

/// Classify a record against `today`.
///
/// A deployment date on or before today wins over a demo date; ISO dates
/// compare correctly as strings.
#[must_use]
pub fn status(record: &Record, today: NaiveDate) -> Status {
    let today = today.format("%Y-%m-%d").to_string();

    if !record.deployment_date.is_empty() && record.deployment_date.as_str() <= today.as_str() {
        Status::Deployed
    } else if !record.demo_date.is_empty() && record.demo_date.as_str() <= today.as_str() {
        Status::DemoDone
    } else {
        Status::Pending
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    #[default]
    No,
    Page,
    ChildPage,
    Milestone,
    Description,
    Remarks,
    DemoDate,
    DeploymentDate,
    PercentCost,
    Amount,
}

impl Column {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Page => "page",
            Self::ChildPage => "childPage",
            Self::Milestone => "milestone",
            Self::Description => "description",
            Self::Remarks => "remarks",
            Self::DemoDate => "demoDate",
            Self::DeploymentDate => "deploymentDate",
            Self::PercentCost => "percentCost",
            Self::Amount => "amount",
        }
    }

    /// Three-way comparison of two records on this column.
    ///
    /// Text compares case-insensitively; numbers use a total order.
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let text = |x: &str, y: &str| x.to_lowercase().cmp(&y.to_lowercase());
        match self {
            Self::No => a.no.cmp(&b.no),
            Self::Page => text(&a.page, &b.page),
            Self::ChildPage => text(&a.child_page, &b.child_page),
            Self::Milestone => text(&a.milestone, &b.milestone),
            Self::Description => text(&a.description, &b.description),
            Self::Remarks => text(&a.remarks, &b.remarks),
            Self::DemoDate => text(&a.demo_date, &b.demo_date),
            Self::DeploymentDate => text(&a.deployment_date, &b.deployment_date),
            Self::PercentCost => a.percent_cost.total_cmp(&b.percent_cost),
            Self::Amount => a.amount.total_cmp(&b.amount),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = normalize_column(s)
            .map_err(|input| Error::InvalidArgument(format!("unknown sort column '{input}'")))?;
        Ok(match canonical {
            "page" => Self::Page,
            "childPage" => Self::ChildPage,
            "milestone" => Self::Milestone,
            "description" => Self::Description,
            "remarks" => Self::Remarks,
            "demoDate" => Self::DemoDate,
            "deploymentDate" => Self::DeploymentDate,
            "percentCost" => Self::PercentCost,
            "amount" => Self::Amount,
            _ => Self::No,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Search, filter and sort state of the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: String,
    pub status: Option<Status>,
    pub sort_column: Column,
    pub sort_direction: SortDirection,
}

impl ViewState {
    /// Header click: the current column flips direction, another column
    /// starts ascending.
    pub fn toggle_sort(&mut self, column: Column) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Asc;
        }
    }

    fn matches(&self, record: &Record, needle: &str, today: NaiveDate) -> bool {
        let matches_search = needle.is_empty()
            || record.page.to_lowercase().contains(needle)
            || record.milestone.to_lowercase().contains(needle)
            || record.child_page.to_lowercase().contains(needle);

        let matches_status = self.status.is_none_or(|s| status(record, today) == s);

        matches_search && matches_status
    }
}

/// Filter and sort `records` for display.
///
/// The sort is stable, so rows with equal keys keep collection order in
/// either direction.
#[must_use]
pub fn compute_visible<'a>(
    records: &'a [Record],
    view: &ViewState,
    today: NaiveDate,
) -> Vec<&'a Record> {
    let needle = view.search.to_lowercase();

    let mut visible: Vec<&Record> = records
        .iter()
        .filter(|r| view.matches(r, &needle, today))
        .collect();

    visible.sort_by(|a, b| {
        let ord = view.sort_column.compare(a, b);
        match view.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    visible
}

/// Aggregate statistics over a collection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub total_amount: f64,
    pub avg_progress: f64,
}

#[must_use]
pub fn compute_summary(records: &[Record]) -> Summary {
    let count = records.len();
    let total_amount = records.iter().map(|r| r.amount).sum();
    let avg_progress = if count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let n = count as f64;
        records.iter().map(|r| r.percent_cost).sum::<f64>() / n
    } else {
        0.0
    };

    Summary {
        count,
        total_amount,
        avg_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn row(no: u32, page: &str, milestone: &str) -> Record {
        let mut r = Record::new(no);
        r.page = page.to_string();
        r.milestone = milestone.to_string();
        r
    }

    #[test]
    fn test_status_classification() {
        let mut deployed = row(1, "a", "");
        deployed.deployment_date = "2025-06-01".into();
        deployed.demo_date = "2025-05-01".into();
        assert_eq!(status(&deployed, today()), Status::Deployed);

        let mut demo = row(2, "b", "");
        demo.demo_date = "2025-06-15".into();
        demo.deployment_date = "2025-07-01".into();
        assert_eq!(status(&demo, today()), Status::DemoDone);

        let mut pending = row(3, "c", "");
        pending.demo_date = "2025-06-16".into();
        assert_eq!(status(&pending, today()), Status::Pending);

        assert_eq!(status(&row(4, "d", ""), today()), Status::Pending);
    }

    #[test]
    fn test_search_is_case_insensitive_on_page_milestone_child_page() {
        let mut records = vec![
            row(1, "Dashboard", ""),
            row(2, "Reports", "Export CSV"),
            row(3, "Settings", ""),
            row(4, "Billing", ""),
        ];
        records[2].child_page = "Dash widgets".into();
        records[3].description = "dashboard link".into();

        let view = ViewState {
            search: "DASH".into(),
            ..ViewState::default()
        };
        let visible = compute_visible(&records, &view, today());
        let pages: Vec<&str> = visible.iter().map(|r| r.page.as_str()).collect();
        assert_eq!(pages, vec!["Dashboard", "Settings"]);

        let view = ViewState {
            search: "csv".into(),
            ..ViewState::default()
        };
        assert_eq!(compute_visible(&records, &view, today()).len(), 1);
    }

    #[test]
    fn test_status_filter() {
        let mut records = vec![row(1, "a", ""), row(2, "b", ""), row(3, "c", "")];
        records[0].deployment_date = "2025-01-01".into();
        records[1].demo_date = "2025-01-01".into();

        for (filter, expected) in [
            (Status::Deployed, "a"),
            (Status::DemoDone, "b"),
            (Status::Pending, "c"),
        ] {
            let view = ViewState {
                status: Some(filter),
                ..ViewState::default()
            };
            let visible = compute_visible(&records, &view, today());
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].page, expected);
        }
    }

    #[test]
    fn test_sort_strings_case_insensitive() {
        let records = vec![row(1, "beta", ""), row(2, "Alpha", ""), row(3, "gamma", "")];
        let mut view = ViewState::default();
        view.toggle_sort(Column::Page);

        let pages: Vec<&str> = compute_visible(&records, &view, today())
            .iter()
            .map(|r| r.page.as_str())
            .collect();
        assert_eq!(pages, vec!["Alpha", "beta", "gamma"]);

        view.toggle_sort(Column::Page);
        assert_eq!(view.sort_direction, SortDirection::Desc);
        let pages: Vec<&str> = compute_visible(&records, &view, today())
            .iter()
            .map(|r| r.page.as_str())
            .collect();
        assert_eq!(pages, vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_sort_keeps_equal_keys_in_collection_order() {
        let records = vec![row(1, "same", ""), row(2, "SAME", ""), row(3, "same", "")];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let view = ViewState {
                sort_column: Column::Page,
                sort_direction: direction,
                ..ViewState::default()
            };
            let order: Vec<u32> = compute_visible(&records, &view, today())
                .iter()
                .map(|r| r.no)
                .collect();
            assert_eq!(order, vec![1, 2, 3]);
        }
    }

    #[test]
    fn test_sort_numeric_columns() {
        let mut records = vec![row(1, "a", ""), row(2, "b", ""), row(3, "c", "")];
        records[0].percent_cost = 50.0;
        records[1].percent_cost = 5.0;
        records[2].percent_cost = 20.0;

        let view = ViewState {
            sort_column: Column::PercentCost,
            ..ViewState::default()
        };
        let order: Vec<u32> = compute_visible(&records, &view, today())
            .iter()
            .map(|r| r.no)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_toggle_sort_switching_column_resets_to_ascending() {
        let mut view = ViewState::default();
        view.toggle_sort(Column::No);
        assert_eq!(view.sort_direction, SortDirection::Desc);
        view.toggle_sort(Column::Amount);
        assert_eq!(view.sort_column, Column::Amount);
        assert_eq!(view.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(
            compute_summary(&[]),
            Summary {
                count: 0,
                total_amount: 0.0,
                avg_progress: 0.0
            }
        );
    }

    #[test]
    fn test_summary_averages_progress() {
        let mut records = vec![row(1, "a", ""), row(2, "b", "")];
        records[0].percent_cost = 10.0;
        records[0].amount = 10_000.0;
        records[1].percent_cost = 25.0;
        records[1].amount = 25_000.0;

        let summary = compute_summary(&records);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.avg_progress, 17.5);
        assert_eq!(summary.total_amount, 35_000.0);
    }

    #[test]
    fn test_status_and_column_parse() {
        assert_eq!("deployed".parse::<Status>().unwrap(), Status::Deployed);
        assert_eq!("demo-done".parse::<Status>().unwrap(), Status::DemoDone);
        assert_eq!("Pending".parse::<Status>().unwrap(), Status::Pending);
        assert!("shipped-ish".parse::<Status>().is_err());

        assert_eq!("percentCost".parse::<Column>().unwrap(), Column::PercentCost);
        assert_eq!("child_page".parse::<Column>().unwrap(), Column::ChildPage);
        assert!("colour".parse::<Column>().is_err());
    }
}
