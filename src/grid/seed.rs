//! Example rows for a first run without a remote source.

use crate::model::Record;

struct Example {
    page: &'static str,
    child_page: &'static str,
    milestone: &'static str,
    description: &'static str,
    demo_date: &'static str,
    deployment_date: &'static str,
    percent_cost: f64,
}

const EXAMPLES: [Example; 3] = [
    Example {
        page: "Dashboard",
        child_page: "Overview",
        milestone: "KPI widgets",
        description: "Headline metrics and trend charts",
        demo_date: "2025-01-15",
        deployment_date: "2025-02-01",
        percent_cost: 25.0,
    },
    Example {
        page: "Reports",
        child_page: "Exports",
        milestone: "CSV export",
        description: "Download filtered reports",
        demo_date: "2025-03-10",
        deployment_date: "",
        percent_cost: 15.0,
    },
    Example {
        page: "Settings",
        child_page: "Users",
        milestone: "Role management",
        description: "Invite users and assign roles",
        demo_date: "",
        deployment_date: "",
        percent_cost: 10.0,
    },
];

/// Build the example collection with amounts derived against `budget`.
#[must_use]
pub fn example_records(budget: f64) -> Vec<Record> {
    EXAMPLES
        .iter()
        .zip(1u32..)
        .map(|(example, no)| {
            let mut record = Record::new(no);
            record.page = example.page.to_string();
            record.child_page = example.child_page.to_string();
            record.milestone = example.milestone.to_string();
            record.description = example.description.to_string();
            record.demo_date = example.demo_date.to_string();
            record.deployment_date = example.deployment_date.to_string();
            record.percent_cost = example.percent_cost;
            record.derive_amount(budget);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_examples_are_numbered_and_unique() {
        let records = example_records(100_000.0);
        let numbers: Vec<u32> = records.iter().map(|r| r.no).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), records.len());
        assert_eq!(records[0].amount, 25_000.0);
    }
}
