//! Remote milestone hierarchy (clients → projects → milestones).
//!
//! The remote source serves a nested document; the grid only works with
//! flat rows, so [`flatten`] turns the tree into [`Record`]s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::record::{
    Record, amount_for, generate_id, lenient_number, lenient_position, lenient_string,
};

/// A client with its projects.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteClient {
    #[serde(default)]
    pub client_id: Option<Value>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub projects: Vec<RemoteProject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    #[serde(default)]
    pub project_id: Option<Value>,
    #[serde(default)]
    pub milestones: Vec<RemoteMilestone>,
}

/// One milestone row as served.
///
/// Scalars decode leniently, like imported records: a wrongly typed value
/// becomes its default instead of failing the whole refresh. `no == 0`
/// means the server gave no usable position.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMilestone {
    #[serde(default)]
    pub milestone_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_position")]
    pub no: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub child_page: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub milestone_feature: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub remarks: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub demo_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub deployment_date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_of_cost: f64,
}

/// Flatten the hierarchy into grid rows, deriving amounts against `budget`.
///
/// Rows keep the server's `no` when present; otherwise they take their
/// position in the flattened output.
#[must_use]
pub fn flatten(clients: Vec<RemoteClient>, budget: f64) -> Vec<Record> {
    let mut rows = Vec::new();

    for client in clients {
        for project in client.projects {
            for milestone in project.milestones {
                let position = u32::try_from(rows.len() + 1).unwrap_or(u32::MAX);
                let percent_cost = milestone.percent_of_cost;

                rows.push(Record {
                    id: generate_id(),
                    no: if milestone.no > 0 { milestone.no } else { position },
                    page: milestone.page,
                    child_page: milestone.child_page,
                    milestone: milestone.milestone_feature,
                    description: milestone.description,
                    remarks: milestone.remarks,
                    demo_date: calendar_date(Some(milestone.demo_date.as_str())),
                    deployment_date: calendar_date(Some(milestone.deployment_date.as_str())),
                    percent_cost,
                    amount: amount_for(percent_cost, budget),
                    milestone_id: milestone.milestone_id,
                    client_id: client.client_id.clone(),
                    client_name: client.client_name.clone(),
                    project_id: project.project_id.clone(),
                    extra: Map::new(),
                });
            }
        }
    }

    rows
}

/// Reduce a server date or timestamp to a UTC `YYYY-MM-DD`.
///
/// Empty or unparseable input yields an empty string.
#[must_use]
pub fn calendar_date(input: Option<&str>) -> String {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).date_naive().to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_BUDGET;

    fn sample() -> Vec<RemoteClient> {
        serde_json::from_value(serde_json::json!([
            {
                "clientId": 7,
                "clientName": "Acme",
                "projects": [
                    {
                        "projectId": 70,
                        "milestones": [
                            {
                                "milestoneId": 700,
                                "no": 1,
                                "page": "Dashboard",
                                "childPage": "Widgets",
                                "milestoneFeature": "Charts",
                                "description": "Render charts",
                                "remarks": null,
                                "demoDate": "2024-03-01T00:00:00",
                                "deploymentDate": null,
                                "percentOfCost": 25
                            },
                            {
                                "milestoneId": 701,
                                "page": "Reports"
                            }
                        ]
                    }
                ]
            },
            {
                "clientId": 8,
                "clientName": "Globex",
                "projects": []
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_flatten_maps_fields() {
        let rows = flatten(sample(), DEFAULT_BUDGET);
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.no, 1);
        assert_eq!(first.page, "Dashboard");
        assert_eq!(first.child_page, "Widgets");
        assert_eq!(first.milestone, "Charts");
        assert_eq!(first.remarks, "");
        assert_eq!(first.demo_date, "2024-03-01");
        assert_eq!(first.deployment_date, "");
        assert_eq!(first.percent_cost, 25.0);
        assert_eq!(first.amount, 25_000.0);
        assert_eq!(first.client_name.as_deref(), Some("Acme"));
        assert_eq!(first.client_id, Some(serde_json::json!(7)));
        assert_eq!(first.project_id, Some(serde_json::json!(70)));
        assert_eq!(first.milestone_id, Some(serde_json::json!(700)));
    }

    #[test]
    fn test_flatten_defaults_missing_values() {
        let rows = flatten(sample(), DEFAULT_BUDGET);
        let second = &rows[1];
        assert_eq!(second.no, 2);
        assert_eq!(second.percent_cost, 0.0);
        assert_eq!(second.amount, 0.0);
        assert_ne!(rows[0].id, second.id);
    }

    #[test]
    fn test_flatten_coerces_mistyped_scalars() {
        let clients: Vec<RemoteClient> = serde_json::from_value(serde_json::json!([
            {"projects": [{"milestones": [
                {"no": 1.5, "page": 12, "percentOfCost": "25"},
                {"no": -1, "percentOfCost": true},
                {"no": "3", "milestoneFeature": null, "demoDate": 20240101}
            ]}]}
        ]))
        .unwrap();

        let rows = flatten(clients, DEFAULT_BUDGET);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].no, 1);
        assert_eq!(rows[0].page, "12");
        assert_eq!(rows[0].percent_cost, 25.0);
        assert_eq!(rows[0].amount, 25_000.0);
        assert_eq!(rows[1].no, 2);
        assert_eq!(rows[1].percent_cost, 0.0);
        assert_eq!(rows[2].no, 3);
        assert_eq!(rows[2].milestone, "");
        assert_eq!(rows[2].demo_date, "");
    }

    #[test]
    fn test_calendar_date_formats() {
        assert_eq!(calendar_date(Some("2024-05-06")), "2024-05-06");
        assert_eq!(calendar_date(Some("2024-05-06T10:11:12.345")), "2024-05-06");
        assert_eq!(calendar_date(Some("2024-05-06T23:30:00-02:00")), "2024-05-07");
        assert_eq!(calendar_date(Some("not a date")), "");
        assert_eq!(calendar_date(Some("")), "");
        assert_eq!(calendar_date(None), "");
    }
}
