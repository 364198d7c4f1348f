//! Milestone record model.
//!
//! A record is one row of the grid. It is serialized with camelCase keys so
//! exported files stay compatible with the JSON snapshots other tools produce.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Default total budget used to derive `amount` from `percentCost`.
pub const DEFAULT_BUDGET: f64 = 100_000.0;

/// One milestone row.
///
/// Every field tolerates missing or loosely typed input so imported files
/// with stray shapes still load; unknown keys are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier (`row_<millis>_<suffix>`)
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// 1-based position in the collection
    #[serde(default, deserialize_with = "lenient_position")]
    pub no: u32,

    #[serde(default, deserialize_with = "lenient_string")]
    pub page: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub child_page: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub milestone: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub remarks: String,

    /// `YYYY-MM-DD` or empty
    #[serde(default, deserialize_with = "lenient_string")]
    pub demo_date: String,

    /// `YYYY-MM-DD` or empty
    #[serde(default, deserialize_with = "lenient_string")]
    pub deployment_date: String,

    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_cost: f64,

    /// Derived: `percent_cost / 100 * budget`
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: f64,

    // Provenance of remote-derived rows. Not used by local logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Value>,

    /// Keys this model does not know about, carried through import/export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a blank row at position `no`.
    #[must_use]
    pub fn new(no: u32) -> Self {
        Self {
            id: generate_id(),
            no,
            page: "New Page".to_string(),
            child_page: String::new(),
            milestone: String::new(),
            description: String::new(),
            remarks: String::new(),
            demo_date: String::new(),
            deployment_date: String::new(),
            percent_cost: 0.0,
            amount: 0.0,
            milestone_id: None,
            client_id: None,
            client_name: None,
            project_id: None,
            extra: Map::new(),
        }
    }

    /// Recompute `amount` from `percent_cost` against `budget`.
    pub fn derive_amount(&mut self, budget: f64) {
        self.amount = amount_for(self.percent_cost, budget);
    }

    /// Read a field as a JSON value (used by the editor to seed its input).
    #[must_use]
    pub fn get(&self, field: Field) -> Value {
        match field {
            Field::Page => Value::String(self.page.clone()),
            Field::ChildPage => Value::String(self.child_page.clone()),
            Field::Milestone => Value::String(self.milestone.clone()),
            Field::Description => Value::String(self.description.clone()),
            Field::Remarks => Value::String(self.remarks.clone()),
            Field::DemoDate => Value::String(self.demo_date.clone()),
            Field::DeploymentDate => Value::String(self.deployment_date.clone()),
            Field::PercentCost => Value::from(self.percent_cost),
        }
    }
}

/// Amount for a cost percentage of `budget`.
#[must_use]
pub fn amount_for(percent_cost: f64, budget: f64) -> f64 {
    percent_cost / 100.0 * budget
}

/// Generate a unique row ID.
#[must_use]
pub fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("row_{millis}_{}", &suffix[..9])
}

/// Editable fields of a record.
///
/// `id`, `no` and `amount` are deliberately absent: they are assigned or
/// derived, never typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Page,
    ChildPage,
    Milestone,
    Description,
    Remarks,
    DemoDate,
    DeploymentDate,
    PercentCost,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Page,
        Field::ChildPage,
        Field::Milestone,
        Field::Description,
        Field::Remarks,
        Field::DemoDate,
        Field::DeploymentDate,
        Field::PercentCost,
    ];

    /// Wire name (camelCase, as serialized).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::ChildPage => "childPage",
            Self::Milestone => "milestone",
            Self::Description => "description",
            Self::Remarks => "remarks",
            Self::DemoDate => "demoDate",
            Self::DeploymentDate => "deploymentDate",
            Self::PercentCost => "percentCost",
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::PercentCost)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Field {
    type Err = crate::Error;

    /// Accepts the camelCase wire name, snake_case, or kebab-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "page" => Ok(Self::Page),
            "childpage" => Ok(Self::ChildPage),
            "milestone" => Ok(Self::Milestone),
            "description" => Ok(Self::Description),
            "remarks" => Ok(Self::Remarks),
            "demodate" => Ok(Self::DemoDate),
            "deploymentdate" => Ok(Self::DeploymentDate),
            "percentcost" => Ok(Self::PercentCost),
            "id" | "no" | "amount" => Err(crate::Error::ReadOnlyField {
                field: s.to_string(),
            }),
            _ => Err(crate::Error::UnknownField(s.to_string())),
        }
    }
}

// ── Lenient deserializers ────────────────────────────────────

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        // JSON cannot carry infinities back out.
        Value::String(s) => Some(parse_number(&s)).filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

pub(crate) fn lenient_position<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number(&s),
        _ => 0.0,
    };
    if value.is_finite() && value >= 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value.min(f64::from(u32::MAX)) as u32)
    } else {
        Ok(0)
    }
}

/// Parse the leading numeric part of `input`, yielding 0 when there is none.
///
/// `"12.5%"` parses as 12.5, `"abc"` as 0. A leading `Infinity` or a
/// literal too large for `f64` yields an infinity; callers clamp.
#[must_use]
pub fn parse_number(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if unsigned.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '+' | '-' if seen_exp && trimmed[..i].ends_with(['e', 'E']) => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    // Back off a dangling exponent or sign ("1e", "2e-").
    let mut candidate = &trimmed[..end];
    while !candidate.is_empty() {
        if let Ok(v) = candidate.parse::<f64>() {
            return v;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = Record::new(3);
        assert!(record.id.starts_with("row_"));
        assert_eq!(record.no, 3);
        assert_eq!(record.page, "New Page");
        assert!(record.milestone.is_empty());
        assert_eq!(record.percent_cost, 0.0);
        assert_eq!(record.amount, 0.0);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_amount() {
        let mut record = Record::new(1);
        record.percent_cost = 12.5;
        record.derive_amount(DEFAULT_BUDGET);
        assert_eq!(record.amount, 12_500.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut record = Record::new(1);
        record.child_page = "Settings".into();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["childPage"], "Settings");
        assert!(json.get("percentCost").is_some());
        assert!(json.get("clientId").is_none());
    }

    #[test]
    fn test_lenient_deserialize() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "id": 42,
            "no": "2",
            "page": null,
            "percentCost": "30",
            "amount": "n/a",
            "owner": "ops"
        }))
        .unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.no, 2);
        assert_eq!(record.page, "");
        assert_eq!(record.percent_cost, 30.0);
        assert_eq!(record.amount, 0.0);
        assert_eq!(record.extra["owner"], "ops");
    }

    #[test]
    fn test_unknown_keys_survive_reserialization() {
        let input = serde_json::json!({"id": "row_1", "no": 1, "owner": "ops"});
        let record: Record = serde_json::from_value(input).unwrap();
        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output["owner"], "ops");
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("percentCost".parse::<Field>().unwrap(), Field::PercentCost);
        assert_eq!("child_page".parse::<Field>().unwrap(), Field::ChildPage);
        assert_eq!("demo-date".parse::<Field>().unwrap(), Field::DemoDate);
        assert!(matches!(
            "amount".parse::<Field>(),
            Err(crate::Error::ReadOnlyField { .. })
        ));
        assert!(matches!(
            "colour".parse::<Field>(),
            Err(crate::Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  12.5%"), 12.5);
        assert_eq!(parse_number("-5"), -5.0);
        assert_eq!(parse_number("1e2"), 100.0);
        assert_eq!(parse_number("3e"), 3.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number(" -Infinity and beyond"), f64::NEG_INFINITY);
        assert_eq!(parse_number("1e400"), f64::INFINITY);
        assert_eq!(parse_number("infinity"), 0.0);
    }

    #[test]
    fn test_lenient_position_ignores_non_scalars() {
        for no in [serde_json::json!(true), serde_json::json!([1]), serde_json::json!({"n": 1})] {
            let record: Record =
                serde_json::from_value(serde_json::json!({"no": no, "page": "a"})).unwrap();
            assert_eq!(record.no, 0);
            assert_eq!(record.page, "a");
        }
    }

    #[test]
    fn test_lenient_number_drops_infinities() {
        let record: Record =
            serde_json::from_value(serde_json::json!({"percentCost": "1e400"})).unwrap();
        assert_eq!(record.percent_cost, 0.0);
    }
}
