//! Snapshot import.
//!
//! An import file is a JSON array of record objects. Anything else is a
//! format error and leaves the collection untouched. Within the array the
//! parse is lenient: missing fields default and loosely typed scalars are
//! coerced (see [`Record`]).

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::grid::normalize_imported;
use crate::model::Record;

/// Parse import text into normalized records.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the text is not JSON, the root is not
/// an array, or an element is not an object.
pub fn parse_import(raw: &str, budget: f64) -> Result<Vec<Record>> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidFormat(format!("could not parse file: {e}")))?;

    let Value::Array(items) = root else {
        return Err(Error::InvalidFormat(format!(
            "expected an array of records, found {}",
            kind(&root)
        )));
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(Error::InvalidFormat(format!(
                "element {} is {}, expected an object",
                idx + 1,
                kind(&item)
            )));
        }
        let record: Record = serde_json::from_value(item).map_err(|e| {
            Error::InvalidFormat(format!("element {}: {e}", idx + 1))
        })?;
        records.push(record);
    }

    let mismatched = records
        .iter()
        .filter(|r| (r.amount - r.percent_cost / 100.0 * budget).abs() > 0.005)
        .count();
    if mismatched > 0 {
        warn!(mismatched, "Imported amounts disagree with percentCost, re-deriving");
    }

    normalize_imported(&mut records, budget);
    Ok(records)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
