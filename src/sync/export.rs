//! Snapshot export.
//!
//! The export is the whole collection as indented JSON, named after the day
//! it was taken: `project-scope-YYYY-MM-DD.json`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::Record;
use crate::sync::file::atomic_write;

/// File name for a snapshot taken on `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("project-scope-{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the collection as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn snapshot_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write a snapshot into `dir` and return the file path.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn export_to_dir(records: &[Record], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date));
    atomic_write(&path, &snapshot_json(records)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::import::parse_import;
    use tempfile::TempDir;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "project-scope-2025-03-07.json");
    }

    #[test]
    fn test_export_then_import_reproduces_collection() {
        let temp_dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();

        let mut first = Record::new(1);
        first.page = "Home".into();
        first.percent_cost = 20.0;
        first.derive_amount(100_000.0);
        first.extra.insert("owner".into(), serde_json::json!("ops"));
        let mut second = Record::new(2);
        second.remarks = "line one\nline two".into();
        let records = vec![first, second];

        let path = export_to_dir(&records, temp_dir.path(), date).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  {"));

        let imported = parse_import(&raw, 100_000.0).unwrap();
        assert_eq!(imported, records);
    }
}
