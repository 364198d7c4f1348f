//! The record collection and its mutating operations.
//!
//! [`Grid`] owns the ordered records and the budget amounts derive from.
//! Destructive operations go through a [`Confirm`] gate; declining leaves the
//! collection untouched.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Field, Record, generate_id, parse_number};
use crate::validate::find_similar_ids;

/// Interactive confirmation for destructive operations.
pub trait Confirm {
    /// Ask the user; `true` means go ahead.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this row?";
pub const IMPORT_PROMPT: &str = "This will replace all existing data. Continue?";
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all data? This cannot be undone!";

/// Result of a confirmation-gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Declined,
}

impl Outcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The in-memory record collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    records: Vec<Record>,
    budget: f64,
}

impl Grid {
    #[must_use]
    pub fn new(records: Vec<Record>, budget: f64) -> Self {
        Self { records, budget }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Look up a record, suggesting similar ids when it is missing.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn get(&self, id: &str) -> Result<&Record> {
        let idx = self.position(id)?;
        Ok(&self.records[idx])
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| self.not_found(id))
    }

    fn not_found(&self, id: &str) -> Error {
        let ids: Vec<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let similar = find_similar_ids(id, &ids, 3);
        if similar.is_empty() {
            Error::RecordNotFound { id: id.to_string() }
        } else {
            Error::RecordNotFoundSimilar {
                id: id.to_string(),
                similar,
            }
        }
    }

    /// Append a blank row at `no = len + 1`.
    pub fn add(&mut self) -> &Record {
        let no = u32::try_from(self.records.len() + 1).unwrap_or(u32::MAX);
        self.records.push(Record::new(no));
        let last = self.records.len() - 1;
        &self.records[last]
    }

    /// Write one field from raw input.
    ///
    /// `percentCost` parses leniently (unparseable input is 0), is clamped to
    /// [0, 100], and re-derives `amount`. Dates must be `YYYY-MM-DD` or empty.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id, or an invalid-argument
    /// error for a malformed date.
    pub fn update_field(&mut self, id: &str, field: Field, raw: &str) -> Result<&Record> {
        let idx = self.position(id)?;
        let budget = self.budget;
        let record = &mut self.records[idx];

        match field {
            Field::Page => record.page = raw.to_string(),
            Field::ChildPage => record.child_page = raw.to_string(),
            Field::Milestone => record.milestone = raw.to_string(),
            Field::Description => record.description = raw.to_string(),
            Field::Remarks => record.remarks = raw.to_string(),
            Field::DemoDate => record.demo_date = normalize_date(field, raw)?,
            Field::DeploymentDate => record.deployment_date = normalize_date(field, raw)?,
            Field::PercentCost => {
                record.percent_cost = parse_number(raw).clamp(0.0, 100.0);
                record.derive_amount(budget);
            }
        }

        Ok(&self.records[idx])
    }

    /// Remove a record and renumber the rest to `1..=N`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id (before asking).
    pub fn delete(&mut self, id: &str, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let idx = self.position(id)?;
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(Outcome::Declined);
        }

        self.records.remove(idx);
        self.renumber();
        Ok(Outcome::Applied)
    }

    /// Replace the whole collection with imported records.
    pub fn import_replace(&mut self, records: Vec<Record>, confirm: &mut dyn Confirm) -> Outcome {
        if !confirm.confirm(IMPORT_PROMPT) {
            return Outcome::Declined;
        }
        self.records = records;
        Outcome::Applied
    }

    /// Empty the collection.
    pub fn clear_all(&mut self, confirm: &mut dyn Confirm) -> Outcome {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Outcome::Declined;
        }
        self.records.clear();
        Outcome::Applied
    }

    /// Swap in a fresh snapshot (remote refresh). No confirmation.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    fn renumber(&mut self) {
        for (idx, record) in self.records.iter_mut().enumerate() {
            record.no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        }
    }
}

fn normalize_date(field: Field, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            Error::InvalidArgument(format!("{field} must be a YYYY-MM-DD date, got '{raw}'"))
        })
}

/// Make an imported batch satisfy the collection invariants.
///
/// Missing or repeated ids get fresh ones, a missing `no` becomes the row's
/// position, and `amount` is re-derived from `percentCost`.
pub fn normalize_imported(records: &mut [Record], budget: f64) {
    let mut seen = HashSet::new();

    for (idx, record) in records.iter_mut().enumerate() {
        if record.id.is_empty() || !seen.insert(record.id.clone()) {
            let fresh = generate_id();
            if !record.id.is_empty() {
                warn!(old = %record.id, new = %fresh, "Duplicate record id in import, reassigned");
            }
            record.id = fresh;
            seen.insert(record.id.clone());
        }
        if record.no == 0 {
            record.no = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        }
        record.derive_amount(budget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_BUDGET;

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    fn grid_with(n: usize) -> Grid {
        let mut grid = Grid::new(Vec::new(), DEFAULT_BUDGET);
        for _ in 0..n {
            grid.add();
        }
        grid
    }

    fn numbers(grid: &Grid) -> Vec<u32> {
        grid.records().iter().map(|r| r.no).collect()
    }

    #[test]
    fn test_add_appends_with_next_number() {
        let mut grid = grid_with(2);
        let added = grid.add().clone();
        assert_eq!(added.no, 3);
        assert_eq!(added.page, "New Page");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.records()[2].id, added.id);
    }

    #[test]
    fn test_delete_renumbers_contiguously() {
        let mut grid = grid_with(5);
        let ids: Vec<String> = grid.records().iter().map(|r| r.id.clone()).collect();

        grid.delete(&ids[1], &mut yes).unwrap();
        assert_eq!(numbers(&grid), vec![1, 2, 3, 4]);

        grid.add();
        grid.delete(&ids[0], &mut yes).unwrap();
        grid.delete(&ids[4], &mut yes).unwrap();
        assert_eq!(numbers(&grid), vec![1, 2, 3]);
        assert_eq!(grid.records()[0].id, ids[2]);
    }

    #[test]
    fn test_delete_declined_leaves_state() {
        let mut grid = grid_with(2);
        let before = grid.clone();
        let id = grid.records()[0].id.clone();

        assert_eq!(grid.delete(&id, &mut no).unwrap(), Outcome::Declined);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_delete_unknown_id_suggests_similar() {
        let mut grid = grid_with(1);
        let mut id = grid.records()[0].id.clone();
        id.pop();
        id.push('#');

        let err = grid.delete(&id, &mut yes).unwrap_err();
        assert!(matches!(err, Error::RecordNotFoundSimilar { .. }));

        let err = grid.delete("nothing-like-it", &mut yes).unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { .. }));
    }

    #[test]
    fn test_percent_cost_clamps_and_coerces() {
        let mut grid = grid_with(1);
        let id = grid.records()[0].id.clone();

        for (input, expected) in [
            ("150", 100.0),
            ("-5", 0.0),
            ("abc", 0.0),
            ("42.5", 42.5),
            ("Infinity", 100.0),
            ("1e400", 100.0),
            ("-Infinity", 0.0),
        ] {
            let record = grid.update_field(&id, Field::PercentCost, input).unwrap();
            assert_eq!(record.percent_cost, expected, "input {input}");
            assert_eq!(record.amount, expected / 100.0 * DEFAULT_BUDGET);
        }
    }

    #[test]
    fn test_update_text_and_dates() {
        let mut grid = grid_with(1);
        let id = grid.records()[0].id.clone();

        grid.update_field(&id, Field::Milestone, "Checkout flow").unwrap();
        grid.update_field(&id, Field::DemoDate, " 2025-02-03 ").unwrap();
        grid.update_field(&id, Field::DeploymentDate, "").unwrap();

        let record = grid.find(&id).unwrap();
        assert_eq!(record.milestone, "Checkout flow");
        assert_eq!(record.demo_date, "2025-02-03");
        assert_eq!(record.deployment_date, "");

        let err = grid.update_field(&id, Field::DemoDate, "03/02/2025").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_import_replace_and_decline() {
        let mut grid = grid_with(3);
        let incoming = vec![Record::new(1)];

        assert_eq!(grid.import_replace(incoming.clone(), &mut no), Outcome::Declined);
        assert_eq!(grid.len(), 3);

        assert_eq!(grid.import_replace(incoming.clone(), &mut yes), Outcome::Applied);
        assert_eq!(grid.records(), incoming.as_slice());
    }

    #[test]
    fn test_clear_all() {
        let mut grid = grid_with(3);
        assert_eq!(grid.clear_all(&mut no), Outcome::Declined);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.clear_all(&mut yes), Outcome::Applied);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_prompts_are_shown() {
        let mut grid = grid_with(1);
        let id = grid.records()[0].id.clone();
        let mut asked = Vec::new();
        let mut recorder = |prompt: &str| {
            asked.push(prompt.to_string());
            false
        };

        grid.delete(&id, &mut recorder).unwrap();
        grid.clear_all(&mut recorder);
        assert_eq!(asked, vec![DELETE_PROMPT.to_string(), CLEAR_PROMPT.to_string()]);
    }

    #[test]
    fn test_normalize_imported() {
        let mut a = Record::new(0);
        a.id = "dup".into();
        a.percent_cost = 10.0;
        a.amount = 1.0;
        let mut b = a.clone();
        b.no = 7;
        let mut c = Record::new(0);
        c.id = String::new();

        let mut records = vec![a, b, c];
        normalize_imported(&mut records, DEFAULT_BUDGET);

        assert_eq!(records[0].id, "dup");
        assert_ne!(records[1].id, "dup");
        assert!(!records[2].id.is_empty());
        assert_eq!(records[0].no, 1);
        assert_eq!(records[1].no, 7);
        assert_eq!(records[2].no, 3);
        assert_eq!(records[0].amount, 10_000.0);
    }
}
