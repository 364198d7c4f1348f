//! Per-cell edit-in-place controller.
//!
//! A cell is either displayed or being edited. Editing starts from the
//! record's current value, collects input, and commits on blur or on Enter
//! for single-line inputs. There is no cancel: Escape does nothing.

use serde_json::Value;

use crate::error::Result;
use crate::grid::collection::Grid;
use crate::model::{Field, Record};

/// The input control a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    Text,
    MultiLine,
    Date,
    Number { min: f64, max: f64, step: f64 },
}

impl InputKind {
    #[must_use]
    pub const fn for_field(field: Field) -> Self {
        match field {
            Field::Description | Field::Remarks => Self::MultiLine,
            Field::DemoDate | Field::DeploymentDate => Self::Date,
            Field::PercentCost => Self::Number {
                min: 0.0,
                max: 100.0,
                step: 1.0,
            },
            Field::Page | Field::ChildPage | Field::Milestone => Self::Text,
        }
    }

    #[must_use]
    pub const fn is_multiline(&self) -> bool {
        matches!(self, Self::MultiLine)
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

/// A value ready to be written back through [`Grid::update_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub record_id: String,
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellEditor {
    #[default]
    Display,
    Editing {
        record_id: String,
        field: Field,
        kind: InputKind,
        buffer: String,
    },
}

impl CellEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    /// Start editing `field` of `record`. Returns `false` if a cell is
    /// already being edited.
    pub fn activate(&mut self, record: &Record, field: Field) -> bool {
        if self.is_editing() {
            return false;
        }

        let buffer = match record.get(field) {
            Value::String(s) => s,
            Value::Number(n) => n.as_f64().map(|v| v.to_string()).unwrap_or_default(),
            other => other.to_string(),
        };
        *self = Self::Editing {
            record_id: record.id.clone(),
            field,
            kind: InputKind::for_field(field),
            buffer,
        };
        true
    }

    /// Replace the input contents.
    pub fn input(&mut self, text: &str) {
        if let Self::Editing { buffer, .. } = self {
            text.clone_into(buffer);
        }
    }

    /// Handle a key press. Enter commits single-line inputs and adds a line
    /// to multi-line ones.
    pub fn key(&mut self, key: Key) -> Option<Commit> {
        if key != Key::Enter {
            return None;
        }
        match self {
            Self::Editing { kind, buffer, .. } if kind.is_multiline() => {
                buffer.push('\n');
                None
            }
            _ => self.blur(),
        }
    }

    /// Focus left the input: commit and return to display.
    pub fn blur(&mut self) -> Option<Commit> {
        match std::mem::take(self) {
            Self::Editing {
                record_id,
                field,
                buffer,
                ..
            } => Some(Commit {
                record_id,
                field,
                value: buffer,
            }),
            Self::Display => None,
        }
    }
}

impl Commit {
    /// Write the committed value into the grid.
    ///
    /// # Errors
    ///
    /// Propagates [`Grid::update_field`] errors.
    pub fn apply<'g>(&self, grid: &'g mut Grid) -> Result<&'g Record> {
        grid.update_field(&self.record_id, self.field, &self.value)
    }
}

/// One full activate, type, commit cycle for a single cell.
///
/// # Errors
///
/// Returns a not-found error for an unknown id, or whatever the commit
/// raises.
pub fn edit_cell<'g>(
    grid: &'g mut Grid,
    id: &str,
    field: Field,
    value: &str,
) -> Result<&'g Record> {
    let mut editor = CellEditor::new();
    let record = grid.get(id)?.clone();

    editor.activate(&record, field);
    editor.input(value);
    match editor.blur() {
        Some(commit) => commit.apply(grid),
        None => grid.update_field(id, field, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_BUDGET;

    fn sample() -> Record {
        let mut record = Record::new(1);
        record.milestone = "Login".into();
        record.percent_cost = 20.0;
        record
    }

    #[test]
    fn test_input_kind_per_field() {
        assert_eq!(InputKind::for_field(Field::Remarks), InputKind::MultiLine);
        assert_eq!(InputKind::for_field(Field::Description), InputKind::MultiLine);
        assert_eq!(InputKind::for_field(Field::DemoDate), InputKind::Date);
        assert_eq!(InputKind::for_field(Field::Page), InputKind::Text);
        assert_eq!(
            InputKind::for_field(Field::PercentCost),
            InputKind::Number {
                min: 0.0,
                max: 100.0,
                step: 1.0
            }
        );
    }

    #[test]
    fn test_activate_seeds_buffer_and_blocks_second_activation() {
        let record = sample();
        let mut editor = CellEditor::new();

        assert!(editor.activate(&record, Field::Milestone));
        assert!(!editor.activate(&record, Field::Page));
        match &editor {
            CellEditor::Editing { field, buffer, .. } => {
                assert_eq!(*field, Field::Milestone);
                assert_eq!(buffer, "Login");
            }
            CellEditor::Display => panic!("expected editing"),
        }
    }

    #[test]
    fn test_number_buffer_starts_from_value() {
        let mut editor = CellEditor::new();
        editor.activate(&sample(), Field::PercentCost);
        let commit = editor.blur().unwrap();
        assert_eq!(commit.value, "20");
    }

    #[test]
    fn test_enter_commits_single_line() {
        let mut editor = CellEditor::new();
        editor.activate(&sample(), Field::Page);
        editor.input("Checkout");

        let commit = editor.key(Key::Enter).unwrap();
        assert_eq!(commit.value, "Checkout");
        assert_eq!(editor, CellEditor::Display);
    }

    #[test]
    fn test_enter_in_multiline_adds_newline() {
        let mut editor = CellEditor::new();
        editor.activate(&sample(), Field::Remarks);
        editor.input("first");

        assert!(editor.key(Key::Enter).is_none());
        editor.key(Key::Escape);
        assert!(editor.is_editing());

        let commit = editor.blur().unwrap();
        assert_eq!(commit.value, "first\n");
    }

    #[test]
    fn test_blur_when_displaying_is_noop() {
        let mut editor = CellEditor::new();
        assert!(editor.blur().is_none());
        assert!(editor.key(Key::Enter).is_none());
    }

    #[test]
    fn test_edit_cell_applies_through_grid() {
        let mut grid = Grid::new(vec![sample()], DEFAULT_BUDGET);
        let id = grid.records()[0].id.clone();

        let record = edit_cell(&mut grid, &id, Field::PercentCost, "150").unwrap();
        assert_eq!(record.percent_cost, 100.0);
        assert_eq!(record.amount, DEFAULT_BUDGET);

        assert!(edit_cell(&mut grid, "row_missing", Field::Page, "x").is_err());
    }
}
