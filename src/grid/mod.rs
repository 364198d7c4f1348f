//! The grid: collection operations, editing, querying and display.

pub mod collection;
pub mod edit;
pub mod loader;
pub mod render;
pub mod seed;
pub mod view;

pub use collection::{Confirm, Grid, Outcome, normalize_imported};
pub use edit::{CellEditor, Commit, InputKind, Key, edit_cell};
pub use loader::{GridSession, LoadOrigin, RefreshOutcome, RefreshToken, RefreshTracker};
pub use render::{RowView, SummaryView, ViewModel, format_number, render};
pub use view::{
    Column, SortDirection, Status, Summary, ViewState, compute_summary, compute_visible, status,
};
