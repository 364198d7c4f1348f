//! JSON snapshot import and export.
//!
//! - **Export**: the collection → `project-scope-YYYY-MM-DD.json` (or stdout)
//! - **Import**: a JSON array of records → a normalized collection that
//!   replaces the current one after confirmation

mod export;
mod file;
mod import;

pub use export::{export_file_name, export_to_dir, snapshot_json};
pub use file::atomic_write;
pub use import::parse_import;
