//! SQLite storage layer for scopegrid.
//!
//! The collection is persisted as one JSON document under a single key, with:
//! - Whole-collection writes after every mutation
//! - Transaction discipline for atomic writes
//! - Audit events for history
//!
//! # Submodules
//!
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod events;
pub mod schema;
pub mod sqlite;

pub use events::{Event, EventType};
pub use sqlite::{MutationContext, SaveReason, SqliteStorage};
