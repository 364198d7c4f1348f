//! Data models for scopegrid.
//!
//! This module contains the domain models:
//! - Record (one milestone row) and its editable fields
//! - The remote client/project/milestone hierarchy

pub mod hierarchy;
pub mod record;

pub use hierarchy::{RemoteClient, RemoteMilestone, RemoteProject, flatten};
pub use record::{DEFAULT_BUDGET, Field, Record, amount_for, generate_id, parse_number};
