//! Command implementations.

pub mod clear;
pub mod common;
pub mod completions;
pub mod history;
pub mod list;
pub mod prompt;
pub mod record;
pub mod reload;
pub mod status;
pub mod transfer;
pub mod version;
