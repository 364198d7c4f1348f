//! Database schema definitions.
//!
//! The grid persists as a single key-value entry, so the schema is small:
//! a `kv` table for the collection snapshot and an `events` table for the
//! audit trail of persisted mutations.

use rusqlite::{Connection, Result};

/// Current schema version, stored in `PRAGMA user_version`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Key under which the full record collection is stored.
pub const COLLECTION_KEY: &str = "gridData";

/// The complete SQL schema for the scopegrid database.
///
/// Timestamps are stored as INTEGER (Unix milliseconds).
pub const SCHEMA_SQL: &str = r"
-- Key-value entries; the collection lives under 'gridData'
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Audit trail: one row per persisted mutation
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type TEXT NOT NULL,
    record_id TEXT,
    actor TEXT NOT NULL,
    detail TEXT,
    record_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_events_record ON events(record_id);
";

/// Apply the schema to a connection.
///
/// Idempotent; safe to call on every open.
///
/// # Errors
///
/// Returns an error if the SQL fails to execute.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < CURRENT_SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    }
    Ok(())
}
