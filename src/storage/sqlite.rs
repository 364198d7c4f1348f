//! SQLite storage implementation.
//!
//! The whole record collection is one JSON value under a single key. Every
//! save rewrites that value and appends audit events inside one transaction,
//! following the MutationContext pattern.

use crate::error::{Error, Result};
use crate::model::Record;
use crate::storage::events::{Event, EventType, insert_event, recent_events};
use crate::storage::schema::{COLLECTION_KEY, apply_schema};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, tracking side effects.
///
/// Passed to mutation closures so they can queue audit events that are
/// written at the end of the transaction.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    pub fn record_event(&mut self, event_type: EventType) -> &mut Event {
        self.events.push(Event::new(event_type, &self.actor));
        let last = self.events.len() - 1;
        &mut self.events[last]
    }
}

/// What a save changed, for the audit trail.
#[derive(Debug, Clone)]
pub struct SaveReason {
    pub event_type: EventType,
    pub record_id: Option<String>,
    pub detail: Option<String>,
}

impl SaveReason {
    #[must_use]
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            record_id: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn record(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database (and parent directories) and applies the schema
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.busy_timeout(BUSY_TIMEOUT)?;

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    // ======================
    // Key-value entries
    // ======================

    /// Read a raw value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// When the value under `key` was last written (Unix milliseconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let ts = self
            .conn
            .query_row("SELECT updated_at FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(ts)
    }

    // ======================
    // Record collection
    // ======================

    /// Load the persisted collection, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptCollection`] if the stored JSON does not parse
    /// as a list of records.
    pub fn load_collection(&self) -> Result<Option<Vec<Record>>> {
        let Some(raw) = self.get_value(COLLECTION_KEY)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::CorruptCollection {
                reason: e.to_string(),
            })
    }

    /// Persist the full collection, replacing whatever was stored.
    ///
    /// Returns the save timestamp (Unix milliseconds).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_collection(
        &mut self,
        records: &[Record],
        reason: SaveReason,
        actor: &str,
    ) -> Result<i64> {
        let payload = serde_json::to_string(records)?;
        let now = chrono::Utc::now().timestamp_millis();
        let count = records.len();

        self.mutate(reason.event_type.as_str(), actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![COLLECTION_KEY, payload, now],
            )?;

            let event = ctx.record_event(reason.event_type);
            event.record_id = reason.record_id;
            event.detail = reason.detail;
            event.record_count = count;
            event.created_at = now;
            Ok(())
        })?;

        Ok(now)
    }

    /// Last time the collection was saved (Unix milliseconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn last_saved_at(&self) -> Result<Option<i64>> {
        self.updated_at(COLLECTION_KEY)
    }

    /// Most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_events(&self, limit: Option<u32>) -> Result<Vec<Event>> {
        Ok(recent_events(&self.conn, limit)?)
    }
}
