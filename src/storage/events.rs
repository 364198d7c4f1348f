//! Audit event storage and retrieval.
//!
//! Every persisted mutation of the collection leaves one event row, which is
//! what `sg history` shows.

use rusqlite::{Connection, Result};
use serde::Serialize;

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CollectionSeeded,
    RecordAdded,
    RecordUpdated,
    RecordDeleted,
    CollectionImported,
    CollectionCleared,
    CollectionRefreshed,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CollectionSeeded => "collection_seeded",
            Self::RecordAdded => "record_added",
            Self::RecordUpdated => "record_updated",
            Self::RecordDeleted => "record_deleted",
            Self::CollectionImported => "collection_imported",
            Self::CollectionCleared => "collection_cleared",
            Self::CollectionRefreshed => "collection_refreshed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "collection_seeded" => Self::CollectionSeeded,
            "record_added" => Self::RecordAdded,
            "record_updated" => Self::RecordUpdated,
            "record_deleted" => Self::RecordDeleted,
            "collection_imported" => Self::CollectionImported,
            "collection_cleared" => Self::CollectionCleared,
            "collection_refreshed" => Self::CollectionRefreshed,
            _ => return None,
        })
    }
}

/// An audit event record.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub event_type: EventType,
    pub record_id: Option<String>,
    pub actor: String,
    pub detail: Option<String>,
    /// Collection size after the mutation.
    pub record_count: usize,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            event_type,
            record_id: None,
            actor: actor.to_string(),
            detail: None,
            record_count: 0,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach the record this event concerns.
    #[must_use]
    pub fn with_record(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }

    /// Add a free-form detail (e.g. `percentCost=40`).
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (event_type, record_id, actor, detail, record_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            event.event_type.as_str(),
            event.record_id,
            event.actor,
            event.detail,
            i64::try_from(event.record_count).unwrap_or(i64::MAX),
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent events, newest first.
///
/// Rows with an event type this build does not know are skipped.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn recent_events(conn: &Connection, limit: Option<u32>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(
        "SELECT id, event_type, record_id, actor, detail, record_count, created_at
         FROM events
         ORDER BY created_at DESC, id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        let kind: String = row.get(1)?;
        let count: i64 = row.get(5)?;
        let Some(event_type) = EventType::parse(&kind) else {
            return Ok(None);
        };
        Ok(Some(Event {
            id: row.get(0)?,
            event_type,
            record_id: row.get(2)?,
            actor: row.get(3)?,
            detail: row.get(4)?,
            record_count: usize::try_from(count).unwrap_or(0),
            created_at: row.get(6)?,
        }))
    })?;

    let mut events = Vec::new();
    for row in rows {
        if let Some(event) = row? {
            events.push(event);
        }
    }
    Ok(events)
}
