//! Grid session: the loaded collection bound to its storage.
//!
//! A [`GridSession`] is opened once per command. It loads the cached
//! collection (seeding it on first run), applies mutations, and persists the
//! full collection after each one. Remote refreshes go through
//! [`GridSession::begin_refresh`] / [`GridSession::apply_refresh`] so a stale
//! response can never overwrite a newer one.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::grid::collection::{Confirm, Grid, Outcome, normalize_imported};
use crate::grid::edit::edit_cell;
use crate::grid::seed::example_records;
use crate::model::{Field, Record, RemoteClient, flatten};
use crate::remote::HierarchySource;
use crate::storage::{EventType, SaveReason, SqliteStorage};

pub const RELOAD_PROMPT: &str =
    "Reload data from server? Any unsaved local changes will be overwritten.";

/// Where the in-memory collection came from when the session opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// A stored collection was found.
    Cache,
    /// Nothing was stored; example rows were written.
    Seeded,
    /// Nothing was stored and a remote source is configured.
    Empty,
}

/// Identifies one refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

/// Hands out refresh tokens; only the latest one may apply its result.
#[derive(Debug, Default)]
pub struct RefreshTracker {
    issued: u64,
}

impl RefreshTracker {
    pub fn begin(&mut self) -> RefreshToken {
        self.issued += 1;
        RefreshToken(self.issued)
    }

    #[must_use]
    pub fn is_current(&self, token: RefreshToken) -> bool {
        token.0 == self.issued
    }
}

/// What a refresh did to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The remote snapshot replaced the collection.
    Refreshed { count: usize },
    /// The fetch failed; cached rows were kept.
    KeptCache { reason: String },
    /// The fetch failed and there was nothing cached.
    StartedEmpty { reason: String },
    /// A newer refresh was started; this result was dropped.
    Superseded,
}

impl RefreshOutcome {
    /// User-facing notice for this outcome.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Refreshed { .. } => Some("Data loaded from server successfully!"),
            Self::KeptCache { .. } => Some("Using cached data. Server unavailable."),
            Self::StartedEmpty { .. } => {
                Some("Failed to load data. You can start adding rows manually.")
            }
            Self::Superseded => None,
        }
    }
}

pub struct GridSession {
    grid: Grid,
    storage: SqliteStorage,
    actor: String,
    origin: LoadOrigin,
    last_saved_at: Option<i64>,
    refresh: RefreshTracker,
    loading: bool,
}

impl GridSession {
    /// Load the stored collection, seeding it when nothing was stored.
    ///
    /// With `remote_configured` the first run starts empty (a fetch is
    /// expected to fill it); otherwise it starts with example rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored collection is corrupt or the seed write
    /// fails.
    pub fn open(
        storage: SqliteStorage,
        budget: f64,
        remote_configured: bool,
        actor: &str,
    ) -> Result<Self> {
        let stored = storage.load_collection()?;
        let last_saved_at = storage.last_saved_at()?;

        let (records, origin) = match stored {
            Some(records) => (records, LoadOrigin::Cache),
            None if remote_configured => (Vec::new(), LoadOrigin::Empty),
            None => (example_records(budget), LoadOrigin::Seeded),
        };

        let mut session = Self {
            grid: Grid::new(records, budget),
            storage,
            actor: actor.to_string(),
            origin,
            last_saved_at,
            refresh: RefreshTracker::default(),
            loading: false,
        };

        if origin != LoadOrigin::Cache {
            let detail = if origin == LoadOrigin::Seeded {
                "example rows"
            } else {
                "empty"
            };
            session.persist(SaveReason::new(EventType::CollectionSeeded).detail(detail))?;
            info!(rows = session.grid.len(), "Seeded new collection");
        }

        Ok(session)
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.grid.records()
    }

    #[must_use]
    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    #[must_use]
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Last save time in Unix milliseconds.
    #[must_use]
    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    /// Whether a remote fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn persist(&mut self, reason: SaveReason) -> Result<()> {
        let saved_at = self
            .storage
            .save_collection(self.grid.records(), reason, &self.actor)?;
        self.last_saved_at = Some(saved_at);
        Ok(())
    }

    /// Append a blank row and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn add(&mut self) -> Result<Record> {
        let record = self.grid.add().clone();
        self.persist(SaveReason::new(EventType::RecordAdded).record(&record.id))?;
        info!(id = %record.id, no = record.no, "Added record");
        Ok(record)
    }

    /// Edit one cell and persist.
    ///
    /// # Errors
    ///
    /// Returns a not-found or validation error, or a save error.
    pub fn set_field(&mut self, id: &str, field: Field, value: &str) -> Result<Record> {
        let record = edit_cell(&mut self.grid, id, field, value)?.clone();
        self.persist(
            SaveReason::new(EventType::RecordUpdated)
                .record(id)
                .detail(field.as_str()),
        )?;
        info!(id, field = field.as_str(), "Updated record");
        Ok(record)
    }

    /// Delete a row after confirmation and persist.
    ///
    /// # Errors
    ///
    /// Returns a not-found error, or a save error.
    pub fn delete(&mut self, id: &str, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let outcome = self.grid.delete(id, confirm)?;
        if outcome.is_applied() {
            self.persist(SaveReason::new(EventType::RecordDeleted).record(id))?;
            info!(id, "Deleted record");
        }
        Ok(outcome)
    }

    /// Replace the collection with imported rows after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn import(
        &mut self,
        mut records: Vec<Record>,
        source: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<Outcome> {
        normalize_imported(&mut records, self.grid.budget());
        let outcome = self.grid.import_replace(records, confirm);
        if outcome.is_applied() {
            self.persist(SaveReason::new(EventType::CollectionImported).detail(source))?;
            info!(rows = self.grid.len(), source, "Imported collection");
        }
        Ok(outcome)
    }

    /// Empty the collection after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn clear(&mut self, confirm: &mut dyn Confirm) -> Result<Outcome> {
        let outcome = self.grid.clear_all(confirm);
        if outcome.is_applied() {
            self.persist(SaveReason::new(EventType::CollectionCleared))?;
            info!("Cleared collection");
        }
        Ok(outcome)
    }

    /// Start a refresh; the returned token must be passed back with the result.
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.loading = true;
        self.refresh.begin()
    }

    /// Apply a fetched hierarchy if `token` is still the latest refresh.
    ///
    /// Fetch failures never propagate: the cache is kept, or the collection
    /// starts empty when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the fresh snapshot fails.
    pub fn apply_refresh(
        &mut self,
        token: RefreshToken,
        fetched: Result<Vec<RemoteClient>>,
    ) -> Result<RefreshOutcome> {
        if !self.refresh.is_current(token) {
            debug!(?token, "Dropping superseded refresh");
            return Ok(RefreshOutcome::Superseded);
        }
        self.loading = false;

        match fetched {
            Ok(clients) => {
                let records = flatten(clients, self.grid.budget());
                let count = records.len();
                self.grid.replace(records);
                self.persist(SaveReason::new(EventType::CollectionRefreshed))?;
                info!(rows = count, "Refreshed collection from remote");
                Ok(RefreshOutcome::Refreshed { count })
            }
            Err(err) => Ok(self.fall_back(&err)),
        }
    }

    fn fall_back(&mut self, err: &Error) -> RefreshOutcome {
        let reason = err.to_string();
        if self.grid.is_empty() {
            warn!(error = %reason, "Remote fetch failed with no cached data");
            self.grid.replace(Vec::new());
            RefreshOutcome::StartedEmpty { reason }
        } else {
            warn!(error = %reason, rows = self.grid.len(), "Remote fetch failed, keeping cached data");
            RefreshOutcome::KeptCache { reason }
        }
    }

    /// Fetch from `source` and apply the result.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the fresh snapshot fails.
    pub async fn refresh<S: HierarchySource>(&mut self, source: &S) -> Result<RefreshOutcome> {
        let token = self.begin_refresh();
        let fetched = source.fetch().await;
        self.apply_refresh(token, fetched)
    }

    /// User-triggered refresh, gated on confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the fresh snapshot fails.
    pub async fn reload<S: HierarchySource>(
        &mut self,
        source: &S,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<RefreshOutcome>> {
        if !confirm.confirm(RELOAD_PROMPT) {
            return Ok(None);
        }
        self.refresh(source).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_BUDGET, RemoteMilestone, RemoteProject};

    struct Fixed(Vec<RemoteClient>);

    impl HierarchySource for Fixed {
        async fn fetch(&self) -> Result<Vec<RemoteClient>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl HierarchySource for Failing {
        async fn fetch(&self) -> Result<Vec<RemoteClient>> {
            Err(Error::Remote("HTTP error! status: 500".into()))
        }
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn milestone(page: &str, percent: f64) -> RemoteMilestone {
        RemoteMilestone {
            page: page.to_string(),
            percent_of_cost: percent,
            ..RemoteMilestone::default()
        }
    }

    fn hierarchy() -> Vec<RemoteClient> {
        vec![RemoteClient {
            client_id: None,
            client_name: Some("Acme".into()),
            projects: vec![RemoteProject {
                project_id: None,
                milestones: vec![milestone("Home", 10.0), milestone("Cart", 30.0)],
            }],
        }]
    }

    fn open(remote: bool) -> GridSession {
        let storage = SqliteStorage::open_memory().unwrap();
        GridSession::open(storage, DEFAULT_BUDGET, remote, "tester").unwrap()
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn test_first_run_seeds_examples_without_remote() {
        let session = open(false);
        assert_eq!(session.origin(), LoadOrigin::Seeded);
        assert!(!session.records().is_empty());
        assert!(session.last_saved_at().is_some());
        assert!(session.storage().load_collection().unwrap().is_some());
    }

    #[test]
    fn test_first_run_starts_empty_with_remote() {
        let session = open(true);
        assert_eq!(session.origin(), LoadOrigin::Empty);
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_reopen_uses_cache() {
        let mut session = open(false);
        let added = session.add().unwrap();
        let storage = session.storage;

        let reopened = GridSession::open(storage, DEFAULT_BUDGET, false, "tester").unwrap();
        assert_eq!(reopened.origin(), LoadOrigin::Cache);
        assert!(reopened.grid().find(&added.id).is_some());
    }

    #[test]
    fn test_mutations_persist_and_audit() {
        let mut session = open(false);
        let record = session.add().unwrap();
        session
            .set_field(&record.id, Field::PercentCost, "40")
            .unwrap();
        session.delete(&record.id, &mut yes).unwrap();

        let stored = session.storage().load_collection().unwrap().unwrap();
        assert_eq!(stored, session.records());

        let events = session.storage().recent_events(None).unwrap();
        let types: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::RecordDeleted,
                EventType::RecordUpdated,
                EventType::RecordAdded,
                EventType::CollectionSeeded,
            ]
        );
    }

    #[test]
    fn test_import_normalizes_and_persists() {
        let mut session = open(false);
        let mut incoming = Record::new(0);
        incoming.percent_cost = 50.0;

        session.import(vec![incoming], "file.json", &mut yes).unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records()[0].no, 1);
        assert_eq!(session.records()[0].amount, 50_000.0);
    }

    #[test]
    fn test_refresh_replaces_collection() {
        let mut session = open(true);
        let outcome = block_on(session.refresh(&Fixed(hierarchy()))).unwrap();

        assert_eq!(outcome, RefreshOutcome::Refreshed { count: 2 });
        assert_eq!(session.records()[1].page, "Cart");
        assert_eq!(session.records()[1].amount, 30_000.0);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_failed_refresh_keeps_cache() {
        let mut session = open(false);
        let before = session.records().to_vec();

        let outcome = block_on(session.refresh(&Failing)).unwrap();
        assert!(matches!(outcome, RefreshOutcome::KeptCache { .. }));
        assert_eq!(session.records(), before.as_slice());
    }

    #[test]
    fn test_failed_refresh_without_cache_starts_empty() {
        let mut session = open(true);
        let outcome = block_on(session.refresh(&Failing)).unwrap();
        assert!(matches!(outcome, RefreshOutcome::StartedEmpty { .. }));
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_superseded_refresh_is_dropped() {
        let mut session = open(true);
        let stale = session.begin_refresh();
        let fresh = session.begin_refresh();

        let outcome = session.apply_refresh(fresh, Ok(hierarchy())).unwrap();
        assert_eq!(outcome, RefreshOutcome::Refreshed { count: 2 });

        let outcome = session.apply_refresh(stale, Ok(Vec::new())).unwrap();
        assert_eq!(outcome, RefreshOutcome::Superseded);
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn test_reload_declined() {
        let mut session = open(false);
        let before = session.records().to_vec();
        let mut decline = |_: &str| false;

        let outcome = block_on(session.reload(&Fixed(hierarchy()), &mut decline)).unwrap();
        assert!(outcome.is_none());
        assert_eq!(session.records(), before.as_slice());
    }
}
