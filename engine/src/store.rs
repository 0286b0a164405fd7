//! Store abstraction and the in-memory implementation.
//!
//! The engine never talks to a database directly. It consumes a
//! [`TripStore`]: point lookups by id and by name, insert, update, delete,
//! delete-all and execution of a compiled [`TripQuery`]. Each call is
//! expected to be individually atomic; nothing more is assumed.

use crate::{Trip, TripDraft, TripId, TripLength, TripQuery};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Persistence backend for trips.
///
/// Methods return `Send` futures so callers generic over the store can be
/// driven from a multi-threaded runtime.
pub trait TripStore: Send + Sync {
    /// Backend failure, passed through the engine untouched.
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, id: TripId) -> impl Future<Output = Result<Option<Trip>, Self::Error>> + Send;

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Trip>, Self::Error>> + Send;

    /// Insert a new trip and return it with its assigned id.
    fn insert(
        &self,
        draft: TripDraft,
        length: TripLength,
    ) -> impl Future<Output = Result<Trip, Self::Error>> + Send;

    /// Overwrite an existing trip. Returns `None` if `id` is unknown.
    fn update(
        &self,
        id: TripId,
        draft: TripDraft,
        length: TripLength,
    ) -> impl Future<Output = Result<Option<Trip>, Self::Error>> + Send;

    /// Delete one trip. Returns whether it existed.
    fn delete(&self, id: TripId) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Delete every trip. Returns how many were removed.
    fn delete_all(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Run a compiled query: filter, deduplicate if flagged, then sort.
    fn execute(
        &self,
        query: &TripQuery,
    ) -> impl Future<Output = Result<Vec<Trip>, Self::Error>> + Send;

    /// Swap the whole collection for `trips`.
    ///
    /// The default implementation deletes everything and then inserts one
    /// trip at a time. It is **not atomic**: if an insert fails, or the
    /// process dies midway, the old trips are gone and only some of the new
    /// ones are stored. Backends with transactions can override this.
    fn replace_all(
        &self,
        trips: Vec<(TripDraft, TripLength)>,
    ) -> impl Future<Output = Result<Vec<Trip>, Self::Error>> + Send {
        async move {
            self.delete_all().await?;
            let mut inserted = Vec::with_capacity(trips.len());
            for (draft, length) in trips {
                inserted.push(self.insert(draft, length).await?);
            }
            Ok(inserted)
        }
    }
}

/// Errors from [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    #[error("a trip named '{0}' already exists")]
    DuplicateName(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    trips: BTreeMap<TripId, Trip>,
    last_id: TripId,
}

impl MemoryState {
    fn name_taken(&self, name: &str, except: Option<TripId>) -> bool {
        self.trips
            .values()
            .any(|trip| trip.name == name && Some(trip.id) != except)
    }

    fn insert(&mut self, draft: TripDraft, length: TripLength) -> Result<Trip, MemoryStoreError> {
        if self.name_taken(&draft.name, None) {
            return Err(MemoryStoreError::DuplicateName(draft.name));
        }
        self.last_id += 1;
        let trip = Trip::from_draft(self.last_id, length, draft);
        self.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }
}

/// A [`TripStore`] held in process memory.
///
/// Ids are assigned from a counter that is never reset, so ids of deleted
/// trips are not reused. Every call takes the lock once, which makes
/// [`TripStore::replace_all`] atomic here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored trips.
    pub fn len(&self) -> usize {
        self.read().trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored trips ordered by id.
    pub fn snapshot(&self) -> Vec<Trip> {
        self.read().trips.values().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TripStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn get(&self, id: TripId) -> Result<Option<Trip>, Self::Error> {
        Ok(self.read().trips.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Trip>, Self::Error> {
        Ok(self
            .read()
            .trips
            .values()
            .find(|trip| trip.name == name)
            .cloned())
    }

    async fn insert(&self, draft: TripDraft, length: TripLength) -> Result<Trip, Self::Error> {
        self.write().insert(draft, length)
    }

    async fn update(
        &self,
        id: TripId,
        draft: TripDraft,
        length: TripLength,
    ) -> Result<Option<Trip>, Self::Error> {
        let mut state = self.write();
        if !state.trips.contains_key(&id) {
            return Ok(None);
        }
        if state.name_taken(&draft.name, Some(id)) {
            return Err(MemoryStoreError::DuplicateName(draft.name));
        }
        let trip = Trip::from_draft(id, length, draft);
        state.trips.insert(id, trip.clone());
        Ok(Some(trip))
    }

    async fn delete(&self, id: TripId) -> Result<bool, Self::Error> {
        Ok(self.write().trips.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, Self::Error> {
        let mut state = self.write();
        let removed = state.trips.len() as u64;
        state.trips.clear();
        Ok(removed)
    }

    async fn execute(&self, query: &TripQuery) -> Result<Vec<Trip>, Self::Error> {
        Ok(query.run(self.read().trips.values()))
    }

    async fn replace_all(
        &self,
        trips: Vec<(TripDraft, TripLength)>,
    ) -> Result<Vec<Trip>, Self::Error> {
        let mut state = self.write();

        let mut staged = MemoryState {
            trips: BTreeMap::new(),
            last_id: state.last_id,
        };
        let mut inserted = Vec::with_capacity(trips.len());
        for (draft, length) in trips {
            inserted.push(staged.insert(draft, length)?);
        }

        *state = staged;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, QueryCriteria, SortAttribute, SortOrder};
    use chrono::NaiveDate;

    fn draft(name: &str, price: i64) -> TripDraft {
        TripDraft::new(
            name,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
        )
        .with_price(price)
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();

        let a = store.insert(draft("A", 1), 3).await.unwrap();
        let b = store.insert(draft("B", 1), 3).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A", 1), 3).await.unwrap();

        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());

        let b = store.insert(draft("B", 1), 3).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let store = MemoryStore::new();
        store.insert(draft("A", 1), 3).await.unwrap();

        let err = store.insert(draft("A", 2), 3).await.unwrap_err();
        assert_eq!(err, MemoryStoreError::DuplicateName("A".into()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn lookups() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A", 1), 3).await.unwrap();

        assert_eq!(store.get(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(store.get_by_name("A").await.unwrap(), Some(a));
        assert_eq!(store.get_by_name("a").await.unwrap(), None);
        assert_eq!(store.get(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A", 1), 3).await.unwrap();

        let updated = store
            .update(a.id, draft("A", 50), 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.price, 50);

        assert_eq!(store.update(42, draft("Z", 1), 3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_cannot_steal_a_name() {
        let store = MemoryStore::new();
        store.insert(draft("A", 1), 3).await.unwrap();
        let b = store.insert(draft("B", 1), 3).await.unwrap();

        let err = store.update(b.id, draft("A", 1), 3).await.unwrap_err();
        assert_eq!(err, MemoryStoreError::DuplicateName("A".into()));
    }

    #[tokio::test]
    async fn execute_filters_and_sorts() {
        let store = MemoryStore::new();
        store.insert(draft("C", 30), 3).await.unwrap();
        store.insert(draft("A", 10), 3).await.unwrap();
        store.insert(draft("B", 20), 3).await.unwrap();

        let criteria = QueryCriteria::new()
            .price_between(Some(15), None)
            .sorted(SortAttribute::Price, SortOrder::Desc);
        let names: Vec<_> = store
            .execute(&compile(&criteria))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["C", "B"]);
    }

    #[tokio::test]
    async fn replace_all_swaps_contents() {
        let store = MemoryStore::new();
        store.insert(draft("Old", 1), 3).await.unwrap();

        let inserted = store
            .replace_all(vec![(draft("X", 1), 3), (draft("Y", 2), 3)])
            .await
            .unwrap();

        assert_eq!(inserted.len(), 2);
        let names: Vec<_> = store.snapshot().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert_eq!(inserted[0].id, 2);
    }

    #[tokio::test]
    async fn failed_replace_all_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.insert(draft("Old", 1), 3).await.unwrap();

        let result = store
            .replace_all(vec![(draft("X", 1), 3), (draft("X", 2), 3)])
            .await;

        assert!(result.is_err());
        let names: Vec<_> = store.snapshot().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Old"]);
    }

    #[tokio::test]
    async fn delete_all_counts() {
        let store = MemoryStore::new();
        store.insert(draft("A", 1), 3).await.unwrap();
        store.insert(draft("B", 1), 3).await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.is_empty());
    }
}
