//! Trip service: the operations the front end calls.
//!
//! Every operation is a single sequential pass over its input. The only
//! shared mutable state is the injected store.

use crate::error::{Error, Result, TripKey};
use crate::query::{compile, TripQuery};
use crate::store::TripStore;
use crate::trip::{Association, Trip, TripDraft};
use crate::validate::validate;
use crate::{QueryCriteria, SortAttribute, SortOrder, TripId};
use serde::Serialize;

/// Outcome of creating a single trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "trip", rename_all = "camelCase")]
pub enum CreateOutcome {
    /// The trip was inserted and has an id.
    Created(Trip),
    /// A trip with the same name already exists; nothing was written.
    Existing(Trip),
}

impl CreateOutcome {
    pub fn trip(&self) -> &Trip {
        match self {
            CreateOutcome::Created(trip) | CreateOutcome::Existing(trip) => trip,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Trip operations over an injected store.
#[derive(Debug)]
pub struct TripService<S> {
    pub(crate) store: S,
}

impl<S: TripStore> TripService<S> {
    /// Create a service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate criteria and compile them into a query.
    pub fn compile_query(&self, criteria: &QueryCriteria) -> Result<TripQuery> {
        validate(criteria)?;
        Ok(compile(criteria))
    }

    /// Run a filtered, sorted query.
    pub async fn query(&self, criteria: &QueryCriteria) -> Result<Vec<Trip>> {
        let query = self.compile_query(criteria)?;
        self.store.execute(&query).await.map_err(Error::store)
    }

    /// Every trip, ordered by `attribute` with name as tiebreaker.
    pub async fn fetch_sorted_all(
        &self,
        attribute: SortAttribute,
        order: SortOrder,
    ) -> Result<Vec<Trip>> {
        let query = TripQuery::sorted_all(attribute, order);
        self.store.execute(&query).await.map_err(Error::store)
    }

    /// Every trip ordered by id.
    pub async fn fetch_all(&self) -> Result<Vec<Trip>> {
        self.store
            .execute(&TripQuery::default())
            .await
            .map_err(Error::store)
    }

    pub async fn fetch_one(&self, id: TripId) -> Result<Trip> {
        self.store
            .get(id)
            .await
            .map_err(Error::store)?
            .ok_or(Error::NotFound(TripKey::Id(id)))
    }

    pub async fn fetch_one_by_name(&self, name: &str) -> Result<Trip> {
        self.store
            .get_by_name(name)
            .await
            .map_err(Error::store)?
            .ok_or_else(|| Error::NotFound(TripKey::Name(name.to_string())))
    }

    pub async fn contains_id(&self, id: TripId) -> Result<bool> {
        Ok(self.store.get(id).await.map_err(Error::store)?.is_some())
    }

    pub async fn contains_name(&self, name: &str) -> Result<bool> {
        Ok(self
            .store
            .get_by_name(name)
            .await
            .map_err(Error::store)?
            .is_some())
    }

    /// Insert a trip unless its name is taken.
    ///
    /// On a name collision the existing trip is returned untouched. Otherwise
    /// the length is derived from the dates and the trip is inserted.
    pub async fn create_one(&self, draft: TripDraft) -> Result<CreateOutcome> {
        if let Some(existing) = self
            .store
            .get_by_name(&draft.name)
            .await
            .map_err(Error::store)?
        {
            tracing::debug!(name = %existing.name, id = existing.id, "trip name already taken");
            return Ok(CreateOutcome::Existing(existing));
        }

        let length = draft.length_in_days();
        let trip = self
            .store
            .insert(draft, length)
            .await
            .map_err(Error::store)?;
        tracing::debug!(name = %trip.name, id = trip.id, "trip created");
        Ok(CreateOutcome::Created(trip))
    }

    pub async fn remove_one(&self, id: TripId) -> Result<()> {
        if self.store.delete(id).await.map_err(Error::store)? {
            Ok(())
        } else {
            Err(Error::NotFound(TripKey::Id(id)))
        }
    }

    pub async fn remove_all(&self) -> Result<()> {
        let removed = self.store.delete_all().await.map_err(Error::store)?;
        tracing::info!(removed, "removed all trips");
        Ok(())
    }

    /// Associate a tag with a trip. Returns `false` if it already was.
    pub async fn add_tag(&self, id: TripId, name: &str) -> Result<bool> {
        self.associate(id, Association::Tags, name).await
    }

    /// Associate a country with a trip. Returns `false` if it already was.
    pub async fn add_country(&self, id: TripId, name: &str) -> Result<bool> {
        self.associate(id, Association::Countries, name).await
    }

    /// Detach a tag from a trip. Returns `false` if it was not attached.
    pub async fn remove_tag(&self, id: TripId, name: &str) -> Result<bool> {
        self.dissociate(id, Association::Tags, name).await
    }

    /// Detach a country from a trip. Returns `false` if it was not attached.
    pub async fn remove_country(&self, id: TripId, name: &str) -> Result<bool> {
        self.dissociate(id, Association::Countries, name).await
    }

    /// Names of the users booked on a trip.
    pub async fn users_of(&self, id: TripId) -> Result<Vec<String>> {
        let trip = self.fetch_one(id).await?;
        Ok(trip.users.into_iter().collect())
    }

    async fn associate(&self, id: TripId, association: Association, name: &str) -> Result<bool> {
        let trip = self.fetch_one(id).await?;
        let mut draft = trip.to_draft();
        if !draft.association_mut(association).insert(name.to_string()) {
            return Ok(false);
        }
        self.rewrite(id, draft).await?;
        Ok(true)
    }

    async fn dissociate(&self, id: TripId, association: Association, name: &str) -> Result<bool> {
        let trip = self.fetch_one(id).await?;
        let mut draft = trip.to_draft();
        if !draft.association_mut(association).remove(name) {
            return Ok(false);
        }
        self.rewrite(id, draft).await?;
        Ok(true)
    }

    /// Update a trip in place, re-deriving its length.
    pub(crate) async fn rewrite(&self, id: TripId, draft: TripDraft) -> Result<Trip> {
        let length = draft.length_in_days();
        self.store
            .update(id, draft, length)
            .await
            .map_err(Error::store)?
            .ok_or(Error::NotFound(TripKey::Id(id)))
    }
}
