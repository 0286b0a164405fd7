//! Bulk reconciliation of incoming trips against stored state.
//!
//! Three merge policies, each a single pass over the input in order:
//!
//! 1. **Append** ([`TripService::append_many`]): create each trip through the
//!    single-add path. Trips whose name already exists are reported as
//!    conflicts (the stored trip is reported); the others are inserted.
//!    Partial success is normal.
//! 2. **Replace** ([`TripService::replace_all`]): the input is checked
//!    against itself, first occurrence of a name wins. If any later trip
//!    repeats a name nothing is written and the repeats are reported.
//!    Otherwise the stored collection is swapped for the input through
//!    [`TripStore::replace_all`], which is only atomic if the store makes it
//!    so.
//! 3. **Upsert** ([`TripService::upsert_many`]): insert unknown names, update
//!    known ones in place keeping their id. No conflicts.

use crate::error::{Error, Result};
use crate::service::{CreateOutcome, TripService};
use crate::store::TripStore;
use crate::trip::{Trip, TripDraft};
use serde::Serialize;
use std::collections::HashSet;

/// Result of a bulk operation that can collide on names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport<C> {
    /// Trips written by the operation, with their ids
    pub inserted: Vec<Trip>,
    /// Entries that collided on name
    pub conflicts: Vec<C>,
}

impl<C> BulkReport<C> {
    fn new() -> Self {
        Self {
            inserted: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Split drafts into the first occurrence of each name and the repeats,
/// both in input order.
pub fn partition_by_name(drafts: Vec<TripDraft>) -> (Vec<TripDraft>, Vec<TripDraft>) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(drafts.len());
    let mut repeats = Vec::new();

    for draft in drafts {
        if seen.insert(draft.name.clone()) {
            unique.push(draft);
        } else {
            repeats.push(draft);
        }
    }

    (unique, repeats)
}

impl<S: TripStore> TripService<S> {
    /// Append trips, reporting the stored trips whose names collide.
    pub async fn append_many(&self, drafts: Vec<TripDraft>) -> Result<BulkReport<Trip>> {
        let total = drafts.len();
        let mut report = BulkReport::new();

        for draft in drafts {
            match self.create_one(draft).await? {
                CreateOutcome::Created(trip) => report.inserted.push(trip),
                CreateOutcome::Existing(trip) => report.conflicts.push(trip),
            }
        }

        tracing::info!(
            total,
            inserted = report.inserted.len(),
            conflicts = report.conflicts.len(),
            "appended trips"
        );
        Ok(report)
    }

    /// Replace every stored trip with `drafts`, unless the input repeats a
    /// name.
    ///
    /// Whether the swap is atomic is up to the store; see
    /// [`TripStore::replace_all`].
    pub async fn replace_all(&self, drafts: Vec<TripDraft>) -> Result<BulkReport<TripDraft>> {
        let (unique, repeats) = partition_by_name(drafts);

        let mut report = BulkReport::new();
        if !repeats.is_empty() {
            tracing::info!(
                conflicts = repeats.len(),
                "replace rejected, input repeats trip names"
            );
            report.conflicts = repeats;
            return Ok(report);
        }

        let trips = unique
            .into_iter()
            .map(|draft| {
                let length = draft.length_in_days();
                (draft, length)
            })
            .collect();
        report.inserted = self
            .store
            .replace_all(trips)
            .await
            .map_err(Error::store)?;

        tracing::info!(inserted = report.inserted.len(), "replaced all trips");
        Ok(report)
    }

    /// Insert or update each trip by name. Returns one stored trip per
    /// input, in input order.
    pub async fn upsert_many(&self, drafts: Vec<TripDraft>) -> Result<Vec<Trip>> {
        let mut results = Vec::with_capacity(drafts.len());
        let mut updated = 0usize;

        for draft in drafts {
            let existing = self
                .store
                .get_by_name(&draft.name)
                .await
                .map_err(Error::store)?;

            let trip = match existing {
                Some(original) => {
                    updated += 1;
                    self.rewrite(original.id, draft).await?
                }
                None => {
                    let length = draft.length_in_days();
                    self.store
                        .insert(draft, length)
                        .await
                        .map_err(Error::store)?
                }
            };
            results.push(trip);
        }

        tracing::info!(
            total = results.len(),
            updated,
            inserted = results.len() - updated,
            "upserted trips"
        );
        Ok(results)
    }
}
