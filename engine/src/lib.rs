//! # Trip Engine
//!
//! The core of the trips backend: turning caller criteria into queries, and
//! merging batches of incoming trips into stored state.
//!
//! The engine knows nothing about HTTP or SQL. It talks to persistence only
//! through the [`TripStore`] trait, which the caller injects into a
//! [`TripService`].
//!
//! ## Core Concepts
//!
//! ### Trips
//!
//! A [`Trip`] has a store-assigned id, a unique case-sensitive name, a price,
//! start and end dates, a length derived from those dates, and sets of tags,
//! countries and users. Callers submit a [`TripDraft`], which has neither id
//! nor length.
//!
//! ### Queries
//!
//! [`QueryCriteria`] is a bag of optional filters. [`validate`] rejects
//! nonsensical combinations, then [`compile`] produces a [`TripQuery`]: a
//! list of typed [`Predicate`]s, sort keys and a dedup flag that any store
//! can execute.
//!
//! ### Reconciliation
//!
//! Bulk writes come in three flavours, all on [`TripService`]:
//! - [`TripService::append_many`] - insert, reporting name collisions
//! - [`TripService::replace_all`] - swap the whole collection
//! - [`TripService::upsert_many`] - insert or update by name
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_engine::{MemoryStore, QueryCriteria, TripDraft, TripService};
//! use chrono::NaiveDate;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let service = TripService::new(MemoryStore::new());
//!
//! let draft = TripDraft::new(
//!     "Alps",
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//! )
//! .with_price(1200)
//! .with_tag("hiking");
//!
//! let created = service.create_one(draft).await.unwrap();
//! assert_eq!(created.trip().length, 9);
//!
//! let cheap = QueryCriteria::new().price_between(None, Some(1000));
//! assert!(service.query(&cheap).await.unwrap().is_empty());
//! # });
//! ```

pub mod criteria;
pub mod error;
pub mod query;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod trip;
pub mod validate;

// Re-export main types at crate root
pub use criteria::{MembershipFilter, MembershipMode, QueryCriteria, SortAttribute, SortOrder};
pub use error::{CriterionValue, Error, Result, TripKey};
pub use query::{compile, Bound, Comparison, Predicate, RangeColumn, SortKey, TripQuery};
pub use reconcile::{partition_by_name, BulkReport};
pub use service::{CreateOutcome, TripService};
pub use store::{MemoryStore, MemoryStoreError, TripStore};
pub use trip::{Association, Trip, TripDraft};
pub use validate::validate;

/// Type aliases for clarity
pub type TripId = i64;
pub type TripLength = i64;
