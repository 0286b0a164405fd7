//! Error types for the trip engine.

use crate::TripId;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// How a trip was looked up when it could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripKey {
    Id(TripId),
    Name(String),
}

impl fmt::Display for TripKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripKey::Id(id) => write!(f, "id {}", id),
            TripKey::Name(name) => write!(f, "name '{}'", name),
        }
    }
}

/// A filter value quoted back in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionValue {
    Int(i64),
    Date(NaiveDate),
}

impl fmt::Display for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionValue::Int(value) => write!(f, "{}", value),
            CriterionValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// All possible errors from the trip engine.
#[derive(Debug, Error)]
pub enum Error {
    // Lookup errors
    #[error("trip not found: {0}")]
    NotFound(TripKey),

    // Criteria errors
    #[error("invalid value {value} for criterion '{field}'")]
    InvalidCriterion {
        field: &'static str,
        value: CriterionValue,
    },

    #[error(
        "inconsistent range: {lower_field}={lower_value} is greater than {upper_field}={upper_value}"
    )]
    InconsistentRange {
        lower_field: &'static str,
        lower_value: CriterionValue,
        upper_field: &'static str,
        upper_value: CriterionValue,
    },

    // Store failures are passed through untouched
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap an opaque store failure.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Store(Box::new(err))
    }

    /// Whether this error was caused by the caller's criteria.
    pub fn is_criteria_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCriterion { .. } | Error::InconsistentRange { .. }
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
