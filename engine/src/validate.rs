//! Criteria validation, run before compilation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `minPrice` must not be negative
//! 2. `maxPrice` must not be negative
//! 3. `minPrice` must not exceed `maxPrice`
//!
//! followed by the same three checks for length, and ordering checks for
//! the start and end date windows.

use crate::criteria::QueryCriteria;
use crate::error::{CriterionValue, Error, Result};

/// Reject criteria that cannot describe any sensible result set.
pub fn validate(criteria: &QueryCriteria) -> Result<()> {
    non_negative_range(
        ("minPrice", criteria.min_price),
        ("maxPrice", criteria.max_price),
    )?;
    non_negative_range(
        ("minLength", criteria.min_length),
        ("maxLength", criteria.max_length),
    )?;
    ordered(
        ("startAfter", criteria.start_after.map(CriterionValue::Date)),
        ("startBefore", criteria.start_before.map(CriterionValue::Date)),
    )?;
    ordered(
        ("endAfter", criteria.end_after.map(CriterionValue::Date)),
        ("endBefore", criteria.end_before.map(CriterionValue::Date)),
    )?;
    Ok(())
}

fn non_negative_range(
    (lower_field, lower): (&'static str, Option<i64>),
    (upper_field, upper): (&'static str, Option<i64>),
) -> Result<()> {
    non_negative(lower_field, lower)?;
    non_negative(upper_field, upper)?;
    ordered(
        (lower_field, lower.map(CriterionValue::Int)),
        (upper_field, upper.map(CriterionValue::Int)),
    )
}

fn non_negative(field: &'static str, value: Option<i64>) -> Result<()> {
    match value {
        Some(value) if value < 0 => Err(Error::InvalidCriterion {
            field,
            value: CriterionValue::Int(value),
        }),
        _ => Ok(()),
    }
}

fn ordered(
    (lower_field, lower): (&'static str, Option<CriterionValue>),
    (upper_field, upper): (&'static str, Option<CriterionValue>),
) -> Result<()> {
    let (Some(lower_value), Some(upper_value)) = (lower, upper) else {
        return Ok(());
    };

    let inverted = match (lower_value, upper_value) {
        (CriterionValue::Int(l), CriterionValue::Int(u)) => l > u,
        (CriterionValue::Date(l), CriterionValue::Date(u)) => l > u,
        _ => false,
    };

    if inverted {
        return Err(Error::InconsistentRange {
            lower_field,
            lower_value,
            upper_field,
            upper_value,
        });
    }
    Ok(())
}
