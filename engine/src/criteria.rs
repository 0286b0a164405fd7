//! Caller-supplied filter and sort parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attribute a trip listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortAttribute {
    #[default]
    #[serde(alias = "ID")]
    Id,
    #[serde(alias = "NAME")]
    Name,
    #[serde(alias = "PRICE")]
    Price,
    #[serde(alias = "LENGTH")]
    Length,
    #[serde(alias = "START_DATE")]
    StartDate,
    #[serde(alias = "END_DATE")]
    EndDate,
}

impl SortAttribute {
    /// Whether the attribute is unique per trip, so sorting by it alone is
    /// already deterministic.
    pub fn is_total_ordering(self) -> bool {
        matches!(self, SortAttribute::Id | SortAttribute::Name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "ascending", alias = "ASCENDING")]
    Asc,
    #[serde(alias = "descending", alias = "DESCENDING")]
    Desc,
}

/// How the names listed in a membership filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MembershipMode {
    /// Every listed name must be associated with the trip.
    #[default]
    Each,
    /// At least one listed name must be associated with the trip.
    Any,
}

/// Filter on the names of a joined collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembershipFilter {
    pub names: Vec<String>,
    pub mode: MembershipMode,
}

impl MembershipFilter {
    pub fn each<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            mode: MembershipMode::Each,
        }
    }

    pub fn any<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            mode: MembershipMode::Any,
        }
    }
}

/// Optional filters plus a sort key for a trip query.
///
/// Every absent filter means "no constraint". Built once per request and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryCriteria {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub start_after: Option<NaiveDate>,
    pub start_before: Option<NaiveDate>,
    pub end_after: Option<NaiveDate>,
    pub end_before: Option<NaiveDate>,
    /// Case-insensitive substring of the trip name
    pub in_name: Option<String>,
    pub tags: Option<MembershipFilter>,
    pub countries: Option<MembershipFilter>,
    pub sort_by: SortAttribute,
    pub order: SortOrder,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_between(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn length_between(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn starting_between(mut self, after: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        self.start_after = after;
        self.start_before = before;
        self
    }

    pub fn ending_between(mut self, after: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        self.end_after = after;
        self.end_before = before;
        self
    }

    pub fn name_containing(mut self, needle: impl Into<String>) -> Self {
        self.in_name = Some(needle.into());
        self
    }

    pub fn with_tags(mut self, filter: MembershipFilter) -> Self {
        self.tags = Some(filter);
        self
    }

    pub fn with_countries(mut self, filter: MembershipFilter) -> Self {
        self.countries = Some(filter);
        self
    }

    pub fn sorted(mut self, sort_by: SortAttribute, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sort_by_id_ascending() {
        let criteria = QueryCriteria::new();
        assert_eq!(criteria.sort_by, SortAttribute::Id);
        assert_eq!(criteria.order, SortOrder::Asc);
        assert!(criteria.tags.is_none());
    }

    #[test]
    fn total_orderings() {
        assert!(SortAttribute::Id.is_total_ordering());
        assert!(SortAttribute::Name.is_total_ordering());
        assert!(!SortAttribute::Price.is_total_ordering());
        assert!(!SortAttribute::Length.is_total_ordering());
        assert!(!SortAttribute::StartDate.is_total_ordering());
        assert!(!SortAttribute::EndDate.is_total_ordering());
    }

    #[test]
    fn sort_wire_names() {
        let attr: SortAttribute = serde_json::from_str("\"startDate\"").unwrap();
        assert_eq!(attr, SortAttribute::StartDate);

        let order: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, SortOrder::Desc);

        let order: SortOrder = serde_json::from_str("\"ASCENDING\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
    }

    #[test]
    fn sort_attribute_upper_case_names() {
        let attr: SortAttribute = serde_json::from_str("\"PRICE\"").unwrap();
        assert_eq!(attr, SortAttribute::Price);

        let attr: SortAttribute = serde_json::from_str("\"END_DATE\"").unwrap();
        assert_eq!(attr, SortAttribute::EndDate);
    }

    #[test]
    fn membership_constructors() {
        let filter = MembershipFilter::any(["beach", "city"]);
        assert_eq!(filter.mode, MembershipMode::Any);
        assert_eq!(filter.names, vec!["beach".to_string(), "city".to_string()]);

        assert_eq!(MembershipFilter::default().mode, MembershipMode::Each);
    }
}
