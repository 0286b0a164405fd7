//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trip_engine::{MembershipFilter, MembershipMode, QueryCriteria, SortAttribute, SortOrder};

/// Query string of `GET /trips`.
///
/// `tag` and `country` take comma-separated names (`?tag=ski,food`). Each
/// key may appear once; `?tag=ski&tag=food` is rejected as a duplicate field.
/// By default every listed name is required; `tagAny` / `countryAny` relax
/// that to "at least one".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub start_after: Option<NaiveDate>,
    pub start_before: Option<NaiveDate>,
    pub end_after: Option<NaiveDate>,
    pub end_before: Option<NaiveDate>,

    /// Case-insensitive name substring
    pub in_name: Option<String>,

    pub tag: Option<String>,
    #[serde(default)]
    pub tag_any: bool,

    pub country: Option<String>,
    #[serde(default)]
    pub country_any: bool,

    #[serde(default)]
    pub sort_by: SortAttribute,
    #[serde(default)]
    pub order: SortOrder,
}

impl ListParams {
    pub fn into_criteria(self) -> QueryCriteria {
        QueryCriteria {
            min_price: self.min_price,
            max_price: self.max_price,
            min_length: self.min_length,
            max_length: self.max_length,
            start_after: self.start_after,
            start_before: self.start_before,
            end_after: self.end_after,
            end_before: self.end_before,
            in_name: self.in_name,
            tags: membership(self.tag, self.tag_any),
            countries: membership(self.country, self.country_any),
            sort_by: self.sort_by,
            order: self.order,
        }
    }
}

fn membership(list: Option<String>, any: bool) -> Option<MembershipFilter> {
    let names: Vec<String> = list?
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        return None;
    }

    Some(MembershipFilter {
        names,
        mode: if any {
            MembershipMode::Any
        } else {
            MembershipMode::Each
        },
    })
}

/// Query string of `GET /trips/sort`.
#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    #[serde(default)]
    pub by: SortAttribute,
    #[serde(default)]
    pub order: SortOrder,
}

/// Body naming a tag or country to attach.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Whether an association edit changed anything.
#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

/// Users of one trip.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}
