//! Trip types stored and returned by the engine.

use crate::{TripId, TripLength};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A many-to-many collection joined to a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Association {
    Tags,
    Countries,
    Users,
}

/// A trip as supplied by a caller, before the store has seen it.
///
/// Carries neither an identifier nor a length: the store assigns the former
/// and the engine derives the latter from the dates. Both fields are ignored
/// if present in incoming JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    /// Unique, case-sensitive name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub price: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub users: BTreeSet<String>,
}

impl TripDraft {
    /// Create a draft with no location, price or associations.
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            location: None,
            price: 0,
            start_date,
            end_date,
            tags: BTreeSet::new(),
            countries: BTreeSet::new(),
            users: BTreeSet::new(),
        }
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.countries.insert(country.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.users.insert(user.into());
        self
    }

    /// Absolute number of whole days between start and end.
    pub fn length_in_days(&self) -> TripLength {
        self.end_date
            .signed_duration_since(self.start_date)
            .num_days()
            .abs()
    }

    /// Names in one of the joined collections.
    pub fn association(&self, association: Association) -> &BTreeSet<String> {
        match association {
            Association::Tags => &self.tags,
            Association::Countries => &self.countries,
            Association::Users => &self.users,
        }
    }

    pub fn association_mut(&mut self, association: Association) -> &mut BTreeSet<String> {
        match association {
            Association::Tags => &mut self.tags,
            Association::Countries => &mut self.countries,
            Association::Users => &mut self.users,
        }
    }
}

/// A persisted trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Store-assigned identifier
    pub id: TripId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub price: i64,
    /// Days between start and end, derived at write time
    pub length: TripLength,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub users: BTreeSet<String>,
}

impl Trip {
    /// Assemble a persisted trip from the parts a store holds.
    pub fn from_draft(id: TripId, length: TripLength, draft: TripDraft) -> Self {
        Self {
            id,
            name: draft.name,
            location: draft.location,
            price: draft.price,
            length,
            start_date: draft.start_date,
            end_date: draft.end_date,
            tags: draft.tags,
            countries: draft.countries,
            users: draft.users,
        }
    }

    /// The caller-editable part of this trip.
    pub fn to_draft(&self) -> TripDraft {
        TripDraft {
            name: self.name.clone(),
            location: self.location.clone(),
            price: self.price,
            start_date: self.start_date,
            end_date: self.end_date,
            tags: self.tags.clone(),
            countries: self.countries.clone(),
            users: self.users.clone(),
        }
    }

    pub fn association(&self, association: Association) -> &BTreeSet<String> {
        match association {
            Association::Tags => &self.tags,
            Association::Countries => &self.countries,
            Association::Users => &self.users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn length_is_absolute_day_difference() {
        let draft = TripDraft::new("Alps", date(2024, 1, 1), date(2024, 1, 10));
        assert_eq!(draft.length_in_days(), 9);

        let reversed = TripDraft::new("Alps", date(2024, 1, 10), date(2024, 1, 1));
        assert_eq!(reversed.length_in_days(), 9);

        let same_day = TripDraft::new("Alps", date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(same_day.length_in_days(), 0);
    }

    #[test]
    fn length_crosses_leap_day() {
        let draft = TripDraft::new("Leap", date(2024, 2, 28), date(2024, 3, 1));
        assert_eq!(draft.length_in_days(), 2);
    }

    #[test]
    fn draft_ignores_id_and_length() {
        let draft: TripDraft = serde_json::from_value(json!({
            "id": 42,
            "length": 1000,
            "name": "Fjords",
            "price": 900,
            "startDate": "2024-06-01",
            "endDate": "2024-06-15",
            "tags": ["boat", "cold"]
        }))
        .unwrap();

        assert_eq!(draft.name, "Fjords");
        assert_eq!(draft.price, 900);
        assert_eq!(draft.length_in_days(), 14);
        assert!(draft.tags.contains("boat"));
        assert!(draft.countries.is_empty());
    }

    #[test]
    fn trip_serializes_camel_case() {
        let draft = TripDraft::new("Fjords", date(2024, 6, 1), date(2024, 6, 15))
            .with_country("Norway");
        let trip = Trip::from_draft(3, draft.length_in_days(), draft);

        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["length"], 14);
        assert_eq!(value["startDate"], "2024-06-01");
        assert_eq!(value["countries"], json!(["Norway"]));
        assert!(value.get("location").is_none());
    }

    #[test]
    fn draft_roundtrips_through_trip() {
        let draft = TripDraft::new("Rome", date(2024, 4, 1), date(2024, 4, 5))
            .with_price(300)
            .with_location("Italy")
            .with_tag("city")
            .with_user("anna");
        let trip = Trip::from_draft(1, 4, draft.clone());

        assert_eq!(trip.to_draft(), draft);
        assert!(trip.association(Association::Users).contains("anna"));
    }
}
