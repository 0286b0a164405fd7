//! Criteria-to-query compilation.
//!
//! [`compile`] turns a [`QueryCriteria`] into a [`TripQuery`]: a flat list of
//! typed predicates that must all hold, the sort keys to order by, and a flag
//! telling the executor whether joined rows must be deduplicated.
//!
//! # Predicate families
//!
//! Families are emitted in a fixed order (price, length, start date, end
//! date, name, countries, tags). An absent filter emits nothing.
//!
//! - Range bounds become one `>=` and/or one `<=` predicate per column.
//! - A name substring becomes a case-insensitive containment test.
//! - [`MembershipMode::Each`] emits one mandatory join-match per listed name.
//! - [`MembershipMode::Any`] emits a single OR over the listed names. With two
//!   or more names one trip can match on several joined rows, so the query is
//!   marked `distinct`.
//!
//! # Sorting
//!
//! The requested key is always followed by the name in the same direction,
//! unless the requested attribute is already unique per trip.

use crate::criteria::{MembershipFilter, MembershipMode, QueryCriteria, SortAttribute, SortOrder};
use crate::trip::{Association, Trip};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Column a range predicate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeColumn {
    Price,
    Length,
    StartDate,
    EndDate,
}

/// Direction of a range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `column >= bound`
    AtLeast,
    /// `column <= bound`
    AtMost,
}

/// Value a range predicate compares against, tagged with its column so a
/// date can never be compared with a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Price(i64),
    Length(i64),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
}

impl Bound {
    pub fn column(&self) -> RangeColumn {
        match self {
            Bound::Price(_) => RangeColumn::Price,
            Bound::Length(_) => RangeColumn::Length,
            Bound::StartDate(_) => RangeColumn::StartDate,
            Bound::EndDate(_) => RangeColumn::EndDate,
        }
    }

    fn compare_to(&self, trip: &Trip) -> Ordering {
        match self {
            Bound::Price(bound) => trip.price.cmp(bound),
            Bound::Length(bound) => trip.length.cmp(bound),
            Bound::StartDate(bound) => trip.start_date.cmp(bound),
            Bound::EndDate(bound) => trip.end_date.cmp(bound),
        }
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Range { comparison: Comparison, bound: Bound },
    /// Lowercased needle that must occur in the lowercased name
    NameContains(String),
    /// The trip must be joined to an entry with this name
    HasMember {
        association: Association,
        name: String,
    },
    /// The trip must be joined to an entry with one of these names
    HasAnyMember {
        association: Association,
        names: Vec<String>,
    },
}

impl Predicate {
    /// Evaluate the predicate against a trip held in memory.
    pub fn matches(&self, trip: &Trip) -> bool {
        match self {
            Predicate::Range { comparison, bound } => {
                let ordering = bound.compare_to(trip);
                match comparison {
                    Comparison::AtLeast => ordering != Ordering::Less,
                    Comparison::AtMost => ordering != Ordering::Greater,
                }
            }
            Predicate::NameContains(needle) => trip.name.to_lowercase().contains(needle.as_str()),
            Predicate::HasMember { association, name } => {
                trip.association(*association).contains(name)
            }
            Predicate::HasAnyMember { association, names } => {
                let members = trip.association(*association);
                names.iter().any(|name| members.contains(name))
            }
        }
    }
}

/// One key of an ORDER BY list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub attribute: SortAttribute,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(attribute: SortAttribute, order: SortOrder) -> Self {
        Self { attribute, order }
    }

    /// Compare two trips by this key alone.
    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        let ordering = match self.attribute {
            SortAttribute::Id => a.id.cmp(&b.id),
            SortAttribute::Name => a.name.cmp(&b.name),
            SortAttribute::Price => a.price.cmp(&b.price),
            SortAttribute::Length => a.length.cmp(&b.length),
            SortAttribute::StartDate => a.start_date.cmp(&b.start_date),
            SortAttribute::EndDate => a.end_date.cmp(&b.end_date),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A compiled, store-independent trip query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQuery {
    /// Conjunction of conditions; empty matches every trip
    pub predicates: Vec<Predicate>,
    /// ORDER BY keys, never empty
    pub sort: Vec<SortKey>,
    /// Whether joined rows may repeat a trip and must be collapsed
    pub distinct: bool,
}

impl TripQuery {
    /// A query with no filters, ordered by `attribute` then by name.
    pub fn sorted_all(attribute: SortAttribute, order: SortOrder) -> Self {
        Self {
            predicates: Vec::new(),
            sort: sort_keys(attribute, order),
            distinct: false,
        }
    }

    /// Whether a trip satisfies every predicate.
    pub fn matches(&self, trip: &Trip) -> bool {
        self.predicates.iter().all(|p| p.matches(trip))
    }

    /// Compare two trips by the full sort key list.
    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Execute the query over trips held in memory.
    pub fn run<'a, I>(&self, trips: I) -> Vec<Trip>
    where
        I: IntoIterator<Item = &'a Trip>,
    {
        let mut results: Vec<Trip> = trips
            .into_iter()
            .filter(|trip| self.matches(trip))
            .cloned()
            .collect();
        results.sort_by(|a, b| self.compare(a, b));
        if self.distinct {
            results.dedup_by_key(|trip| trip.id);
        }
        results
    }
}

impl Default for TripQuery {
    fn default() -> Self {
        Self::sorted_all(SortAttribute::Id, SortOrder::Asc)
    }
}

/// Compile criteria into a query. Does not validate; see [`crate::validate`].
pub fn compile(criteria: &QueryCriteria) -> TripQuery {
    let mut compiler = Compiler::default();

    compiler.range(
        criteria.min_price.map(Bound::Price),
        criteria.max_price.map(Bound::Price),
    );
    compiler.range(
        criteria.min_length.map(Bound::Length),
        criteria.max_length.map(Bound::Length),
    );
    compiler.range(
        criteria.start_after.map(Bound::StartDate),
        criteria.start_before.map(Bound::StartDate),
    );
    compiler.range(
        criteria.end_after.map(Bound::EndDate),
        criteria.end_before.map(Bound::EndDate),
    );
    compiler.substring(criteria.in_name.as_deref());
    compiler.membership(Association::Countries, criteria.countries.as_ref());
    compiler.membership(Association::Tags, criteria.tags.as_ref());

    let query = TripQuery {
        predicates: compiler.predicates,
        sort: sort_keys(criteria.sort_by, criteria.order),
        distinct: compiler.distinct,
    };

    tracing::debug!(
        predicates = query.predicates.len(),
        distinct = query.distinct,
        sort_by = ?criteria.sort_by,
        order = ?criteria.order,
        "compiled trip query"
    );

    query
}

fn sort_keys(attribute: SortAttribute, order: SortOrder) -> Vec<SortKey> {
    let mut keys = vec![SortKey::new(attribute, order)];
    if !attribute.is_total_ordering() {
        keys.push(SortKey::new(SortAttribute::Name, order));
    }
    keys
}

#[derive(Default)]
struct Compiler {
    predicates: Vec<Predicate>,
    distinct: bool,
}

impl Compiler {
    fn range(&mut self, lower: Option<Bound>, upper: Option<Bound>) {
        if let Some(bound) = lower {
            self.predicates.push(Predicate::Range {
                comparison: Comparison::AtLeast,
                bound,
            });
        }
        if let Some(bound) = upper {
            self.predicates.push(Predicate::Range {
                comparison: Comparison::AtMost,
                bound,
            });
        }
    }

    fn substring(&mut self, needle: Option<&str>) {
        if let Some(needle) = needle {
            self.predicates
                .push(Predicate::NameContains(needle.to_lowercase()));
        }
    }

    fn membership(&mut self, association: Association, filter: Option<&MembershipFilter>) {
        let Some(filter) = filter else {
            return;
        };

        match filter.mode {
            MembershipMode::Each => {
                for name in &filter.names {
                    self.predicates.push(Predicate::HasMember {
                        association,
                        name: name.clone(),
                    });
                }
            }
            MembershipMode::Any => match filter.names.as_slice() {
                [] => {}
                [name] => self.predicates.push(Predicate::HasMember {
                    association,
                    name: name.clone(),
                }),
                names => {
                    self.predicates.push(Predicate::HasAnyMember {
                        association,
                        names: names.to_vec(),
                    });
                    self.distinct = true;
                }
            },
        }
    }
}
