//! Translation of compiled trip queries into PostgreSQL.

use sqlx::{Postgres, QueryBuilder};
use trip_engine::{
    Association, Bound, Comparison, Predicate, RangeColumn, SortAttribute, SortOrder, TripQuery,
};

/// Columns of the `trips` table, aliased as `t`.
pub(crate) const TRIP_COLUMNS: &str =
    "t.id, t.name, t.location, t.price, t.length, t.start_date, t.end_date";

/// Table names backing one association.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AssociationTables {
    /// Link table between trips and the named entity
    pub link: &'static str,
    /// Table holding the named entities
    pub table: &'static str,
    /// Foreign key column in the link table
    pub key: &'static str,
}

impl AssociationTables {
    pub(crate) fn of(association: Association) -> Self {
        match association {
            Association::Tags => AssociationTables {
                link: "trip_tags",
                table: "tags",
                key: "tag_id",
            },
            Association::Countries => AssociationTables {
                link: "trip_countries",
                table: "countries",
                key: "country_id",
            },
            Association::Users => AssociationTables {
                link: "trip_users",
                table: "users",
                key: "user_id",
            },
        }
    }
}

/// Build the SELECT statement for a compiled query.
///
/// Every membership predicate gets its own pair of joins, so requiring
/// two tags means two independent joins against `trip_tags`.
pub(crate) fn select_trips(query: &TripQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    if query.distinct {
        builder.push("DISTINCT ");
    }
    builder.push(TRIP_COLUMNS);
    builder.push(" FROM trips t");

    for (index, predicate) in query.predicates.iter().enumerate() {
        let association = match predicate {
            Predicate::HasMember { association, .. }
            | Predicate::HasAnyMember { association, .. } => *association,
            _ => continue,
        };
        let tables = AssociationTables::of(association);
        builder.push(format!(
            " JOIN {link} l{index} ON l{index}.trip_id = t.id JOIN {table} a{index} ON a{index}.id = l{index}.{key}",
            link = tables.link,
            table = tables.table,
            key = tables.key,
        ));
    }

    let mut separator = " WHERE ";
    for (index, predicate) in query.predicates.iter().enumerate() {
        builder.push(separator);
        separator = " AND ";

        match predicate {
            Predicate::Range { comparison, bound } => {
                builder.push(range_column(bound.column()));
                builder.push(match comparison {
                    Comparison::AtLeast => " >= ",
                    Comparison::AtMost => " <= ",
                });
                match *bound {
                    Bound::Price(value) | Bound::Length(value) => {
                        builder.push_bind(value);
                    }
                    Bound::StartDate(value) | Bound::EndDate(value) => {
                        builder.push_bind(value);
                    }
                }
            }
            Predicate::NameContains(needle) => {
                builder.push("strpos(lower(t.name), ");
                builder.push_bind(needle.clone());
                builder.push(") <> 0");
            }
            Predicate::HasMember { name, .. } => {
                builder.push(format!("a{index}.name = "));
                builder.push_bind(name.clone());
            }
            Predicate::HasAnyMember { names, .. } => {
                builder.push("(");
                for (position, name) in names.iter().enumerate() {
                    if position > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(format!("a{index}.name = "));
                    builder.push_bind(name.clone());
                }
                builder.push(")");
            }
        }
    }

    for (position, key) in query.sort.iter().enumerate() {
        builder.push(if position == 0 { " ORDER BY " } else { ", " });
        builder.push(sort_column(key.attribute));
        builder.push(match key.order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
    }

    builder
}

fn range_column(column: RangeColumn) -> &'static str {
    match column {
        RangeColumn::Price => "t.price",
        RangeColumn::Length => "t.length",
        RangeColumn::StartDate => "t.start_date",
        RangeColumn::EndDate => "t.end_date",
    }
}

fn sort_column(attribute: SortAttribute) -> &'static str {
    match attribute {
        SortAttribute::Id => "t.id",
        SortAttribute::Name => "t.name",
        SortAttribute::Price => "t.price",
        SortAttribute::Length => "t.length",
        SortAttribute::StartDate => "t.start_date",
        SortAttribute::EndDate => "t.end_date",
    }
}
