//! PostgreSQL implementation of the trip store.

use std::collections::{BTreeSet, HashMap};

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use trip_engine::{Association, Trip, TripDraft, TripId, TripLength, TripQuery, TripStore};

use super::query::{select_trips, AssociationTables, TRIP_COLUMNS};

const ASSOCIATIONS: [Association; 3] = [
    Association::Tags,
    Association::Countries,
    Association::Users,
];

/// A trip row without its associations.
#[derive(Debug)]
struct TripRow {
    id: TripId,
    name: String,
    location: Option<String>,
    price: i64,
    length: TripLength,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
}

impl<'r> sqlx::FromRow<'r, PgRow> for TripRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TripRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            price: row.try_get("price")?,
            length: row.try_get("length")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        })
    }
}

/// Association names keyed by trip id.
type NamesById = HashMap<TripId, BTreeSet<String>>;

/// Trip store backed by a PostgreSQL pool.
///
/// Every write runs in its own transaction. `replace_all` spans one
/// transaction only when atomic replace is switched on.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    atomic_replace: bool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            atomic_replace: false,
        }
    }

    pub fn with_atomic_replace(mut self, atomic_replace: bool) -> Self {
        self.atomic_replace = atomic_replace;
        self
    }

    async fn hydrate_one(&self, row: Option<TripRow>) -> Result<Option<Trip>, sqlx::Error> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Attach tags, countries and users to bare rows, keeping row order.
    async fn hydrate(&self, rows: Vec<TripRow>) -> Result<Vec<Trip>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TripId> = rows.iter().map(|row| row.id).collect();
        let mut tags = self.association_names(Association::Tags, &ids).await?;
        let mut countries = self.association_names(Association::Countries, &ids).await?;
        let mut users = self.association_names(Association::Users, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| Trip {
                tags: tags.remove(&row.id).unwrap_or_default(),
                countries: countries.remove(&row.id).unwrap_or_default(),
                users: users.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                location: row.location,
                price: row.price,
                length: row.length,
                start_date: row.start_date,
                end_date: row.end_date,
            })
            .collect())
    }

    async fn association_names(
        &self,
        association: Association,
        ids: &[TripId],
    ) -> Result<NamesById, sqlx::Error> {
        let tables = AssociationTables::of(association);
        let sql = format!(
            "SELECT l.trip_id, a.name FROM {} l JOIN {} a ON a.id = l.{} WHERE l.trip_id = ANY($1)",
            tables.link, tables.table, tables.key
        );

        let pairs: Vec<(TripId, String)> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut names = NamesById::new();
        for (trip_id, name) in pairs {
            names.entry(trip_id).or_default().insert(name);
        }
        Ok(names)
    }
}

async fn insert_trip(
    conn: &mut PgConnection,
    draft: TripDraft,
    length: TripLength,
) -> Result<Trip, sqlx::Error> {
    let (id,): (TripId,) = sqlx::query_as(
        r#"
        INSERT INTO trips (name, location, price, length, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&draft.name)
    .bind(draft.location.as_deref())
    .bind(draft.price)
    .bind(length)
    .bind(draft.start_date)
    .bind(draft.end_date)
    .fetch_one(&mut *conn)
    .await?;

    link_associations(conn, id, &draft).await?;

    Ok(Trip::from_draft(id, length, draft))
}

async fn update_trip(
    conn: &mut PgConnection,
    id: TripId,
    draft: TripDraft,
    length: TripLength,
) -> Result<Option<Trip>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE trips
        SET name = $2, location = $3, price = $4, length = $5,
            start_date = $6, end_date = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&draft.name)
    .bind(draft.location.as_deref())
    .bind(draft.price)
    .bind(length)
    .bind(draft.start_date)
    .bind(draft.end_date)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    for association in ASSOCIATIONS {
        let tables = AssociationTables::of(association);
        let sql = format!("DELETE FROM {} WHERE trip_id = $1", tables.link);
        sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    }
    link_associations(conn, id, &draft).await?;

    Ok(Some(Trip::from_draft(id, length, draft)))
}

/// Create missing named entities and link them to the trip.
async fn link_associations(
    conn: &mut PgConnection,
    trip_id: TripId,
    draft: &TripDraft,
) -> Result<(), sqlx::Error> {
    for association in ASSOCIATIONS {
        let tables = AssociationTables::of(association);
        let upsert = format!(
            "INSERT INTO {} (name) VALUES ($1) ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING id",
            tables.table
        );
        let link = format!(
            "INSERT INTO {} (trip_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            tables.link, tables.key
        );

        for name in draft.association(association) {
            let (entity_id,): (i64,) = sqlx::query_as(&upsert)
                .bind(name)
                .fetch_one(&mut *conn)
                .await?;
            sqlx::query(&link)
                .bind(trip_id)
                .bind(entity_id)
                .execute(&mut *conn)
                .await?;
        }
    }
    Ok(())
}

impl TripStore for PgStore {
    type Error = sqlx::Error;

    async fn get(&self, id: TripId) -> Result<Option<Trip>, sqlx::Error> {
        let sql = format!("SELECT {TRIP_COLUMNS} FROM trips t WHERE t.id = $1");
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Trip>, sqlx::Error> {
        let sql = format!("SELECT {TRIP_COLUMNS} FROM trips t WHERE t.name = $1");
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate_one(row).await
    }

    async fn insert(&self, draft: TripDraft, length: TripLength) -> Result<Trip, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let trip = insert_trip(&mut tx, draft, length).await?;
        tx.commit().await?;

        tracing::debug!(id = trip.id, name = %trip.name, "inserted trip");
        Ok(trip)
    }

    async fn update(
        &self,
        id: TripId,
        draft: TripDraft,
        length: TripLength,
    ) -> Result<Option<Trip>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let trip = update_trip(&mut tx, id, draft, length).await?;
        tx.commit().await?;
        Ok(trip)
    }

    async fn delete(&self, id: TripId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn execute(&self, query: &TripQuery) -> Result<Vec<Trip>, sqlx::Error> {
        let mut builder = select_trips(query);
        let rows = builder
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn replace_all(
        &self,
        trips: Vec<(TripDraft, TripLength)>,
    ) -> Result<Vec<Trip>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(trips.len());

        if self.atomic_replace {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM trips").execute(&mut *tx).await?;
            for (draft, length) in trips {
                inserted.push(insert_trip(&mut tx, draft, length).await?);
            }
            tx.commit().await?;
        } else {
            self.delete_all().await?;
            for (draft, length) in trips {
                inserted.push(self.insert(draft, length).await?);
            }
        }

        tracing::debug!(
            count = inserted.len(),
            atomic = self.atomic_replace,
            "replaced all trips"
        );
        Ok(inserted)
    }
}
