//! # Listing Repository
//!
//! The persistent rental registry.
//!
//! ## Key Operations
//! - `create_listing`: administrator only, id = current listing count
//! - `get`: a listing with every booked date
//! - `total_rentals`: number of listings ever created
//!
//! Listings are append-only. No statement in this crate updates or deletes
//! a `listings` row.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use staybook_core::{
    build_listing, calendar, plan_listing, Amount, CalendarDate, LedgerEvent, Listing, ListingId,
    NewListing, Principal, RentalCreated,
};

use super::event;
use super::listing_key;
use crate::error::{DbError, DbResult};
use crate::pool::load_administrator;

/// Raw `listings` row.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    name: String,
    city: String,
    lat: String,
    long: String,
    uno_description: String,
    dos_description: String,
    img_url: String,
    max_guests: i64,
    price_per_day: i64,
    creator: String,
}

impl ListingRow {
    fn into_listing(self, booked_dates: BTreeSet<CalendarDate>) -> DbResult<Listing> {
        let id = u64::try_from(self.id).map_err(|_| DbError::out_of_range("listings.id"))?;
        let max_guests =
            u32::try_from(self.max_guests).map_err(|_| DbError::out_of_range("max_guests"))?;
        let price_per_day = u64::try_from(self.price_per_day)
            .map_err(|_| DbError::out_of_range("price_per_day"))?;

        Ok(Listing {
            id: ListingId::new(id),
            name: self.name,
            city: self.city,
            lat: self.lat,
            long: self.long,
            uno_description: self.uno_description,
            dos_description: self.dos_description,
            img_url: self.img_url,
            max_guests,
            price_per_day: Amount::new(price_per_day),
            creator: Principal::new(self.creator),
            booked_dates,
        })
    }
}

/// Loads a listing and its booked dates on an open connection or transaction.
pub(crate) async fn load(conn: &mut SqliteConnection, id: ListingId) -> DbResult<Option<Listing>> {
    let Some(key) = listing_key(id) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT id, name, city, lat, long, uno_description, dos_description,
               img_url, max_guests, price_per_day, creator
        FROM listings
        WHERE id = ?1
        "#,
    )
    .bind(key)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let dates: Vec<String> = sqlx::query_scalar("SELECT date FROM booked_dates WHERE listing_id = ?1")
        .bind(key)
        .fetch_all(&mut *conn)
        .await?;

    let booked_dates = dates
        .iter()
        .map(|date| calendar::validate(date))
        .collect::<Result<BTreeSet<_>, _>>()?;

    row.into_listing(booked_dates).map(Some)
}

/// Repository for the rental registry.
///
/// ## Usage
/// ```rust,ignore
/// let created = db.listings().create_listing(&admin, params).await?;
/// let listing = db.listings().get(created.id).await?;
/// let total = db.listings().total_rentals().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool, write_gate: Arc<Mutex<()>>) -> Self {
        ListingRepository { pool, write_gate }
    }

    /// Creates a listing and records its initial dates as booked.
    ///
    /// ## What This Does
    /// 1. Takes the write gate and opens a transaction
    /// 2. Checks the caller is the administrator, then the date set
    /// 3. Assigns `id = COUNT(*)`
    /// 4. Inserts the listing, its dates and a `RentalCreated` outbox row
    /// 5. Commits
    ///
    /// ## Errors
    /// - `NotInitialized` if no administrator is recorded
    /// - `Ledger(Unauthorized | InvalidDate | DuplicateDates | UnorderedDates)`
    /// - `OutOfRange` if `price_per_day` exceeds `i64::MAX`
    pub async fn create_listing(
        &self,
        caller: &Principal,
        params: NewListing,
    ) -> DbResult<RentalCreated> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let administrator = load_administrator(&mut tx)
            .await?
            .ok_or(DbError::NotInitialized)?;

        let dates = plan_listing(&administrator, caller, &params).map_err(|err| {
            debug!(caller = %caller, error = %err, "create_listing rejected");
            err
        })?;

        let price = i64::try_from(params.price_per_day.units())
            .map_err(|_| DbError::out_of_range("price_per_day"))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&mut *tx)
            .await?;
        let id = u64::try_from(count).map_err(|_| DbError::out_of_range("listings.id"))?;

        let (listing, event) = build_listing(ListingId::new(id), caller.clone(), params, dates);
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO listings (
                id, name, city, lat, long, uno_description, dos_description,
                img_url, max_guests, price_per_day, creator, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(count)
        .bind(&listing.name)
        .bind(&listing.city)
        .bind(&listing.lat)
        .bind(&listing.long)
        .bind(&listing.uno_description)
        .bind(&listing.dos_description)
        .bind(&listing.img_url)
        .bind(i64::from(listing.max_guests))
        .bind(price)
        .bind(listing.creator.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for date in &listing.booked_dates {
            sqlx::query(
                "INSERT INTO booked_dates (listing_id, date, booked_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(count)
            .bind(date.to_string())
            .bind(listing.creator.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        event::append(&mut tx, &LedgerEvent::from(event.clone())).await?;
        tx.commit().await?;

        info!(
            id = %listing.id,
            city = %listing.city,
            dates = listing.booked_dates.len(),
            "Listing created"
        );

        Ok(event)
    }

    /// Gets a listing by id, with every booked date.
    pub async fn get(&self, id: ListingId) -> DbResult<Option<Listing>> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn, id).await
    }

    /// Number of listings ever created. Ids `0..total` all exist.
    pub async fn total_rentals(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count).map_err(|_| DbError::out_of_range("listings.id"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use staybook_core::{canonicalize, ErrorKind};

    fn params(city: &str, dates: &[&str]) -> NewListing {
        NewListing {
            name: format!("{city} Property"),
            city: city.to_string(),
            lat: "35.6".to_string(),
            long: "139.7".to_string(),
            uno_description: "Quiet flat".to_string(),
            dos_description: "Near the station".to_string(),
            img_url: "https://img.example/1.png".to_string(),
            max_guests: 4,
            price_per_day: Amount::new(10),
            dates: canonicalize(dates.iter().copied()),
        }
    }

    async fn ledger() -> (Database, Principal) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = Principal::new("0xadmin");
        db.open_ledger(&admin).await.unwrap();
        (db, admin)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, admin) = ledger().await;
        let repo = db.listings();

        let created = repo
            .create_listing(&admin, params("Tokyo", &["2021-10-01", "2021-10-10"]))
            .await
            .unwrap();
        assert_eq!(created.id, ListingId::new(0));
        assert_eq!(created.creator, admin);

        let listing = repo.get(ListingId::new(0)).await.unwrap().unwrap();
        assert_eq!(listing.city, "Tokyo");
        assert_eq!(listing.price_per_day, Amount::new(10));
        assert!(listing.is_booked("2021-10-01"));
        assert!(listing.is_booked("2021-10-10"));
        assert!(!listing.is_booked("2021-10-02"));

        assert_eq!(repo.total_rentals().await.unwrap(), 1);
        assert!(repo.get(ListingId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_dense() {
        let (db, admin) = ledger().await;
        let repo = db.listings();

        for expected in 0..3u64 {
            let created = repo.create_listing(&admin, params("Tokyo", &[])).await.unwrap();
            assert_eq!(created.id, ListingId::new(expected));
        }
        repo.create_listing(&admin, params("Osaka", &[])).await.unwrap();

        assert_eq!(repo.total_rentals().await.unwrap(), 4);
        let last = repo.get(ListingId::new(3)).await.unwrap().unwrap();
        assert_eq!(last.city, "Osaka");
    }

    #[tokio::test]
    async fn test_unauthorized_writes_nothing() {
        let (db, _admin) = ledger().await;
        let repo = db.listings();

        let err = repo
            .create_listing(&Principal::new("0xguest"), params("Tokyo", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.ledger_kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(repo.total_rentals().await.unwrap(), 0);
        assert_eq!(db.events().count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_dates_write_nothing() {
        let (db, admin) = ledger().await;
        let repo = db.listings();

        let mut bad = params("Tokyo", &["2021-10-01"]);
        bad.dates.push("2021-02-29".to_string());
        let err = repo.create_listing(&admin, bad).await.unwrap_err();
        assert_eq!(err.ledger_kind(), Some(ErrorKind::InvalidDate));

        // 2022-03-01 hashes above 2022-02-28.
        let mut reversed = params("Tokyo", &[]);
        reversed.dates = vec!["2022-03-01".to_string(), "2022-02-28".to_string()];
        let err = repo.create_listing(&admin, reversed).await.unwrap_err();
        assert_eq!(err.ledger_kind(), Some(ErrorKind::UnorderedDates));

        assert_eq!(repo.total_rentals().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_requires_administrator() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .listings()
            .create_listing(&Principal::new("0xadmin"), params("Tokyo", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotInitialized));
    }

    #[tokio::test]
    async fn test_price_out_of_range() {
        let (db, admin) = ledger().await;
        let mut huge = params("Tokyo", &[]);
        huge.price_per_day = Amount::new(u64::MAX);

        let err = db.listings().create_listing(&admin, huge).await.unwrap_err();
        assert!(matches!(err, DbError::OutOfRange { .. }));
        assert_eq!(db.listings().total_rentals().await.unwrap(), 0);
    }
}
