//! # Booking Repository
//!
//! The persistent booking ledger: `(listing, date) → booked`.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    book_dates(booker, id, dates, payment)               │
//! │                                                                         │
//! │  1. write gate + BEGIN                                                 │
//! │  2. load listing ─────────────── missing → NotFound                    │
//! │  3. plan_booking ─────────────── InvalidDate / DuplicateDates /        │
//! │                                  UnorderedDates / DateUnavailable /    │
//! │                                  IncorrectPayment                      │
//! │  4. INSERT booked_dates ──────── PK hit → DateUnavailable              │
//! │  5. INSERT payments                                                    │
//! │  6. INSERT ledger_events (DatesBooked)                                 │
//! │  7. COMMIT                                                             │
//! │                                                                         │
//! │  Steps 2-6 see a consistent snapshot: the gate keeps every other       │
//! │  mutation out until COMMIT.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bookings are permanent. There is no cancel or refund.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use staybook_core::{
    calendar, plan_booking, Amount, DatesBooked, LedgerError, LedgerEvent, ListingId,
    PaymentReceipt, Principal,
};

use super::{event, listing, listing_key};
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    listing_id: i64,
    payer: String,
    amount: i64,
    nights: i64,
}

impl TryFrom<PaymentRow> for PaymentReceipt {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> DbResult<Self> {
        Ok(PaymentReceipt {
            listing_id: ListingId::new(
                u64::try_from(row.listing_id).map_err(|_| DbError::out_of_range("listing_id"))?,
            ),
            payer: Principal::new(row.payer),
            amount: Amount::new(
                u64::try_from(row.amount).map_err(|_| DbError::out_of_range("amount"))?,
            ),
            nights: u64::try_from(row.nights).map_err(|_| DbError::out_of_range("nights"))?,
        })
    }
}

/// Repository for the booking ledger.
///
/// ## Usage
/// ```rust,ignore
/// let event = db.bookings().book_dates(&guest, id, &dates, payment).await?;
/// assert!(db.bookings().bookings(id, &dates[0]).await?);
/// ```
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool, write_gate: Arc<Mutex<()>>) -> Self {
        BookingRepository { pool, write_gate }
    }

    /// Books `dates` on listing `id` for exactly `price_per_day × dates.len()`.
    ///
    /// All-or-nothing: on any error the transaction is dropped, so no date,
    /// payment or event row survives.
    pub async fn book_dates(
        &self,
        booker: &Principal,
        id: ListingId,
        dates: &[String],
        payment: Amount,
    ) -> DbResult<DatesBooked> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let listing = listing::load(&mut tx, id)
            .await?
            .ok_or(LedgerError::NotFound(id))?;

        let plan = plan_booking(&listing, booker, dates, payment).map_err(|err| {
            debug!(id = %id, booker = %booker, error = %err, "book_dates rejected");
            err
        })?;

        let key = listing_key(id).ok_or_else(|| DbError::out_of_range("listing_id"))?;
        let amount = i64::try_from(payment.units()).map_err(|_| DbError::out_of_range("amount"))?;
        let nights = i64::try_from(plan.receipt.nights).map_err(|_| DbError::out_of_range("nights"))?;
        let now = Utc::now();

        for date in &plan.dates {
            let date = date.to_string();
            sqlx::query(
                "INSERT INTO booked_dates (listing_id, date, booked_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(key)
            .bind(&date)
            .bind(booker.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|err| match DbError::from(err) {
                DbError::UniqueViolation { .. } => LedgerError::DateUnavailable {
                    date: date.clone(),
                }
                .into(),
                other => other,
            })?;
        }

        sqlx::query(
            "INSERT INTO payments (listing_id, payer, amount, nights, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(key)
        .bind(plan.receipt.payer.as_str())
        .bind(amount)
        .bind(nights)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        event::append(&mut tx, &LedgerEvent::from(plan.event.clone())).await?;
        tx.commit().await?;

        info!(
            id = %id,
            booker = %booker,
            nights = plan.dates.len(),
            amount = %payment,
            "Dates booked"
        );

        Ok(plan.event)
    }

    /// Whether `date` is booked on listing `id`.
    ///
    /// Unknown listings and malformed dates report `false`.
    pub async fn bookings(&self, id: ListingId, date: &str) -> DbResult<bool> {
        let (Some(key), Ok(date)) = (listing_key(id), calendar::validate(date)) else {
            return Ok(false);
        };

        let booked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM booked_dates WHERE listing_id = ?1 AND date = ?2)",
        )
        .bind(key)
        .bind(date.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(booked)
    }

    /// Every payment captured for a listing, oldest first.
    pub async fn payments(&self, id: ListingId) -> DbResult<Vec<PaymentReceipt>> {
        let Some(key) = listing_key(id) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, PaymentRow>(
            "SELECT listing_id, payer, amount, nights FROM payments WHERE listing_id = ?1 ORDER BY id",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentReceipt::try_from).collect()
    }

    /// Total captured for a listing.
    pub async fn balance(&self, id: ListingId) -> DbResult<Amount> {
        self.payments(id)
            .await?
            .iter()
            .try_fold(Amount::zero(), |total, receipt| total.checked_add(receipt.amount))
            .ok_or_else(|| DbError::out_of_range("balance"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use staybook_core::{canonicalize, ErrorKind, NewListing};

    const PRICE: u64 = 10;

    fn dates(raw: &[&str]) -> Vec<String> {
        canonicalize(raw.iter().copied())
    }

    async fn ledger_with_listing() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = Principal::new("0xadmin");
        db.open_ledger(&admin).await.unwrap();

        db.listings()
            .create_listing(
                &admin,
                NewListing {
                    name: "Tokyo Property 1".to_string(),
                    city: "Tokyo".to_string(),
                    lat: "123".to_string(),
                    long: "100".to_string(),
                    uno_description: "Quiet flat".to_string(),
                    dos_description: "Near the station".to_string(),
                    img_url: "https://img.example/1.png".to_string(),
                    max_guests: 4,
                    price_per_day: Amount::new(PRICE),
                    dates: dates(&["2021-10-01", "2021-10-10"]),
                },
            )
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_book_dates() {
        let db = ledger_with_listing().await;
        let repo = db.bookings();
        let guest = Principal::new("0xguest");
        let id = ListingId::new(0);

        let event = repo
            .book_dates(&guest, id, &dates(&["2022-02-28"]), Amount::new(PRICE))
            .await
            .unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.booker, guest);
        assert_eq!(event.city, "Tokyo");

        // Repeated queries keep answering true.
        for _ in 0..3 {
            assert!(repo.bookings(id, "2022-02-28").await.unwrap());
        }
        assert!(repo.bookings(id, "2021-10-01").await.unwrap());
        assert!(!repo.bookings(id, "2022-03-01").await.unwrap());

        let receipts = repo.payments(id).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].nights, 1);
        assert_eq!(repo.balance(id).await.unwrap(), Amount::new(PRICE));
    }

    #[tokio::test]
    async fn test_bookings_query_edge_cases() {
        let db = ledger_with_listing().await;
        let repo = db.bookings();

        assert!(!repo.bookings(ListingId::new(7), "2021-10-01").await.unwrap());
        assert!(!repo.bookings(ListingId::new(0), "2021-13-01").await.unwrap());
        assert!(!repo.bookings(ListingId::new(u64::MAX), "2021-10-01").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_listing() {
        let db = ledger_with_listing().await;
        let err = db
            .bookings()
            .book_dates(&Principal::new("0xguest"), ListingId::new(1), &[], Amount::zero())
            .await
            .unwrap_err();
        assert_eq!(err.ledger_kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_incorrect_payment_writes_nothing() {
        let db = ledger_with_listing().await;
        let repo = db.bookings();
        let guest = Principal::new("0xguest");
        let id = ListingId::new(0);
        let requested = dates(&["2022-02-28", "2022-03-01"]);

        for wrong in [PRICE, 3 * PRICE] {
            let err = repo
                .book_dates(&guest, id, &requested, Amount::new(wrong))
                .await
                .unwrap_err();
            assert_eq!(err.ledger_kind(), Some(ErrorKind::IncorrectPayment));
        }

        assert!(!repo.bookings(id, "2022-02-28").await.unwrap());
        assert!(repo.payments(id).await.unwrap().is_empty());
        assert_eq!(db.events().count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_partial_overlap_books_nothing() {
        let db = ledger_with_listing().await;
        let repo = db.bookings();
        let guest = Principal::new("0xguest");
        let id = ListingId::new(0);

        let requested = dates(&["2021-10-01", "2022-03-02"]);
        let err = repo
            .book_dates(&guest, id, &requested, Amount::new(2 * PRICE))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::DateUnavailable { ref date }) if date == "2021-10-01"
        ));
        assert!(!repo.bookings(id, "2022-03-02").await.unwrap());
        assert_eq!(repo.balance(id).await.unwrap(), Amount::zero());
    }

    #[tokio::test]
    async fn test_empty_booking() {
        let db = ledger_with_listing().await;
        let event = db
            .bookings()
            .book_dates(&Principal::new("0xguest"), ListingId::new(0), &[], Amount::zero())
            .await
            .unwrap();
        assert!(event.dates_booked.is_empty());
        assert_eq!(db.events().count_pending().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_same_date() {
        let db = ledger_with_listing().await;
        let id = ListingId::new(0);

        let mut handles = Vec::new();
        for n in 0..8 {
            let repo = db.bookings();
            handles.push(tokio::spawn(async move {
                repo.book_dates(
                    &Principal::new(format!("0xguest{n}")),
                    id,
                    &["2023-07-14".to_string()],
                    Amount::new(PRICE),
                )
                .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert_eq!(err.ledger_kind(), Some(ErrorKind::DateUnavailable)),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(db.bookings().payments(id).await.unwrap().len(), 1);
    }
}
