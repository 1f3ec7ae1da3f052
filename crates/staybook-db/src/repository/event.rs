//! # Event Outbox Repository
//!
//! `RentalCreated` and `DatesBooked` events waiting for indexers.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Event Outbox                                         │
//! │                                                                         │
//! │  create_listing / book_dates transaction                               │
//! │  ├── state rows (listings, booked_dates, payments)                     │
//! │  └── ledger_events row  ← same transaction: both or neither            │
//! │                                                                         │
//! │  Indexer loop                                                          │
//! │  ├── pending(limit)       oldest first, delivered_at IS NULL           │
//! │  ├── publish...                                                        │
//! │  └── mark_delivered(ids)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An event is never emitted for a failed operation, because the failed
//! transaction never commits its outbox row.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use staybook_core::LedgerEvent;

use super::listing_key;
use crate::error::{DbError, DbResult};

/// An outbox entry: the event and its position in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Outbox sequence number, strictly increasing in emission order.
    pub seq: i64,
    pub event: LedgerEvent,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    payload: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for StoredEvent {
    type Error = DbError;

    fn try_from(row: EventRow) -> DbResult<Self> {
        Ok(StoredEvent {
            seq: row.id,
            event: serde_json::from_str(&row.payload)?,
            created_at: row.created_at,
        })
    }
}

/// Appends an event inside the caller's transaction.
pub(crate) async fn append(conn: &mut SqliteConnection, event: &LedgerEvent) -> DbResult<i64> {
    let payload = serde_json::to_string(event)?;
    let listing_id =
        listing_key(event.listing_id()).ok_or_else(|| DbError::out_of_range("listing_id"))?;

    let seq = sqlx::query(
        "INSERT INTO ledger_events (kind, listing_id, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(event.name())
    .bind(listing_id)
    .bind(payload)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    debug!(seq, kind = event.name(), listing_id, "Event queued");
    Ok(seq)
}

/// Repository for the event outbox.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Creates a new EventRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EventRepository { pool }
    }

    /// Undelivered events, oldest first.
    pub async fn pending(&self, limit: u32) -> DbResult<Vec<StoredEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, payload, created_at
            FROM ledger_events
            WHERE delivered_at IS NULL
            ORDER BY id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredEvent::try_from).collect()
    }

    /// Marks events as delivered. Returns how many were newly marked.
    pub async fn mark_delivered(&self, seqs: &[i64]) -> DbResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut marked = 0;

        for seq in seqs {
            marked += sqlx::query(
                "UPDATE ledger_events SET delivered_at = ?2 WHERE id = ?1 AND delivered_at IS NULL",
            )
            .bind(seq)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        debug!(requested = seqs.len(), marked, "Events delivered");
        Ok(marked)
    }

    /// Counts undelivered events.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ledger_events WHERE delivered_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
