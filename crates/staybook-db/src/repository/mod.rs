//! # Repository Module
//!
//! Database repository implementations for the Staybook ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.bookings().book_dates(&guest, id, &dates, payment)         │
//! │       ▼                                                                 │
//! │  BookingRepository                                                     │
//! │  ├── take write gate                                                   │
//! │  ├── BEGIN                                                             │
//! │  ├── load listing        (listing::load)                              │
//! │  ├── plan_booking(...)   (staybook-core, pure)                        │
//! │  ├── INSERT booked_dates, payments                                     │
//! │  ├── INSERT ledger_events (event::append)                             │
//! │  └── COMMIT                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Any error drops the transaction, which rolls everything back.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ListingRepository`] - Rental registry: create, fetch, count
//! - [`BookingRepository`] - Booking ledger: book dates, availability, payments
//! - [`EventRepository`] - Event outbox for indexers

pub mod booking;
pub mod event;
pub mod listing;

pub use booking::BookingRepository;
pub use event::{EventRepository, StoredEvent};
pub use listing::ListingRepository;

use staybook_core::ListingId;

/// SQLite key for a listing id, or `None` if it cannot be stored.
pub(crate) fn listing_key(id: ListingId) -> Option<i64> {
    i64::try_from(id.value()).ok()
}
