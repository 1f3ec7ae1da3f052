//! # Shared Ledger
//!
//! Thread-safe handle to a [`Ledger`].
//!
//! ## Thread Safety
//! The ledger is wrapped in `Arc<Mutex<T>>` because:
//! 1. Many callers read and book concurrently
//! 2. `book_dates` is read-validate-write; two callers must never both see a
//!    date as free and both write it
//! 3. One lock around the whole handler gives serialized transactions
//!
//! A poisoned lock is recovered. Handlers check everything before writing,
//! and the treasury deposit, the only call into foreign code, runs before
//! the ledger's own writes, so a panic leaves the ledger as it was.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::booking::{Escrow, Treasury};
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::money::Amount;
use crate::types::{DatesBooked, LedgerEvent, Listing, ListingId, NewListing, Principal, RentalCreated};

/// Cloneable, lock-guarded ledger handle.
#[derive(Debug)]
pub struct SharedLedger<T: Treasury = Escrow> {
    inner: Arc<Mutex<Ledger<T>>>,
}

impl<T: Treasury> Clone for SharedLedger<T> {
    fn clone(&self) -> Self {
        SharedLedger {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedLedger<Escrow> {
    pub fn new(administrator: Principal) -> Self {
        SharedLedger::from_ledger(Ledger::new(administrator))
    }
}

impl<T: Treasury> SharedLedger<T> {
    pub fn from_ledger(ledger: Ledger<T>) -> Self {
        SharedLedger {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger<T>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn create_listing(
        &self,
        caller: &Principal,
        params: NewListing,
    ) -> LedgerResult<RentalCreated> {
        self.lock().create_listing(caller, params)
    }

    pub fn book_dates(
        &self,
        booker: &Principal,
        id: ListingId,
        dates: &[String],
        payment: Amount,
    ) -> LedgerResult<DatesBooked> {
        self.lock().book_dates(booker, id, dates, payment)
    }

    pub fn bookings(&self, id: ListingId, date: &str) -> bool {
        self.lock().bookings(id, date)
    }

    pub fn total_rentals(&self) -> u64 {
        self.lock().total_rentals()
    }

    /// Snapshot of a listing.
    pub fn listing(&self, id: ListingId) -> Option<Listing> {
        self.lock().listing(id).cloned()
    }

    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        self.lock().drain_events()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
