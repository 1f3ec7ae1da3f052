//! # Booking Rules
//!
//! Availability and payment checks for `book_dates`, plus the value-transfer
//! seam that captures payment.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  listing exists?                ── no ──► NotFound                      │
//! │  verify_canonical(requested)    ── err ─► InvalidDate / Duplicate /     │
//! │                                           UnorderedDates                │
//! │  any requested date booked?     ── yes ─► DateUnavailable (first hit)   │
//! │  payment == price × |dates|?    ── no ──► IncorrectPayment              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookingPlan  (nothing written yet)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The existence check lives with the caller, which is the only party that
//! knows how listings are stored.

use std::collections::HashMap;

use crate::calendar::CalendarDate;
use crate::error::{LedgerError, LedgerResult};
use crate::money::Amount;
use crate::ordering::verify_canonical;
use crate::types::{DatesBooked, Listing, ListingId, PaymentReceipt, Principal};

// =============================================================================
// Booking Plan
// =============================================================================

/// A fully checked booking, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPlan {
    /// Parsed dates in submitted order.
    pub dates: Vec<CalendarDate>,
    pub receipt: PaymentReceipt,
    pub event: DatesBooked,
}

/// Runs every `book_dates` check against an existing listing.
///
/// Pure: the listing is only read.
pub fn plan_booking(
    listing: &Listing,
    booker: &Principal,
    requested: &[String],
    payment: Amount,
) -> LedgerResult<BookingPlan> {
    let dates = verify_canonical(requested)?;

    if let Some((raw, _)) = requested
        .iter()
        .zip(&dates)
        .find(|(_, date)| listing.booked_dates.contains(*date))
    {
        return Err(LedgerError::DateUnavailable { date: raw.clone() });
    }

    let expected = listing.quote(dates.len());
    if expected != Some(payment) {
        return Err(LedgerError::IncorrectPayment {
            expected,
            received: payment,
        });
    }

    // A count too large for u64 has no price either.
    let nights = u64::try_from(dates.len()).map_err(|_| LedgerError::IncorrectPayment {
        expected: None,
        received: payment,
    })?;

    Ok(BookingPlan {
        receipt: PaymentReceipt {
            listing_id: listing.id,
            payer: booker.clone(),
            amount: payment,
            nights,
        },
        event: DatesBooked {
            id: listing.id,
            dates_booked: requested.to_vec(),
            booker: booker.clone(),
            city: listing.city.clone(),
            img_url: listing.img_url.clone(),
        },
        dates,
    })
}

// =============================================================================
// Treasury
// =============================================================================

/// Accepts and records booking payments.
///
/// Called once every check has passed and before the ledger records the
/// dates. It cannot fail, so a booking never captures payment without
/// committing its dates.
pub trait Treasury: Send {
    fn deposit(&mut self, receipt: &PaymentReceipt);
}

/// In-memory treasury: keeps every receipt and a balance per listing.
#[derive(Debug, Clone, Default)]
pub struct Escrow {
    receipts: Vec<PaymentReceipt>,
    balances: HashMap<ListingId, Amount>,
}

impl Escrow {
    pub fn new() -> Self {
        Escrow::default()
    }

    pub fn receipts(&self) -> &[PaymentReceipt] {
        &self.receipts
    }

    /// Total captured for a listing.
    pub fn balance(&self, listing: ListingId) -> Amount {
        self.balances.get(&listing).copied().unwrap_or_default()
    }
}

impl Treasury for Escrow {
    fn deposit(&mut self, receipt: &PaymentReceipt) {
        *self.balances.entry(receipt.listing_id).or_default() += receipt.amount;
        self.receipts.push(receipt.clone());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
