//! # Domain Types
//!
//! Core domain types used throughout Staybook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Listing      │   │  RentalCreated  │   │   DatesBooked   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (dense)     │   │  all listing    │   │  listing_id     │       │
//! │  │  name, city     │   │  fields + id    │   │  booked_dates   │       │
//! │  │  price_per_day  │   │  + creator      │   │  booker         │       │
//! │  │  booked_dates   │   │                 │   │  city, img_url  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ListingId(u64)  Principal(String)  PaymentReceipt  LedgerEvent        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! A listing is written once by the registry and never updated or deleted.
//! Only `booked_dates` grows, and only through the booking ledger.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ts_rs::TS;

use crate::calendar::{self, CalendarDate};
use crate::money::Amount;

// =============================================================================
// Identifiers
// =============================================================================

/// Sequential listing id: 0 for the first listing, dense thereafter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ListingId(u64);

impl ListingId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        ListingId(id)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated caller identity, such as a wallet address.
///
/// Compared by exact string equality; the ledger does not normalize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Principal(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Parameters of `create_listing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewListing {
    pub name: String,
    pub city: String,
    /// Latitude, kept as the string the creator supplied.
    pub lat: String,
    /// Longitude, kept as the string the creator supplied.
    pub long: String,
    pub uno_description: String,
    pub dos_description: String,
    pub img_url: String,
    pub max_guests: u32,
    pub price_per_day: Amount,
    /// Dates unavailable from the start, in canonical (hash) order.
    pub dates: Vec<String>,
}

/// A stored rental listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub city: String,
    pub lat: String,
    pub long: String,
    pub uno_description: String,
    pub dos_description: String,
    pub img_url: String,
    pub max_guests: u32,
    pub price_per_day: Amount,
    pub creator: Principal,
    /// Every booked date. Only ever grows.
    #[ts(as = "Vec<String>")]
    pub booked_dates: BTreeSet<CalendarDate>,
}

impl Listing {
    /// Whether `date` is booked. Malformed strings are never booked.
    pub fn is_booked(&self, date: &str) -> bool {
        calendar::validate(date)
            .map(|d| self.booked_dates.contains(&d))
            .unwrap_or(false)
    }

    /// Asking price for `nights` dates, or `None` if it overflows.
    pub fn quote(&self, nights: usize) -> Option<Amount> {
        self.price_per_day.checked_mul(nights)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Emitted once per successful `create_listing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RentalCreated {
    pub name: String,
    pub city: String,
    pub lat: String,
    pub long: String,
    pub uno_description: String,
    pub dos_description: String,
    pub img_url: String,
    pub max_guests: u32,
    pub price_per_day: Amount,
    /// Initial dates exactly as submitted.
    pub dates_booked: Vec<String>,
    pub id: ListingId,
    pub creator: Principal,
}

/// Emitted once per successful `book_dates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DatesBooked {
    pub id: ListingId,
    /// Newly booked dates exactly as submitted.
    pub dates_booked: Vec<String>,
    pub booker: Principal,
    pub city: String,
    pub img_url: String,
}

/// Everything the ledger emits, in the shape indexers consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "args")]
#[ts(export)]
pub enum LedgerEvent {
    RentalCreated(RentalCreated),
    DatesBooked(DatesBooked),
}

impl LedgerEvent {
    /// Stable event name, used as the outbox `kind` column.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::RentalCreated(_) => "RentalCreated",
            LedgerEvent::DatesBooked(_) => "DatesBooked",
        }
    }

    pub fn listing_id(&self) -> ListingId {
        match self {
            LedgerEvent::RentalCreated(e) => e.id,
            LedgerEvent::DatesBooked(e) => e.id,
        }
    }
}

impl From<RentalCreated> for LedgerEvent {
    fn from(event: RentalCreated) -> Self {
        LedgerEvent::RentalCreated(event)
    }
}

impl From<DatesBooked> for LedgerEvent {
    fn from(event: DatesBooked) -> Self {
        LedgerEvent::DatesBooked(event)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A captured booking payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentReceipt {
    pub listing_id: ListingId,
    pub payer: Principal,
    pub amount: Amount,
    /// Number of dates the payment covers.
    pub nights: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing {
            id: ListingId::new(0),
            name: "Tokyo Property 1".to_string(),
            city: "Tokyo".to_string(),
            lat: "123".to_string(),
            long: "100".to_string(),
            uno_description: "Quiet flat".to_string(),
            dos_description: "Near the station".to_string(),
            img_url: "https://img.example/1.png".to_string(),
            max_guests: 4,
            price_per_day: Amount::new(10),
            creator: Principal::new("0xadmin"),
            booked_dates: [calendar::validate("2021-10-01").unwrap()].into_iter().collect(),
        }
    }

    #[test]
    fn test_is_booked() {
        let listing = listing();
        assert!(listing.is_booked("2021-10-01"));
        assert!(!listing.is_booked("2021-10-02"));
        assert!(!listing.is_booked("not-a-date"));
    }

    #[test]
    fn test_quote() {
        let listing = listing();
        assert_eq!(listing.quote(3), Some(Amount::new(30)));
        assert_eq!(listing.quote(0), Some(Amount::zero()));
    }

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::from(DatesBooked {
            id: ListingId::new(1),
            dates_booked: vec!["2022-02-28".to_string()],
            booker: Principal::new("0xguest"),
            city: "Tokyo".to_string(),
            img_url: "img".to_string(),
        });
        assert_eq!(event.name(), "DatesBooked");
        assert_eq!(event.listing_id(), ListingId::new(1));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "DatesBooked");
        assert_eq!(json["args"]["datesBooked"][0], "2022-02-28");
        assert_eq!(json["args"]["booker"], "0xguest");
    }
}
