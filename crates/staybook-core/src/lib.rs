//! # staybook-core: Pure Ledger Logic for Staybook
//!
//! This crate is the **heart** of Staybook. It holds the rental registry and
//! booking ledger as deterministic functions of state and input, with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Staybook Architecture                            │
//! │                                                                         │
//! │   Web UI / wallet / indexer   (external: read events only)             │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ staybook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ calendar  │─►│ ordering  │─►│ registry  │─►│  booking  │  │   │
//! │  │   │ validate  │  │ hash scan │  │ listings  │  │  ledger   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO RANDOMNESS • ATOMIC HANDLERS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                staybook-db (Persistent Ledger)                  │   │
//! │  │        SQLite tables, transactions, event outbox                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`calendar`] - `YYYY-MM-DD` validation and leap-year arithmetic
//! - [`ordering`] - Hash-order verification of date sets
//! - [`registry`] - Administrator-gated, append-only listings
//! - [`booking`] - Availability and payment rules, treasury seam
//! - [`ledger`] - The owned state object tying it together
//! - [`shared`] - Lock-guarded handle for concurrent callers
//! - [`types`], [`money`], [`error`] - Domain types
//!
//! ## Example Usage
//!
//! ```rust
//! use staybook_core::{canonicalize, Amount, Ledger, ListingId, NewListing, Principal};
//!
//! let admin = Principal::new("0xadmin");
//! let mut ledger = Ledger::new(admin.clone());
//!
//! ledger.create_listing(&admin, NewListing {
//!     name: "Tokyo Property 1".into(),
//!     city: "Tokyo".into(),
//!     lat: "35.68".into(),
//!     long: "139.69".into(),
//!     uno_description: "Quiet flat".into(),
//!     dos_description: "Near the station".into(),
//!     img_url: "https://img.example/tokyo.png".into(),
//!     max_guests: 4,
//!     price_per_day: Amount::new(10),
//!     dates: canonicalize(["2021-10-01", "2021-10-10"]),
//! }).unwrap();
//!
//! let guest = Principal::new("0xguest");
//! let stay = canonicalize(["2022-03-01", "2022-03-02"]);
//! ledger.book_dates(&guest, ListingId::new(0), &stay, Amount::new(20)).unwrap();
//!
//! assert!(ledger.bookings(ListingId::new(0), "2022-03-01"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod calendar;
pub mod error;
pub mod ledger;
pub mod money;
pub mod ordering;
pub mod registry;
pub mod shared;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{plan_booking, BookingPlan, Escrow, Treasury};
pub use calendar::{validate, CalendarDate};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use money::Amount;
pub use ordering::{canonicalize, verify_canonical, DateHash};
pub use registry::{build_listing, plan_listing, RentalRegistry};
pub use shared::SharedLedger;
pub use types::*;
