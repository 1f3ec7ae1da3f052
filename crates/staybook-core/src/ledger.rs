//! # Ledger State
//!
//! The single owned state object behind every ledger operation: the rental
//! registry, the treasury, and the log of emitted events.
//!
//! ## Transaction Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler(&mut self, caller, args)                                       │
//! │       │                                                                 │
//! │       ├── read + check   (plan_listing / plan_booking)                 │
//! │       │        │                                                        │
//! │       │        └── Err ──► return, nothing touched                     │
//! │       │                                                                 │
//! │       └── commit         (infallible writes, then push event)          │
//! │                                                                         │
//! │  `&mut self` makes every handler exclusive; SharedLedger adds a lock   │
//! │  for callers on several threads.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::booking::{plan_booking, Escrow, Treasury};
use crate::error::{LedgerError, LedgerResult};
use crate::money::Amount;
use crate::registry::RentalRegistry;
use crate::types::{DatesBooked, LedgerEvent, Listing, ListingId, NewListing, Principal, RentalCreated};

/// Rental registry, booking ledger and event log in one state object.
#[derive(Debug)]
pub struct Ledger<T: Treasury = Escrow> {
    registry: RentalRegistry,
    treasury: T,
    events: Vec<LedgerEvent>,
}

impl Ledger<Escrow> {
    /// Creates an empty ledger with an in-memory escrow.
    pub fn new(administrator: Principal) -> Self {
        Ledger::with_treasury(administrator, Escrow::new())
    }
}

impl<T: Treasury> Ledger<T> {
    /// Creates an empty ledger that deposits payments into `treasury`.
    pub fn with_treasury(administrator: Principal, treasury: T) -> Self {
        Ledger {
            registry: RentalRegistry::new(administrator),
            treasury,
            events: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates a listing. Only the administrator may call this.
    ///
    /// ## Example
    /// ```rust
    /// use staybook_core::{Amount, Ledger, NewListing, Principal};
    ///
    /// let admin = Principal::new("0xadmin");
    /// let mut ledger = Ledger::new(admin.clone());
    /// let created = ledger.create_listing(&admin, NewListing {
    ///     name: "Harbour loft".into(),
    ///     city: "Lisbon".into(),
    ///     lat: "38.70".into(),
    ///     long: "-9.14".into(),
    ///     uno_description: "Two rooms".into(),
    ///     dos_description: "River view".into(),
    ///     img_url: "https://img.example/loft.png".into(),
    ///     max_guests: 3,
    ///     price_per_day: Amount::new(120),
    ///     dates: vec![],
    /// }).unwrap();
    ///
    /// assert_eq!(created.id.value(), 0);
    /// assert_eq!(ledger.total_rentals(), 1);
    /// ```
    pub fn create_listing(
        &mut self,
        caller: &Principal,
        params: NewListing,
    ) -> LedgerResult<RentalCreated> {
        let event = self.registry.create_listing(caller, params)?;
        self.events.push(event.clone().into());
        Ok(event)
    }

    /// Books `dates` on a listing for exactly `price_per_day × dates.len()`.
    ///
    /// All-or-nothing: on any error no date is booked, no payment is
    /// captured and no event is emitted.
    pub fn book_dates(
        &mut self,
        booker: &Principal,
        id: ListingId,
        dates: &[String],
        payment: Amount,
    ) -> LedgerResult<DatesBooked> {
        let listing = self.registry.get(id).ok_or(LedgerError::NotFound(id))?;
        let plan = plan_booking(listing, booker, dates, payment).map_err(|err| {
            debug!(id = %id, booker = %booker, error = %err, "book_dates rejected");
            err
        })?;

        // The deposit runs before any ledger write: if it panics, no date is
        // booked and no event is recorded.
        self.treasury.deposit(&plan.receipt);

        // Checked above; the listing cannot disappear in between.
        let listing = self.registry.get_mut(id).ok_or(LedgerError::NotFound(id))?;
        listing.booked_dates.extend(plan.dates.iter().copied());

        info!(
            id = %id,
            booker = %booker,
            nights = plan.dates.len(),
            amount = %payment,
            "Dates booked"
        );

        self.events.push(plan.event.clone().into());
        Ok(plan.event)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whether `date` is booked on listing `id`.
    ///
    /// Unknown listings and malformed dates report `false`.
    pub fn bookings(&self, id: ListingId, date: &str) -> bool {
        self.registry
            .get(id)
            .map(|listing| listing.is_booked(date))
            .unwrap_or(false)
    }

    /// Number of listings ever created.
    pub fn total_rentals(&self) -> u64 {
        self.registry.total_rentals()
    }

    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &RentalRegistry {
        &self.registry
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    /// Events emitted so far and not yet drained.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Hands emitted events to a consumer, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ordering::canonicalize;

    fn admin() -> Principal {
        Principal::new("0xadmin")
    }

    fn guest() -> Principal {
        Principal::new("0xguest")
    }

    fn params(price: u64, dates: Vec<String>) -> NewListing {
        NewListing {
            name: "Tokyo Property".to_string(),
            city: "Tokyo".to_string(),
            lat: "123".to_string(),
            long: "100".to_string(),
            uno_description: "Quiet flat".to_string(),
            dos_description: "Near the station".to_string(),
            img_url: "https://img.example/tokyo.png".to_string(),
            max_guests: 4,
            price_per_day: Amount::new(price),
            dates,
        }
    }

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|d| d.to_string()).collect()
    }

    /// Two listings: 0 with {2021-10-10, 2021-10-01}, 1 with {2024-02-29, 2021-10-01}.
    fn seeded() -> Ledger {
        let mut ledger = Ledger::new(admin());
        ledger
            .create_listing(&admin(), params(10, strings(&["2021-10-10", "2021-10-01"])))
            .unwrap();
        ledger
            .create_listing(&admin(), params(10, strings(&["2024-02-29", "2021-10-01"])))
            .unwrap();
        ledger.drain_events();
        ledger
    }

    #[test]
    fn test_create_then_book_scenario() {
        let mut ledger = Ledger::new(admin());
        let price = 25;

        let initial = canonicalize(["2021-10-01", "2021-10-10"]);
        let created = ledger
            .create_listing(&admin(), params(price, initial))
            .unwrap();
        assert_eq!(created.id, ListingId::new(0));
        assert_eq!(ledger.total_rentals(), 1);

        ledger
            .book_dates(&guest(), ListingId::new(0), &strings(&["2022-02-28"]), Amount::new(price))
            .unwrap();
        assert!(ledger.bookings(ListingId::new(0), "2022-02-28"));
        assert!(ledger.bookings(ListingId::new(0), "2021-10-01"));
    }

    #[test]
    fn test_successful_booking_updates_index_and_escrow() {
        let mut ledger = seeded();
        let event = ledger
            .book_dates(
                &guest(),
                ListingId::new(1),
                &strings(&["2021-02-28", "2022-02-28"]),
                Amount::new(20),
            )
            .unwrap();

        assert_eq!(event.dates_booked, ["2021-02-28", "2022-02-28"]);
        assert_eq!(event.id, ListingId::new(1));
        assert_eq!(event.booker, guest());
        assert_eq!(event.city, "Tokyo");

        for _ in 0..3 {
            assert!(ledger.bookings(ListingId::new(1), "2022-02-28"));
            assert!(ledger.bookings(ListingId::new(1), "2021-02-28"));
        }
        assert!(!ledger.bookings(ListingId::new(0), "2022-02-28"));
        assert_eq!(ledger.treasury().balance(ListingId::new(1)), Amount::new(20));

        let events = ledger.drain_events();
        assert_eq!(events, vec![LedgerEvent::DatesBooked(event)]);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_partial_conflict_books_nothing() {
        let mut ledger = seeded();
        let err = ledger
            .book_dates(
                &guest(),
                ListingId::new(1),
                &strings(&["2024-02-29", "2022-02-28"]),
                Amount::new(20),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DateUnavailable);
        assert!(!ledger.bookings(ListingId::new(1), "2022-02-28"));
        assert!(ledger.treasury().receipts().is_empty());
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_incorrect_payment_changes_nothing() {
        let mut ledger = seeded();
        for paid in [1, 19, 21] {
            let err = ledger
                .book_dates(
                    &guest(),
                    ListingId::new(1),
                    &strings(&["2021-02-28", "2022-02-28"]),
                    Amount::new(paid),
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::IncorrectPayment);
        }
        assert!(!ledger.bookings(ListingId::new(1), "2022-02-28"));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_unknown_listing() {
        let mut ledger = seeded();
        let err = ledger
            .book_dates(&guest(), ListingId::new(2), &strings(&["2022-02-28"]), Amount::new(10))
            .unwrap_err();
        assert_eq!(err, LedgerError::NotFound(ListingId::new(2)));
        assert!(!ledger.bookings(ListingId::new(2), "2022-02-28"));
    }

    #[test]
    fn test_rebooking_same_date_fails() {
        let mut ledger = seeded();
        let dates = strings(&["2022-03-02"]);
        ledger
            .book_dates(&guest(), ListingId::new(0), &dates, Amount::new(10))
            .unwrap();
        let err = ledger
            .book_dates(&Principal::new("0xother"), ListingId::new(0), &dates, Amount::new(10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DateUnavailable);
        assert_eq!(ledger.treasury().receipts().len(), 1);
    }

    #[test]
    fn test_failed_create_emits_nothing() {
        let mut ledger = Ledger::new(admin());
        assert!(ledger
            .create_listing(&guest(), params(10, strings(&["2021-10-10"])))
            .is_err());
        assert_eq!(ledger.total_rentals(), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_custom_treasury() {
        #[derive(Default)]
        struct Counter(u32);

        impl Treasury for Counter {
            fn deposit(&mut self, _receipt: &crate::types::PaymentReceipt) {
                self.0 += 1;
            }
        }

        let mut ledger = Ledger::with_treasury(admin(), Counter::default());
        ledger
            .create_listing(&admin(), params(5, Vec::new()))
            .unwrap();
        ledger
            .book_dates(&guest(), ListingId::new(0), &strings(&["2023-07-14"]), Amount::new(5))
            .unwrap();
        assert_eq!(ledger.treasury().0, 1);
    }
}
