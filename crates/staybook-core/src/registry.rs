//! # Rental Registry
//!
//! The append-only collection of listings. Creation is gated to a single
//! administrator fixed at construction.
//!
//! ## create_listing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller == administrator?  ── no ──► Unauthorized                       │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  verify_canonical(dates)   ── err ─► InvalidDate / DuplicateDates /     │
//! │       │ ok                           UnorderedDates                     │
//! │       ▼                                                                 │
//! │  id = listings.len()       (counter advances only here)                │
//! │  listings.push(listing)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RentalCreated { …, id, creator }                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::calendar::CalendarDate;
use crate::error::{LedgerError, LedgerResult};
use crate::ordering::verify_canonical;
use crate::types::{Listing, ListingId, NewListing, Principal, RentalCreated};

// =============================================================================
// Pure checks
// =============================================================================

/// Runs every `create_listing` check without touching state.
///
/// Shared by the in-memory registry and the SQLite repository so both
/// enforce identical rules. Authorization is checked before the dates.
pub fn plan_listing(
    administrator: &Principal,
    caller: &Principal,
    params: &NewListing,
) -> LedgerResult<Vec<CalendarDate>> {
    if caller != administrator {
        return Err(LedgerError::Unauthorized {
            caller: caller.clone(),
        });
    }
    verify_canonical(&params.dates)
}

/// Builds the stored listing and its creation event from checked params.
pub fn build_listing(
    id: ListingId,
    creator: Principal,
    params: NewListing,
    dates: Vec<CalendarDate>,
) -> (Listing, RentalCreated) {
    let listing = Listing {
        id,
        name: params.name.clone(),
        city: params.city.clone(),
        lat: params.lat.clone(),
        long: params.long.clone(),
        uno_description: params.uno_description.clone(),
        dos_description: params.dos_description.clone(),
        img_url: params.img_url.clone(),
        max_guests: params.max_guests,
        price_per_day: params.price_per_day,
        creator: creator.clone(),
        booked_dates: dates.into_iter().collect(),
    };

    let event = RentalCreated {
        name: params.name,
        city: params.city,
        lat: params.lat,
        long: params.long,
        uno_description: params.uno_description,
        dos_description: params.dos_description,
        img_url: params.img_url,
        max_guests: params.max_guests,
        price_per_day: params.price_per_day,
        dates_booked: params.dates,
        id,
        creator,
    };

    (listing, event)
}

// =============================================================================
// Registry
// =============================================================================

/// Owns every listing, indexed by id.
#[derive(Debug, Clone)]
pub struct RentalRegistry {
    administrator: Principal,
    listings: Vec<Listing>,
}

impl RentalRegistry {
    /// Creates an empty registry administered by `administrator`.
    pub fn new(administrator: Principal) -> Self {
        RentalRegistry {
            administrator,
            listings: Vec::new(),
        }
    }

    pub fn administrator(&self) -> &Principal {
        &self.administrator
    }

    /// Creates a listing.
    ///
    /// ## Errors
    /// `Unauthorized`, `InvalidDate`, `DuplicateDates`, `UnorderedDates`.
    /// The registry is unchanged on error.
    pub fn create_listing(
        &mut self,
        caller: &Principal,
        params: NewListing,
    ) -> LedgerResult<RentalCreated> {
        let dates = plan_listing(&self.administrator, caller, &params).map_err(|err| {
            debug!(caller = %caller, error = %err, "create_listing rejected");
            err
        })?;

        let id = ListingId::new(self.listings.len() as u64);
        let (listing, event) = build_listing(id, caller.clone(), params, dates);

        info!(
            id = %id,
            city = %listing.city,
            price_per_day = %listing.price_per_day,
            initial_dates = listing.booked_dates.len(),
            "Listing created"
        );

        self.listings.push(listing);
        Ok(event)
    }

    /// Looks up a listing.
    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| self.listings.get(index))
    }

    pub(crate) fn get_mut(&mut self, id: ListingId) -> Option<&mut Listing> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| self.listings.get_mut(index))
    }

    /// Number of listings ever created.
    pub fn total_rentals(&self) -> u64 {
        self.listings.len() as u64
    }

    /// All listings in id order.
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
