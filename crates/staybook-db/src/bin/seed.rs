//! # Seed Data Generator
//!
//! Populates a ledger with demo listings and one booking for development.
//!
//! ## Usage
//! ```bash
//! STAYBOOK_ADMIN=0xadmin cargo run -p staybook-db --bin seed
//!
//! # Specify database path and log level
//! STAYBOOK_ADMIN=0xadmin STAYBOOK_DB_PATH=./data/staybook.db RUST_LOG=debug \
//!     cargo run -p staybook-db --bin seed
//! ```
//!
//! ## Generated Data
//! - One listing per demo city, each blocking a short stay as initial dates
//! - One guest booking on the first listing, paid at the asking price
//! - The resulting outbox events are logged, not delivered

use staybook_core::calendar::{date_range, validate};
use staybook_core::{canonicalize, Amount, ListingId, NewListing, Principal};
use staybook_db::{Database, LedgerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (city, name, price per day, blocked check-in, blocked check-out)
const DEMO_LISTINGS: &[(&str, &str, u64, &str, &str)] = &[
    ("Tokyo", "Shibuya Loft", 120, "2024-02-27", "2024-03-02"),
    ("Lisbon", "Alfama Terrace", 85, "2024-05-10", "2024-05-13"),
    ("Nairobi", "Karen Garden Cottage", 60, "2024-08-01", "2024-08-04"),
    ("Montreal", "Plateau Walk-up", 95, "2024-12-30", "2025-01-02"),
];

const DEMO_GUEST: &str = "0xguest";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = LedgerConfig::from_env()?;
    info!(
        path = %config.database_path.display(),
        administrator = %config.administrator,
        "Staybook seed data generator"
    );

    let db = Database::new(config.db_config()).await?;
    db.open_ledger(&config.administrator).await?;

    let existing = db.listings().total_rentals().await?;
    if existing > 0 {
        warn!(existing, "Ledger already has listings; skipping seed");
        return Ok(());
    }

    for (city, name, price, check_in, check_out) in DEMO_LISTINGS {
        let blocked = date_range(validate(check_in)?, validate(check_out)?);
        let params = NewListing {
            name: name.to_string(),
            city: city.to_string(),
            lat: "0".to_string(),
            long: "0".to_string(),
            uno_description: format!("{name} in {city}"),
            dos_description: "Demo listing".to_string(),
            img_url: format!("https://img.example/{}.png", city.to_lowercase()),
            max_guests: 4,
            price_per_day: Amount::new(*price),
            dates: canonicalize(blocked.iter().map(|d| d.to_string())),
        };

        let created = db.listings().create_listing(&config.administrator, params).await?;
        info!(id = %created.id, city = %created.city, "Seeded listing");
    }

    let guest = Principal::new(DEMO_GUEST);
    let first = ListingId::new(0);
    let stay = date_range(validate("2024-03-05")?, validate("2024-03-08")?);
    let dates = canonicalize(stay.iter().map(|d| d.to_string()));
    let price = Amount::new(DEMO_LISTINGS[0].2);
    let payment = price.checked_mul(dates.len()).ok_or("demo price overflows")?;

    let booked = db.bookings().book_dates(&guest, first, &dates, payment).await?;
    info!(id = %booked.id, nights = booked.dates_booked.len(), "Seeded booking");

    for stored in db.events().pending(100).await? {
        info!(seq = stored.seq, kind = stored.event.name(), listing = %stored.event.listing_id(), "Pending event");
    }

    info!(
        total_rentals = db.listings().total_rentals().await?,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}
