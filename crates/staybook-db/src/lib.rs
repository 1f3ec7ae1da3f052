//! # staybook-db: Persistent Ledger for Staybook
//!
//! This crate stores the rental registry and booking ledger in SQLite,
//! using sqlx for async access. Every rule comes from `staybook-core`;
//! this crate only adds durability, serialization of writers, and an
//! event outbox.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Staybook Data Flow                               │
//! │                                                                         │
//! │  Caller (API handler, CLI, indexer)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  staybook-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ListingRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ BookingRepo   │    │ 001_ledger_  │  │   │
//! │  │   │ Write gate    │    │ EventRepo     │    │   schema.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                               │                                 │   │
//! │  │                               ▼                                 │   │
//! │  │                  staybook-core plan_* functions                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   $STAYBOOK_DB_PATH (default ./staybook.db)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool, write gate, administrator
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Listing, booking and event repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use staybook_db::{Database, LedgerConfig};
//!
//! let config = LedgerConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//! db.open_ledger(&config.administrator).await?;
//!
//! let created = db.listings().create_listing(&config.administrator, params).await?;
//! db.bookings().book_dates(&guest, created.id, &dates, payment).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, LedgerConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{BookingRepository, EventRepository, ListingRepository, StoredEvent};
