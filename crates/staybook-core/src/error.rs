//! # Error Types
//!
//! Domain-specific error types for staybook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  staybook-core errors (this file)                                      │
//! │  └── LedgerError      - Rule violations of every ledger operation      │
//! │                                                                         │
//! │  staybook-db errors (separate crate)                                   │
//! │  └── DbError          - Database failures, wraps LedgerError           │
//! │                                                                         │
//! │  Flow: LedgerError → DbError → caller                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Every variant aborts the whole operation. No state is written and no event
//! is emitted when a handler returns one of these.

use thiserror::Error;

use crate::money::Amount;
use crate::types::{ListingId, Principal};

// =============================================================================
// Ledger Error
// =============================================================================

/// Ledger rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A date string is malformed or names a day that does not exist.
    ///
    /// ## When This Occurs
    /// - Wrong field widths (`2021-10-1`)
    /// - Non-digit characters (`2022-02-2a`)
    /// - Month outside 1..=12, or day past the end of the month (`2021-02-29`)
    #[error("invalid date found: '{value}'")]
    InvalidDate { value: String },

    /// A date set is not sorted strictly ascending by content hash.
    ///
    /// `index` is the position of the first element whose hash is not
    /// greater than its predecessor's.
    #[error("dates are not in canonical order at index {index}")]
    UnorderedDates { index: usize },

    /// The same date string appears more than once in one request.
    #[error("duplicate dates found: '{value}'")]
    DuplicateDates { value: String },

    /// Caller is not the administrator.
    #[error("caller is not the owner: {caller}")]
    Unauthorized { caller: Principal },

    /// Listing id has never been assigned.
    #[error("rental not found: {0}")]
    NotFound(ListingId),

    /// Requested date is already booked for the listing.
    #[error("already booked for requested date: {date}")]
    DateUnavailable { date: String },

    /// Payment does not match the asking price exactly.
    #[error(
        "please submit the asking price: expected {}, received {received}",
        describe_quote(.expected)
    )]
    IncorrectPayment {
        /// `None` when the asking price overflows the amount range.
        expected: Option<Amount>,
        received: Amount,
    },
}

fn describe_quote(expected: &Option<Amount>) -> String {
    match expected {
        Some(amount) => amount.to_string(),
        None => "an amount beyond the representable range".to_string(),
    }
}

/// Fieldless category of a [`LedgerError`].
///
/// Useful for callers and tests that only care about which rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDate,
    UnorderedDates,
    DuplicateDates,
    Unauthorized,
    NotFound,
    DateUnavailable,
    IncorrectPayment,
}

impl LedgerError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidDate { .. } => ErrorKind::InvalidDate,
            LedgerError::UnorderedDates { .. } => ErrorKind::UnorderedDates,
            LedgerError::DuplicateDates { .. } => ErrorKind::DuplicateDates,
            LedgerError::Unauthorized { .. } => ErrorKind::Unauthorized,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::DateUnavailable { .. } => ErrorKind::DateUnavailable,
            LedgerError::IncorrectPayment { .. } => ErrorKind::IncorrectPayment,
        }
    }

    /// Creates an InvalidDate error for the given input.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        LedgerError::InvalidDate {
            value: value.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
