//! # Money Module
//!
//! Provides the `Amount` type for prices and payments.
//!
//! ## Why Integer Amounts?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Booking payment must equal pricePerDay × nights EXACTLY                │
//! │                                                                         │
//! │  Floating point:   0.1 × 3 = 0.30000000000000004  → never "exact"      │
//! │                                                                         │
//! │  OUR SOLUTION: integer smallest units, checked multiplication          │
//! │    10 units/day × 2 days = 20 units                                    │
//! │    u64::MAX / 2 units/day × 3 days = overflow → no payment can match   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use staybook_core::money::Amount;
//!
//! let price = Amount::new(10);
//! assert_eq!(price.checked_mul(2), Some(Amount::new(20)));
//! assert_eq!(Amount::new(u64::MAX).checked_mul(2), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Unsigned: the ledger has no refunds, so nothing is ever negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Amount(u64);

impl Amount {
    /// Creates an amount from smallest units.
    #[inline]
    pub const fn new(units: u64) -> Self {
        Amount(units)
    }

    /// Returns the value in smallest units.
    #[inline]
    pub const fn units(&self) -> u64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a count, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use staybook_core::money::Amount;
    ///
    /// let nightly = Amount::new(150);
    /// assert_eq!(nightly.checked_mul(0), Some(Amount::zero()));
    /// assert_eq!(nightly.checked_mul(3), Some(Amount::new(450)));
    /// ```
    pub fn checked_mul(self, count: usize) -> Option<Self> {
        let count = u64::try_from(count).ok()?;
        self.0.checked_mul(count).map(Amount)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Amount(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Saturating addition, used for running balances.
impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Amount) {
        *self = *self + other;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_mul() {
        assert_eq!(Amount::new(10).checked_mul(2), Some(Amount::new(20)));
        assert_eq!(Amount::new(10).checked_mul(0), Some(Amount::zero()));
        assert_eq!(Amount::new(u64::MAX).checked_mul(2), None);
        assert_eq!(Amount::new(u64::MAX).checked_mul(1), Some(Amount::new(u64::MAX)));
    }

    #[test]
    fn test_running_balance_saturates() {
        let mut balance = Amount::new(u64::MAX - 1);
        balance += Amount::new(5);
        assert_eq!(balance, Amount::new(u64::MAX));
        assert_eq!(Amount::new(1).checked_add(Amount::new(u64::MAX)), None);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Amount::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(back, Amount::new(42));
    }
}
