//! # Canonical Ordering
//!
//! Verifies that a submitted date set is duplicate-free and sorted strictly
//! ascending by the signed-message hash of each date string.
//!
//! The hash is the EIP-191 personal-message digest used by wallet clients:
//! `keccak256("\x19Ethereum Signed Message:\n" ++ len ++ date)`, where `len`
//! is the decimal byte length of the date. A browser client can therefore
//! pre-sort with `ethers.utils.hashMessage` and produce the same order.
//!
//! ## Why Hash Order?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLIENT (off-ledger)                 LEDGER                             │
//! │                                                                         │
//! │  ["2022-03-02", "2022-03-01"]                                           │
//! │       │                                                                 │
//! │       ▼ canonicalize()                                                  │
//! │  ["2022-03-01", "2022-03-02"]  ──►  verify_canonical()                 │
//! │   h = 7617…      h = fae1…           one forward scan:                  │
//! │                                       - each date valid                 │
//! │                                       - not seen before                 │
//! │                                       - hash > previous hash            │
//! │                                                                         │
//! │  The ledger never sorts. Any other ordering of the same set is          │
//! │  rejected, so every accepted set has exactly one representation.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::HashSet;
use std::fmt;

use crate::calendar::{self, CalendarDate};
use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Date Hash
// =============================================================================

const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// EIP-191 signed-message digest of a date string.
///
/// Byte-wise `Ord` equals numeric order of the digest read as a big-endian
/// 256-bit unsigned integer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateHash([u8; 32]);

impl DateHash {
    /// Hashes a raw date string. The string does not need to be valid.
    pub fn of(date: &str) -> Self {
        let bytes = date.as_bytes();
        let mut hasher = Keccak256::new();
        hasher.update(SIGNED_MESSAGE_PREFIX);
        hasher.update(bytes.len().to_string().as_bytes());
        hasher.update(bytes);
        DateHash(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for DateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateHash({})", self)
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Validates every date and checks the set is in canonical order.
///
/// ## Checks (per element, in this order)
/// 1. Calendar validity → `InvalidDate`
/// 2. Exact string seen earlier in the set → `DuplicateDates`
/// 3. Hash not greater than the previous element's → `UnorderedDates`
///
/// The first failure aborts the scan. Empty and single-element sets pass.
///
/// ## Example
/// ```rust
/// use staybook_core::ordering::verify_canonical;
///
/// // h("2022-03-01") < h("2022-03-02")
/// let ok = verify_canonical(&["2022-03-01", "2022-03-02"]);
/// assert!(ok.is_ok());
///
/// let reversed = verify_canonical(&["2022-03-02", "2022-03-01"]);
/// assert!(reversed.is_err());
/// ```
pub fn verify_canonical<S: AsRef<str>>(dates: &[S]) -> LedgerResult<Vec<CalendarDate>> {
    let mut parsed = Vec::with_capacity(dates.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(dates.len());
    let mut previous: Option<DateHash> = None;

    for (index, raw) in dates.iter().enumerate() {
        let raw = raw.as_ref();
        let date = calendar::validate(raw)?;

        if !seen.insert(raw) {
            return Err(LedgerError::DuplicateDates {
                value: raw.to_string(),
            });
        }

        let hash = DateHash::of(raw);
        if previous.is_some_and(|prev| hash <= prev) {
            return Err(LedgerError::UnorderedDates { index });
        }
        previous = Some(hash);
        parsed.push(date);
    }

    Ok(parsed)
}

/// Sorts dates into canonical (hash) order.
///
/// This is the client's pre-sort step. The registry and ledger never call it;
/// they only verify with [`verify_canonical`]. Duplicates are kept, so a
/// duplicated input still fails verification afterwards.
///
/// ## Example
/// ```rust
/// use staybook_core::ordering::{canonicalize, verify_canonical};
///
/// let stay = canonicalize(["2022-03-01", "2022-03-02", "2022-03-03"]);
/// assert!(verify_canonical(&stay).is_ok());
/// ```
pub fn canonicalize<I, S>(dates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut keyed: Vec<(DateHash, String)> = dates
        .into_iter()
        .map(|d| {
            let d = d.into();
            (DateHash::of(&d), d)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, d)| d).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind_of(dates: &[&str]) -> Option<ErrorKind> {
        verify_canonical(dates).err().map(|e| e.kind())
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            DateHash::of("2022-02-28").to_string(),
            "745ff663d3d888fb165dd29971a2d1a68c2b7fae53f770bfb6bfff2bd0d57cea"
        );
        assert!(DateHash::of("2021-02-28") < DateHash::of("2022-02-28"));
    }

    #[test]
    fn test_matches_wallet_message_hash() {
        // hashMessage("Hello World") as computed by wallet libraries.
        assert_eq!(
            DateHash::of("Hello World").to_string(),
            "a1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
        );
    }

    #[test]
    fn test_accepts_wallet_sorted_stay() {
        // Order produced by sorting on hashMessage in a browser client.
        let stay = ["2022-03-01", "2022-03-03", "2022-03-04", "2022-03-02"];
        assert_eq!(verify_canonical(&stay).unwrap().len(), 4);
        assert_eq!(
            canonicalize(["2022-03-01", "2022-03-02", "2022-03-03", "2022-03-04"]),
            stay
        );
    }

    #[test]
    fn test_trivial_sets() {
        let empty: [&str; 0] = [];
        assert_eq!(verify_canonical(&empty).unwrap(), Vec::new());
        assert_eq!(verify_canonical(&["2022-13-01"]).unwrap_err().kind(), ErrorKind::InvalidDate);
        assert_eq!(verify_canonical(&["2021-10-01"]).unwrap().len(), 1);
    }

    #[test]
    fn test_accepts_hash_order_not_calendar_order() {
        // Calendar order is reversed here, hash order is ascending.
        let parsed = verify_canonical(&["2021-10-10", "2021-10-01"]).unwrap();
        assert_eq!(parsed[0].to_string(), "2021-10-10");
        assert_eq!(parsed[1].to_string(), "2021-10-01");
    }

    #[test]
    fn test_rejects_reverse_hash_order() {
        assert_eq!(
            verify_canonical(&["2021-10-01", "2021-10-10"]),
            Err(LedgerError::UnorderedDates { index: 1 })
        );
        assert_eq!(
            kind_of(&["2021-02-28", "2022-02-28", "2024-02-29"]),
            Some(ErrorKind::UnorderedDates)
        );
    }

    #[test]
    fn test_rejects_duplicates_in_any_position() {
        assert_eq!(
            kind_of(&["2022-02-28", "2022-02-28"]),
            Some(ErrorKind::DuplicateDates)
        );
        // Non-adjacent duplicate with an ordered prefix.
        assert_eq!(
            kind_of(&["2024-02-29", "2022-02-28", "2024-02-29"]),
            Some(ErrorKind::DuplicateDates)
        );
        // Equal strings have equal hashes; the duplicate wins over order.
        assert_eq!(
            kind_of(&["2024-02-29", "2024-02-29", "2022-02-28"]),
            Some(ErrorKind::DuplicateDates)
        );
    }

    #[test]
    fn test_invalid_date_reported_before_order() {
        assert_eq!(
            kind_of(&["2022-02-28", "2022-02-2"]),
            Some(ErrorKind::InvalidDate)
        );
        assert_eq!(
            kind_of(&["2022-02-28", "2022-02-29"]),
            Some(ErrorKind::InvalidDate)
        );
    }

    #[test]
    fn test_canonicalize_orders_by_hash() {
        let sorted = canonicalize(["2021-10-01", "2022-02-28", "2021-10-10", "2021-02-28"]);
        assert_eq!(sorted, ["2021-02-28", "2021-10-10", "2022-02-28", "2021-10-01"]);
        assert!(verify_canonical(&sorted).is_ok());
    }

    #[test]
    fn test_canonicalize_keeps_duplicates() {
        let sorted = canonicalize(["2022-03-01", "2022-03-01"]);
        assert_eq!(sorted.len(), 2);
        assert_eq!(
            verify_canonical(&sorted).unwrap_err().kind(),
            ErrorKind::DuplicateDates
        );
    }
}
