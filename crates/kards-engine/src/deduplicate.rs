//! Duplicate detection for freshly scanned cards.
//!
//! A scan duplicates a stored card when both `name` and `company` match after
//! normalization (surrounding whitespace trimmed, inner runs collapsed to a
//! single space, case folded). Nothing fuzzier is assumed.
//!
//! When several stored cards match, the first one in collection order wins.
//!
//! # Example
//!
//! ```
//! use kards_engine::ContactFields;
//! use kards_engine::deduplicate::{find_duplicate, is_duplicate};
//!
//! let stored = ContactFields::new().name("Jane Doe").company("Acme");
//! let scanned = ContactFields::new().name("jane  doe").company("ACME");
//! assert!(is_duplicate(&scanned, &stored));
//! ```

use std::str::FromStr;

use kards::{ContactFields, ContactRecord};

/// How the user chose to reconcile a scan with the card it duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the existing card's contents, keeping its id.
    Update,
    /// Store the scan as a separate card.
    New,
    /// Abandon the scan.
    Discard,
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "update" => Ok(Resolution::Update),
            "new" => Ok(Resolution::New),
            "discard" => Ok(Resolution::Discard),
            _ => Err(format!(
                "Invalid resolution: {}. Use 'update', 'new' or 'discard'",
                s
            )),
        }
    }
}

/// Whether a scanned card duplicates a stored one.
///
/// Blank values take part like any other: a scan with neither a name nor a
/// company matches a stored card that has neither.
pub fn is_duplicate(scanned: &ContactFields, stored: &ContactFields) -> bool {
    normalize_key(&scanned.name) == normalize_key(&stored.name)
        && normalize_key(&scanned.company) == normalize_key(&stored.company)
}

/// The first stored record the scan duplicates, in collection order.
pub fn find_duplicate<'a>(
    scanned: &ContactFields,
    records: &'a [ContactRecord],
) -> Option<&'a ContactRecord> {
    records.iter().find(|r| is_duplicate(scanned, &r.fields))
}

/// Normalize a key value for comparison.
///
/// Collapses whitespace and converts to lowercase.
fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
