//! Filtering and ordering of the card listing.
//!
//! A view is recomputed from scratch for every search term and sort key:
//! records whose name or company contains the term (case-insensitively) are
//! kept, then ordered by the sort key. An empty term keeps everything.
//!
//! # Example
//!
//! ```
//! use kards_engine::query::{SortKey, view};
//! use kards_engine::{ContactFields, ContactRecord};
//!
//! let records = vec![
//!     ContactRecord {
//!         id: "1".into(),
//!         fields: ContactFields::new().name("Ann").company("Zeta"),
//!         card_image: String::new(),
//!     },
//!     ContactRecord {
//!         id: "2".into(),
//!         fields: ContactFields::new().name("Bob").company("Ann Corp"),
//!         card_image: String::new(),
//!     },
//! ];
//!
//! let matches = view(&records, "ann", SortKey::NameAsc);
//! assert_eq!(matches.len(), 2);
//! assert_eq!(matches[0].fields.name, "Ann");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use kards::ContactRecord;

/// Ordering of the card listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Newest first.
    #[default]
    IdDesc,
    /// Oldest first.
    IdAsc,
    /// Name, A to Z.
    NameAsc,
    /// Name, Z to A.
    NameDesc,
}

impl SortKey {
    /// All sort keys, in the order a picker offers them.
    pub const ALL: [SortKey; 4] = [
        SortKey::IdDesc,
        SortKey::IdAsc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    /// The key's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::IdDesc => "id-desc",
            SortKey::IdAsc => "id-asc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    /// A human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::IdDesc => "Date Added (Newest)",
            SortKey::IdAsc => "Date Added (Oldest)",
            SortKey::NameAsc => "Name (A-Z)",
            SortKey::NameDesc => "Name (Z-A)",
        }
    }

    fn compare(&self, a: &ContactRecord, b: &ContactRecord) -> Ordering {
        match self {
            SortKey::IdDesc => b.id.cmp(&a.id),
            SortKey::IdAsc => a.id.cmp(&b.id),
            SortKey::NameAsc => collate(&a.fields.name, &b.fields.name),
            SortKey::NameDesc => collate(&b.fields.name, &a.fields.name),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid sort key: {}. Use 'id-desc', 'id-asc', 'name-asc' or 'name-desc'",
                    s
                )
            })
    }
}

/// Why a view came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The collection has no cards at all.
    NoCards,
    /// Cards exist but none match the search.
    NoMatches,
}

impl EmptyState {
    /// Classify an empty view given the size of the whole collection.
    pub fn for_collection(total: usize) -> Self {
        if total == 0 {
            EmptyState::NoCards
        } else {
            EmptyState::NoMatches
        }
    }

    /// Message to show in place of the listing.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoCards => {
                "Your wallet is empty. Scan a card to add your first contact."
            }
            EmptyState::NoMatches => "No matching cards found.",
        }
    }
}

/// Filter by search term, then order by sort key.
///
/// The sort is stable, so records with equal keys keep collection order.
pub fn view<'a>(
    records: &'a [ContactRecord],
    search: &str,
    sort: SortKey,
) -> Vec<&'a ContactRecord> {
    let needle = search.to_lowercase();

    let mut matches: Vec<&ContactRecord> = records
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.fields.name.to_lowercase().contains(&needle)
                || r.fields.company.to_lowercase().contains(&needle)
        })
        .collect();

    matches.sort_by(|a, b| sort.compare(a, b));
    matches
}

/// Compare names the way a reader expects: case folded first, exact
/// spelling only as a tie-break.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
