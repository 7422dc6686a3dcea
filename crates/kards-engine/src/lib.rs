//! The business card scan-to-record pipeline.
//!
//! This crate builds on the [`kards`] extraction client. It turns a camera frame
//! or an uploaded photo into a stored contact record: the image is normalized,
//! sent for extraction, checked against the existing collection for a
//! duplicate, and then stored.
//!
//! # Quick Start
//!
//! ```no_run
//! use kards_engine::{CardStore, Engine, ExtractionClient, ScanOutcome};
//! use kards_engine::query::SortKey;
//!
//! # async fn example() -> kards_engine::Result<()> {
//! let client = ExtractionClient::builder().api_key("my-api-key").build();
//! let mut engine = Engine::new(client, CardStore::open("kards.json")?);
//!
//! let photo = std::fs::read("card.jpg")?;
//! if let ScanOutcome::Saved(id) = engine.scan_upload(&photo).await? {
//!     println!("Saved {}", id);
//! }
//!
//! for card in engine.view("acme", SortKey::NameAsc) {
//!     println!("{} - {}", card.fields.name, card.fields.company);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`capture`] - Image normalization and scoped camera sessions
//! - [`deduplicate`] - Duplicate detection on name and company
//! - [`store`] - The card collection and its JSON file
//! - [`query`] - Search and sort for the listing
//! - [`scan`] - The pipeline tying them together

mod error;

pub mod capture;
pub mod deduplicate;
pub mod query;
pub mod scan;
pub mod store;

pub use deduplicate::Resolution;
pub use error::{Error, Result};
pub use scan::{PendingScan, Resolved, ScanOutcome};
pub use store::CardStore;

// Re-export kards types for convenience
pub use kards::{
    CardDraft, ClientBuilder, ContactFields, ContactRecord, ErrorCategory, ExtractionClient,
};

use query::SortKey;

/// The application core: an extraction client plus the card collection.
///
/// Mutating operations take `&mut self`, so only one scan, edit or delete can
/// be in flight at a time.
///
/// # Example
///
/// ```
/// use kards_engine::{CardStore, Engine, ExtractionClient};
///
/// let engine = Engine::new(ExtractionClient::builder().build(), CardStore::in_memory());
/// assert!(engine.store().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    client: ExtractionClient,
    store: CardStore,
}

impl Engine {
    /// Create an engine from a client and a store.
    pub fn new(client: ExtractionClient, store: CardStore) -> Self {
        Self { client, store }
    }

    /// Get a reference to the extraction client.
    pub fn client(&self) -> &ExtractionClient {
        &self.client
    }

    /// The card collection.
    pub fn store(&self) -> &CardStore {
        &self.store
    }

    /// Mutable access to the card collection, for edits and deletes.
    pub fn store_mut(&mut self) -> &mut CardStore {
        &mut self.store
    }

    /// The listing for a search term and sort key.
    pub fn view(&self, search: &str, sort: SortKey) -> Vec<&ContactRecord> {
        query::view(self.store.list(), search, sort)
    }
}
