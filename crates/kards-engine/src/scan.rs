//! The scan-to-record pipeline.
//!
//! A scan normalizes an image, sends it for extraction, and checks the result
//! against the collection. Without a duplicate the card is stored straight
//! away; with one, the scan is handed back as a [`PendingScan`] for the user
//! to [`resolve`](crate::Engine::resolve).
//!
//! Capture and extraction failures return before the store is touched.
//!
//! # Example
//!
//! ```no_run
//! use kards_engine::{Engine, Resolution, ScanOutcome};
//!
//! # async fn example(engine: &mut Engine, photo: &[u8]) -> kards_engine::Result<()> {
//! match engine.scan_upload(photo).await? {
//!     ScanOutcome::Saved(id) => println!("Saved card {}", id),
//!     ScanOutcome::Duplicate(pending) => {
//!         println!("{} at {} already exists", pending.existing().fields.name,
//!             pending.existing().fields.company);
//!         engine.resolve(pending, Resolution::Update)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use kards::{CardDraft, ContactRecord};
use tracing::{info, warn};

use crate::capture::{Camera, CameraSession, NormalizedImage, normalize_upload};
use crate::deduplicate::{Resolution, find_duplicate};
use crate::{Engine, Result};

/// What happened to a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No duplicate; the card was stored under this id.
    Saved(String),
    /// The card matches a stored one and needs a decision.
    Duplicate(PendingScan),
}

/// A scanned card waiting on a duplicate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScan {
    draft: CardDraft,
    existing: ContactRecord,
}

impl PendingScan {
    /// The freshly scanned card.
    pub fn draft(&self) -> &CardDraft {
        &self.draft
    }

    /// The stored card it matches.
    pub fn existing(&self) -> &ContactRecord {
        &self.existing
    }
}

/// The result of resolving a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The existing card now holds the scan's contents.
    Updated(String),
    /// The scan was stored as a new card.
    Created(String),
    /// The scan was dropped.
    Discarded,
}

impl Engine {
    /// Extract fields from a normalized image into an unsaved card.
    pub async fn extract(&self, image: &NormalizedImage) -> Result<CardDraft> {
        let fields = self
            .client()
            .extract(&image.base64())
            .await
            .inspect_err(|e| warn!(error = %e, category = ?e.category(), "extraction failed"))?;
        Ok(CardDraft::new(fields, image.data_url()))
    }

    /// Scan an uploaded image file.
    pub async fn scan_upload(&mut self, bytes: &[u8]) -> Result<ScanOutcome> {
        let image = normalize_upload(bytes)?;
        let draft = self.extract(&image).await?;
        self.submit(draft)
    }

    /// Scan a still from the rear camera.
    ///
    /// The camera is released as soon as the frame is grabbed, before the
    /// extraction request goes out, and on every failure path.
    pub async fn scan_camera(&mut self, camera: &dyn Camera) -> Result<ScanOutcome> {
        let image = CameraSession::start(camera)?.capture()?;
        let draft = self.extract(&image).await?;
        self.submit(draft)
    }

    /// Store a scanned card unless it duplicates an existing one.
    pub fn submit(&mut self, draft: CardDraft) -> Result<ScanOutcome> {
        if let Some(existing) = find_duplicate(&draft.fields, self.store().list()) {
            info!(existing_id = %existing.id, "scan matches an existing card");
            return Ok(ScanOutcome::Duplicate(PendingScan {
                existing: existing.clone(),
                draft,
            }));
        }

        let id = self.store_mut().create(draft)?;
        info!(id = %id, "scan saved");
        Ok(ScanOutcome::Saved(id))
    }

    /// Apply the user's decision for a duplicate scan.
    pub fn resolve(&mut self, pending: PendingScan, resolution: Resolution) -> Result<Resolved> {
        let PendingScan { draft, existing } = pending;

        match resolution {
            Resolution::Update => {
                self.store_mut().update(&existing.id, draft)?;
                Ok(Resolved::Updated(existing.id))
            }
            Resolution::New => {
                let id = self.store_mut().create(draft)?;
                Ok(Resolved::Created(id))
            }
            Resolution::Discard => {
                info!(existing_id = %existing.id, "scan discarded");
                Ok(Resolved::Discarded)
            }
        }
    }
}
