//! The card collection.
//!
//! [`CardStore`] owns every stored [`ContactRecord`] in insertion order. Each
//! record gets an id built from the creation time in milliseconds, zero padded
//! to 13 digits, and bumped past the previous id when the clock has not moved.
//! Comparing ids as strings therefore always orders records by creation.
//!
//! A store opened from a file rewrites that file after every successful
//! create, update or delete. If the write fails the mutation is rolled back,
//! so memory and disk never disagree.
//!
//! # Example
//!
//! ```
//! use kards_engine::{CardDraft, CardStore, ContactFields};
//!
//! # fn example() -> kards_engine::Result<()> {
//! let mut store = CardStore::in_memory();
//! let id = store.create(CardDraft::new(
//!     ContactFields::new().name("Ann").company("Zeta"),
//!     "data:image/jpeg;base64,/9j/",
//! ))?;
//!
//! assert_eq!(store.get(&id).unwrap().fields.name, "Ann");
//! store.delete(&id)?;
//! assert!(store.is_empty());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use kards::{CardDraft, ContactRecord};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Width of a generated id.
const ID_WIDTH: usize = 13;

/// The collection of stored cards.
#[derive(Debug, Clone)]
pub struct CardStore {
    records: Vec<ContactRecord>,
    last_id: i64,
    path: Option<PathBuf>,
}

impl CardStore {
    /// An empty store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            last_id: 0,
            path: None,
        }
    }

    /// An in-memory store seeded with existing records.
    pub fn from_records(records: Vec<ContactRecord>) -> Self {
        let last_id = records
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            records,
            last_id,
            path: None,
        }
    }

    /// Load the collection file at `path`, or start empty if it does not exist.
    ///
    /// Later mutations are written back to the same file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records: Vec<ContactRecord> = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data).map_err(|e| {
                    Error::Storage(format!("failed to read {}: {}", path.display(), e))
                })?
            }
        } else {
            Vec::new()
        };

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id.as_str())) {
            return Err(Error::Storage(format!(
                "duplicate card id {} in {}",
                dup.id,
                path.display()
            )));
        }

        debug!(path = %path.display(), count = records.len(), "loaded card collection");

        let mut store = Self::from_records(records);
        store.path = Some(path);
        Ok(store)
    }

    /// The file this store persists to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Every record, in insertion order.
    pub fn list(&self) -> &[ContactRecord] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&ContactRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store a new record and return its id.
    pub fn create(&mut self, draft: CardDraft) -> Result<String> {
        validate(&draft)?;

        let previous_last = self.last_id;
        let id = self.next_id();
        self.records.push(ContactRecord::from_draft(id.clone(), draft));

        if let Err(e) = self.flush() {
            self.records.pop();
            self.last_id = previous_last;
            return Err(e);
        }

        info!(id = %id, "card created");
        Ok(id)
    }

    /// Replace every field of the record with `id`, keeping the id.
    pub fn update(&mut self, id: &str, draft: CardDraft) -> Result<()> {
        validate(&draft)?;

        let index = self.index_of(id)?;
        let replacement = ContactRecord::from_draft(id, draft);
        let previous = std::mem::replace(&mut self.records[index], replacement);

        if let Err(e) = self.flush() {
            self.records[index] = previous;
            return Err(e);
        }

        info!(id = %id, "card updated");
        Ok(())
    }

    /// Remove the record with `id` and return it.
    ///
    /// Confirmation is the caller's job; this deletes immediately.
    pub fn delete(&mut self, id: &str) -> Result<ContactRecord> {
        let index = self.index_of(id)?;
        let removed = self.records.remove(index);

        if let Err(e) = self.flush() {
            self.records.insert(index, removed);
            return Err(e);
        }

        info!(id = %id, "card deleted");
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        format!("{:0width$}", id, width = ID_WIDTH)
    }

    /// Write the collection to its file via a temporary sibling.
    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| Error::Storage(format!("failed to encode collection: {}", e)))?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), count = self.records.len(), "saved card collection");
        Ok(())
    }
}

impl Default for CardStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn validate(draft: &CardDraft) -> Result<()> {
    if draft.card_image.trim().is_empty() {
        return Err(Error::Validation(
            "a card needs the image it was scanned from".to_string(),
        ));
    }
    Ok(())
}
