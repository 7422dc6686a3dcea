//! Types shared between the extraction client and the card engine.

mod contact;

pub use contact::{CardDraft, ContactFields, ContactRecord, FIELD_NAMES};
