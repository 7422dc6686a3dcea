//! An async client for AI business-card extraction.
//!
//! This crate sends a normalized card photo to a generative vision service and
//! reads back the seven contact fields printed on the card. It also defines the
//! contact types shared with the `kards-engine` workflow crate.
//!
//! # Quick Start
//!
//! ```no_run
//! use kards::ExtractionClient;
//!
//! # async fn example(jpeg_base64: &str) -> kards::Result<()> {
//! let client = ExtractionClient::builder()
//!     .api_key(std::env::var("GEMINI_API_KEY").unwrap_or_default())
//!     .build();
//!
//! let fields = client.extract(jpeg_base64).await?;
//! println!("{} <{}>", fields.name, fields.email);
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Failures are grouped into three user-facing categories, see
//! [`ErrorCategory`]. Each extraction is a single attempt with no retry.

pub mod client;
pub mod error;
mod request;
pub mod types;

pub use client::{ClientBuilder, ExtractionClient, parse_fields};
pub use error::{Error, ErrorCategory, Result};
pub use types::{CardDraft, ContactFields, ContactRecord, FIELD_NAMES};
