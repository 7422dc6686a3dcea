//! Error types for kards-engine.
//!
//! Errors from engine workflows fall into three categories:
//!
//! 1. **Client errors**: Wrapped from the underlying [`kards::Error`] type
//! 2. **Capture errors**: The camera or an uploaded image could not be used
//! 3. **Store errors**: A stale id was used, or the collection file failed
//!
//! None of these leave a partial record behind.
//!
//! # Example
//!
//! ```no_run
//! use kards_engine::{Engine, Error};
//!
//! # async fn example(engine: &mut Engine, photo: &[u8]) {
//! match engine.scan_upload(photo).await {
//!     Ok(outcome) => println!("{:?}", outcome),
//!     Err(Error::Client(e)) => eprintln!("{}", e.category().user_message()),
//!     Err(Error::Capture(e)) => eprintln!("{}", e),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```

use std::fmt;

use crate::capture::CaptureError;

/// Result type for kards-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during engine operations.
#[derive(Debug)]
pub enum Error {
    /// An error from the extraction client.
    Client(kards::Error),

    /// The image could not be captured or decoded.
    Capture(CaptureError),

    /// No record has the given id.
    NotFound(String),

    /// A record failed validation before it could be stored.
    Validation(String),

    /// An I/O error occurred while reading or writing the collection.
    Io(std::io::Error),

    /// The collection file could not be encoded or decoded.
    Storage(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Client(e) => Some(e),
            Error::Capture(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Client(e) => write!(f, "{}", e),
            Error::Capture(e) => write!(f, "{}", e),
            Error::NotFound(id) => write!(f, "card not found: {}", id),
            Error::Validation(msg) => write!(f, "validation error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<kards::Error> for Error {
    fn from(err: kards::Error) -> Self {
        Error::Client(err)
    }
}

impl From<CaptureError> for Error {
    fn from(err: CaptureError) -> Self {
        Error::Capture(err)
    }
}
