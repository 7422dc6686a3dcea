//! Error types for the kards crate.
//!
//! Every failure of an extraction call falls into one of three user-facing
//! categories, exposed through [`Error::category`]:
//!
//! - [`ErrorCategory::EmptyResponse`]: the service answered but returned no text
//! - [`ErrorCategory::Malformed`]: the text could not be read as the contact JSON
//! - [`ErrorCategory::Transport`]: network, authentication, or service failures
//!
//! # Example
//!
//! ```no_run
//! use kards::{ErrorCategory, ExtractionClient};
//!
//! # async fn example(jpeg_base64: &str) {
//! let client = ExtractionClient::builder().api_key("secret").build();
//!
//! match client.extract(jpeg_base64).await {
//!     Ok(fields) => println!("Scanned {}", fields.name),
//!     Err(e) if e.category() == ErrorCategory::EmptyResponse => {
//!         eprintln!("{}", e.category().user_message());
//!     }
//!     Err(e) => eprintln!("{}", e.category().user_message()),
//! }
//! # }
//! ```

use thiserror::Error;

/// The error type for extraction operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP/network error from reqwest.
    ///
    /// For connection issues, see [`Error::ConnectionRefused`].
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The extraction service could not be reached.
    #[error("Could not connect to the extraction service")]
    ConnectionRefused,

    /// The service answered with a non-success status.
    ///
    /// Covers rejected API keys, quota exhaustion, and server errors.
    #[error("Extraction service error ({status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service, or the status reason.
        message: String,
    },

    /// The service returned no text for the image.
    #[error("Extraction service returned an empty response")]
    EmptyResponse,

    /// The returned text is not the expected contact JSON object.
    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The user-facing category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyResponse => ErrorCategory::EmptyResponse,
            Error::MalformedResponse(_) => ErrorCategory::Malformed,
            _ => ErrorCategory::Transport,
        }
    }
}

/// The three failure categories surfaced to users after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The service returned nothing, usually because of a poor image.
    EmptyResponse,
    /// The card layout could not be read into fields.
    Malformed,
    /// Network, authentication, or any other failure.
    Transport,
}

impl ErrorCategory {
    /// Guidance text to show the user for this category.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::EmptyResponse => {
                "The AI returned an empty response. The image might be blurry, out of focus, \
                 or poorly lit. Please try again with a clearer picture."
            }
            ErrorCategory::Malformed => {
                "The AI could not read the card's layout. Please try a different angle or \
                 better lighting."
            }
            ErrorCategory::Transport => {
                "Failed to connect to the AI service. Please check your network connection \
                 and try again."
            }
        }
    }
}

/// A specialized Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(Error::EmptyResponse.category(), ErrorCategory::EmptyResponse);
        assert_eq!(
            Error::MalformedResponse("x".into()).category(),
            ErrorCategory::Malformed
        );
        assert_eq!(Error::ConnectionRefused.category(), ErrorCategory::Transport);
        assert_eq!(
            Error::Service {
                status: 403,
                message: "API key not valid".into()
            }
            .category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            Error::Config("no key".into()).category(),
            ErrorCategory::Transport
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        assert!(ErrorCategory::EmptyResponse.user_message().contains("blurry"));
        assert!(ErrorCategory::Malformed.user_message().contains("layout"));
        assert!(ErrorCategory::Transport.user_message().contains("network"));
    }
}
