//! Error types for the unillm library
//!
//! Problems in provider *data* (malformed lines, unexpected shapes, transport
//! failures mid-stream) are recorded as chunks in the stream history and never
//! surface through this type. [`Error`] covers caller mistakes and failures
//! that happen before a history exists.

use std::error::Error as StdError;
use std::fmt;

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// Everything a unillm call can return as `Err`
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The provider could not be reached or the connection broke
    Network {
        /// What went wrong
        message: String,
        /// Transport error, when there is one
        source: Option<BoxedSource>,
    },

    /// The provider answered with a non-success HTTP status
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, or the status reason when the body was empty
        message: String,
    },

    /// A body could not be encoded or a response did not have the expected shape
    Serialization {
        /// What went wrong
        message: String,
        /// Decoder error, when there is one
        source: Option<BoxedSource>,
    },

    /// The request or its response schema was rejected before sending
    Validation(String),

    /// The provider configuration is unusable
    Configuration(String),

    /// The request exceeded its timeout
    Timeout,
}

impl Error {
    /// A network error without an underlying cause
    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            source: None,
        }
    }

    /// A serialization error without an underlying cause
    pub fn serialization(message: impl Into<String>) -> Self {
        Error::Serialization {
            message: message.into(),
            source: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Network { message, .. } => write!(f, "Network error: {}", message),
            Error::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            Error::Serialization { message, .. } => write!(f, "Serialization error: {}", message),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Timeout => f.write_str("Request timed out"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Network { source, .. } | Error::Serialization { source, .. } => {
                source.as_deref().map(|e| e as &(dyn StdError + 'static))
            }
            _ => None,
        }
    }
}

/// Result type alias for unillm operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Network {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::types::request::BuildError> for Error {
    fn from(err: crate::types::request::BuildError) -> Self {
        Error::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::request::BuildError;
    use std::io;

    #[test]
    fn test_display_matches_http_error_chunks() {
        let error = Error::Http {
            status: 529,
            message: "Overloaded".into(),
        };
        assert_eq!(error.to_string(), "HTTP 529: Overloaded");
        assert_eq!(Error::network("connection reset").to_string(), "Network error: connection reset");
        assert_eq!(Error::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_source_is_kept() {
        assert!(Error::network("refused").source().is_none());

        let error: Error = io::Error::new(io::ErrorKind::ConnectionRefused, "refused").into();
        assert!(matches!(error, Error::Network { .. }));
        assert!(error.source().is_some());

        assert!(Error::Validation("empty request".into()).source().is_none());
    }

    #[test]
    fn test_from_decoder_error() {
        let decode = serde_json::from_str::<serde_json::Value>("{\"type\":").unwrap_err();
        match Error::from(decode) {
            Error::Serialization { message, source } => {
                assert!(message.contains("EOF"));
                assert!(source.is_some());
            }
            other => panic!("Expected serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_build_error() {
        let error = Error::from(BuildError::NoMessages);
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
