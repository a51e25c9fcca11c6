//! Conversions from transport and serialization errors to core errors

use unillm_core::Error as CoreError;

/// Convert network errors to core errors
pub fn network_error(error: reqwest::Error) -> CoreError {
    if error.is_timeout() {
        return CoreError::Timeout;
    }
    CoreError::Network {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Convert serialization errors to core errors
pub fn serialization_error(error: serde_json::Error) -> CoreError {
    CoreError::Serialization {
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}

/// Error for a non-success HTTP status
pub fn status_error(status: reqwest::StatusCode, body: String) -> CoreError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    CoreError::Http {
        status: status.as_u16(),
        message,
    }
}
