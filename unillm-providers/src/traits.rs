//! Common traits for provider implementations

use crate::config::ProviderConfig;
use reqwest::header::HeaderMap;
use serde_json::Value;
use unillm_core::{Error, Request, StreamHistory};

/// Turn raw wire lines into chunks and content blocks
///
/// Implementations never fail: problems with a line are recorded as chunks in
/// the history and the next line is classified as usual.
pub trait StreamClassifier: Send + Sync {
    /// Classify one streamed line, exactly as received minus its terminator
    fn classify(&self, line: &str, history: &mut StreamHistory);

    /// Materialize a complete non-streaming response body
    fn classify_completion(&self, body: &str, history: &mut StreamHistory);
}

/// Convert requests to provider-specific format
pub trait RequestConverter: Send + Sync {
    /// Convert a generic request to provider-specific JSON
    fn convert_request(
        &self,
        request: &Request,
        config: &ProviderConfig,
        stream: bool,
    ) -> Result<Value, Error>;

    /// Full URL the request is posted to
    fn endpoint(&self, config: &ProviderConfig) -> String;

    /// Headers carrying authentication and content type
    fn headers(&self, config: &ProviderConfig) -> Result<HeaderMap, Error>;
}
