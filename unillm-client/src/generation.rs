//! Results of a request, finished or in flight

use std::sync::Arc;
use tracing::debug;
use unillm_core::{
    ChunkKind, ContentExtractor, Error, ExtractedContent, PartialJsonResult, Result,
    SchemaValidator, StreamChunk, StreamHistory, Validation,
};
use unillm_providers::ResponseStream;

/// A finished response
#[derive(Debug, Clone)]
pub struct Generation {
    /// Everything that was received
    pub history: StreamHistory,
    /// The reconstructed text and tool calls
    pub content: ExtractedContent,
    /// The structured object handed to the validator
    pub structured: PartialJsonResult,
    /// Schema validation of `structured`, when a schema was given
    pub validation: Option<Validation>,
}

impl Generation {
    /// Project and validate a finished history
    pub fn new(history: StreamHistory, validator: Option<&dyn SchemaValidator>) -> Self {
        let content = ContentExtractor::extract(&history);
        let structured = ContentExtractor::structured(&history);
        let validation = validator.map(|v| Validation::complete(v, &structured));
        Self {
            history,
            content,
            structured,
            validation,
        }
    }

    /// The response text
    pub fn text(&self) -> &str {
        &self.content.text
    }

    /// The chunk that failed the call, if any
    pub fn failure(&self) -> Option<&StreamChunk> {
        self.history.failure()
    }

    /// Error description of the failing chunk
    pub fn error(&self) -> Option<&str> {
        self.failure()
            .map(|chunk| chunk.error().unwrap_or_else(|| chunk.kind().as_str()))
    }

    /// The call did not fail and, when validated, matched its schema
    pub fn is_success(&self) -> bool {
        self.failure().is_none()
            && self
                .validation
                .as_ref()
                .map(|validation| validation.valid)
                .unwrap_or(true)
    }

    /// Turn a failed call into an error
    ///
    /// Schema mismatches are not errors here; inspect `validation` for those.
    pub fn into_result(self) -> Result<Self> {
        let error = match self.failure() {
            None => return Ok(self),
            Some(chunk) => {
                let message = chunk.error().unwrap_or_default().to_string();
                match chunk.kind() {
                    ChunkKind::HttpError => Error::Network {
                        message,
                        source: None,
                    },
                    _ => Error::Serialization {
                        message,
                        source: None,
                    },
                }
            }
        };
        Err(error)
    }
}

/// A response that is still streaming
///
/// Each [`advance`](GenerationStream::advance) consumes one line. Between
/// calls the text, the partial structured object and its partial validation
/// reflect everything received so far.
pub struct GenerationStream {
    inner: ResponseStream,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl GenerationStream {
    /// Wrap a provider stream
    pub fn new(inner: ResponseStream, validator: Option<Arc<dyn SchemaValidator>>) -> Self {
        Self { inner, validator }
    }

    /// Consume the next line, returning the chunks it produced
    pub async fn advance(&mut self) -> Option<&[StreamChunk]> {
        self.inner.advance().await
    }

    /// The history so far
    pub fn history(&self) -> &StreamHistory {
        self.inner.history()
    }

    /// Text received so far
    pub fn text(&self) -> String {
        self.history().full_text()
    }

    /// Best-effort structured object from what has arrived
    pub fn structured(&self) -> PartialJsonResult {
        ContentExtractor::structured(self.history())
    }

    /// Validate the settled part of the structured object
    pub fn partial_validation(&self) -> Option<Validation> {
        let validator = self.validator.as_deref()?;
        Some(Validation::partial(validator, &self.structured()))
    }

    /// Read the rest of the stream and validate the result
    pub async fn finish(self) -> Generation {
        let history = self.inner.collect().await;
        debug!(chunks = history.chunks().len(), "Generation stream finished");
        Generation::new(history, self.validator.as_deref())
    }
}
