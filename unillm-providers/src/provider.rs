//! Request execution for a configured provider

use crate::anthropic::AnthropicConverter;
use crate::classifier::Classifier;
use crate::config::ProviderConfig;
use crate::http::{HttpClient, LineStream, ReqwestClient};
use crate::ollama::OllamaConverter;
use crate::openai::OpenAIConverter;
use crate::traits::{RequestConverter, StreamClassifier};
use futures::{ready, Stream, StreamExt};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};
use unillm_core::{Error, ProviderKind, Request, Result, StreamChunk, StreamHistory};

/// A configured provider bound to an HTTP transport
///
/// Each call gets its own [`StreamHistory`]; the provider itself holds no
/// per-request state and can be shared.
#[derive(Clone)]
pub struct Provider {
    config: ProviderConfig,
    client: Arc<dyn HttpClient>,
    classifier: Classifier,
}

impl Provider {
    /// Create a provider with the default reqwest transport
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::with_timeout(config.timeout)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a provider with a custom transport
    pub fn with_client(config: ProviderConfig, client: Arc<dyn HttpClient>) -> Self {
        let classifier = Classifier::for_provider(config.kind);
        Self {
            config,
            client,
            classifier,
        }
    }

    /// The provider configuration
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Which provider this is
    pub fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    /// The classifier used for responses
    pub fn classifier(&self) -> Classifier {
        self.classifier
    }

    fn converter(&self) -> &'static dyn RequestConverter {
        match self.config.kind {
            ProviderKind::Anthropic => &AnthropicConverter,
            ProviderKind::OpenAI => &OpenAIConverter,
            ProviderKind::Ollama => &OllamaConverter,
        }
    }

    fn prepare(&self, request: &Request, stream: bool) -> Result<(String, HeaderMap, Value)> {
        if request.messages.is_empty() {
            return Err(Error::Validation(
                "Request must contain at least one message".into(),
            ));
        }
        let converter = self.converter();
        let body = converter.convert_request(request, &self.config, stream)?;
        let headers = converter.headers(&self.config)?;
        Ok((converter.endpoint(&self.config), headers, body))
    }

    /// Send a non-streaming request
    ///
    /// Transport failures do not make this return `Err`: the history ends
    /// with an http-error chunk instead.
    pub async fn complete(&self, request: &Request) -> Result<StreamHistory> {
        let (url, headers, body) = self.prepare(request, false)?;
        info!(provider = %self.kind(), url = %url, "Sending request");

        let mut history = StreamHistory::new();
        match self.client.post(&url, headers, body).await {
            Ok(text) => self.classifier.classify_completion(&text, &mut history),
            Err(e) => {
                warn!(provider = %self.kind(), error = %e, "Request failed");
                history.push_chunk(StreamChunk::http_error(e.to_string()));
            }
        }

        debug!(
            provider = %self.kind(),
            chunks = history.chunks().len(),
            blocks = history.content_blocks().len(),
            "Request finished"
        );
        Ok(history)
    }

    /// Send a streaming request
    pub async fn stream(&self, request: &Request) -> Result<ResponseStream> {
        let (url, headers, body) = self.prepare(request, true)?;
        info!(provider = %self.kind(), url = %url, "Opening stream");

        match self.client.post_lines(&url, headers, body).await {
            Ok(lines) => Ok(ResponseStream::new(lines, self.classifier)),
            Err(e) => {
                warn!(provider = %self.kind(), error = %e, "Stream request failed");
                Ok(ResponseStream::failed(self.classifier, e))
            }
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.config.kind)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

/// An in-flight streaming response
///
/// Each call to [`advance`](ResponseStream::advance) consumes one line and
/// returns the chunks it produced. The history can be read between calls.
pub struct ResponseStream {
    lines: Option<LineStream>,
    pending_error: Option<Error>,
    classifier: Classifier,
    history: StreamHistory,
}

impl ResponseStream {
    /// Classify lines from `lines` with `classifier`
    pub fn new(lines: LineStream, classifier: Classifier) -> Self {
        Self {
            lines: Some(lines),
            pending_error: None,
            classifier,
            history: StreamHistory::new(),
        }
    }

    /// A stream whose request failed before any line arrived
    pub fn failed(classifier: Classifier, error: Error) -> Self {
        Self {
            lines: None,
            pending_error: Some(error),
            classifier,
            history: StreamHistory::new(),
        }
    }

    /// Consume the next line
    ///
    /// Returns the chunks added by that line, or `None` once the stream has
    /// ended. A transport error adds one http-error chunk and ends the stream.
    pub async fn advance(&mut self) -> Option<&[StreamChunk]> {
        let before = self.history.chunks().len();
        if !self.flush_pending_error() {
            let next = self.lines.as_mut()?.next().await;
            if !self.apply(next) {
                return None;
            }
        }
        Some(&self.history.chunks()[before..])
    }

    fn flush_pending_error(&mut self) -> bool {
        match self.pending_error.take() {
            Some(error) => {
                self.history.push_chunk(StreamChunk::http_error(error.to_string()));
                true
            }
            None => false,
        }
    }

    /// Classify one item from the line stream; `false` once it has ended
    fn apply(&mut self, next: Option<Result<String>>) -> bool {
        match next {
            Some(Ok(line)) => self.classifier.classify(&line, &mut self.history),
            Some(Err(e)) => {
                warn!(error = %e, "Stream interrupted");
                self.history.push_chunk(StreamChunk::http_error(e.to_string()));
                self.lines = None;
            }
            None => {
                debug!(chunks = self.history.chunks().len(), "Stream ended");
                self.lines = None;
                return false;
            }
        }
        true
    }

    /// The history so far
    pub fn history(&self) -> &StreamHistory {
        &self.history
    }

    /// Whether the stream has ended
    pub fn is_closed(&self) -> bool {
        self.lines.is_none() && self.pending_error.is_none()
    }

    /// Drive the stream to its end and return the history
    pub async fn collect(mut self) -> StreamHistory {
        while self.advance().await.is_some() {}
        self.history
    }

    /// Stop reading and return the history so far
    pub fn into_history(self) -> StreamHistory {
        self.history
    }
}

/// Yields the chunks each line produced, as [`advance`](ResponseStream::advance) does
impl Stream for ResponseStream {
    type Item = Vec<StreamChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let before = this.history.chunks().len();
        if !this.flush_pending_error() {
            let Some(lines) = this.lines.as_mut() else {
                return Poll::Ready(None);
            };
            let next = ready!(lines.poll_next_unpin(cx));
            if !this.apply(next) {
                return Poll::Ready(None);
            }
        }
        Poll::Ready(Some(this.history.chunks()[before..].to_vec()))
    }
}
