//! Closed dispatch over the supported wire protocols

use crate::anthropic::AnthropicClassifier;
use crate::ollama::OllamaClassifier;
use crate::openai::OpenAIClassifier;
use crate::traits::StreamClassifier;
use unillm_core::{ProviderKind, StreamHistory};

/// The classifier for one provider's wire protocol
#[derive(Debug, Clone, Copy)]
pub enum Classifier {
    /// Anthropic Messages SSE
    Anthropic(AnthropicClassifier),
    /// OpenAI Responses SSE
    OpenAI(OpenAIClassifier),
    /// Ollama NDJSON
    Ollama(OllamaClassifier),
}

impl Classifier {
    /// The classifier for a provider
    pub fn for_provider(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Anthropic => Classifier::Anthropic(AnthropicClassifier),
            ProviderKind::OpenAI => Classifier::OpenAI(OpenAIClassifier),
            ProviderKind::Ollama => Classifier::Ollama(OllamaClassifier),
        }
    }

    /// The provider this classifier speaks for
    pub fn kind(&self) -> ProviderKind {
        match self {
            Classifier::Anthropic(_) => ProviderKind::Anthropic,
            Classifier::OpenAI(_) => ProviderKind::OpenAI,
            Classifier::Ollama(_) => ProviderKind::Ollama,
        }
    }

    /// Classify a recorded transcript into a fresh history
    pub fn replay<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> StreamHistory {
        let mut history = StreamHistory::new();
        for line in lines {
            self.classify(line, &mut history);
        }
        history
    }

    fn inner(&self) -> &dyn StreamClassifier {
        match self {
            Classifier::Anthropic(c) => c,
            Classifier::OpenAI(c) => c,
            Classifier::Ollama(c) => c,
        }
    }
}

impl From<ProviderKind> for Classifier {
    fn from(kind: ProviderKind) -> Self {
        Self::for_provider(kind)
    }
}

impl StreamClassifier for Classifier {
    fn classify(&self, line: &str, history: &mut StreamHistory) {
        self.inner().classify(line, history);
    }

    fn classify_completion(&self, body: &str, history: &mut StreamHistory) {
        self.inner().classify_completion(body, history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unillm_core::ChunkKind;

    #[test]
    fn test_for_provider_round_trips_kind() {
        for kind in ProviderKind::ALL {
            assert_eq!(Classifier::for_provider(kind).kind(), kind);
        }
    }

    #[test]
    fn test_replay_dispatches() {
        let history = Classifier::from(ProviderKind::Ollama).replay([
            r#"{"message":{"content":"hi"},"done":false}"#,
            r#"{"done":true}"#,
        ]);
        assert_eq!(history.full_text(), "hi");
        assert_eq!(
            history.last_chunk().map(|c| c.kind()),
            Some(ChunkKind::CompletionEnd)
        );

        // The same line means different things to different protocols
        let line = "";
        let sse = Classifier::for_provider(ProviderKind::OpenAI).replay([line]);
        assert_eq!(sse.chunks()[0].kind(), ChunkKind::EmptyLine);
    }
}
