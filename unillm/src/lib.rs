//! unillm - provider-normalized LLM responses
//!
//! Anthropic, OpenAI and Ollama stream their responses in different wire
//! formats. This crate classifies every line of those streams into a common
//! chunk taxonomy and rebuilds the response as it arrives: the text, the tool
//! calls, and a best-effort parse of structured output that can be checked
//! against a JSON Schema before the response is complete.
//!
//! # Quick Start
//!
//! ```no_run
//! # use unillm::prelude::*;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), unillm::Error> {
//! #     #[cfg(feature = "client")]
//! #     {
//!     let config = ProviderConfig::new(ProviderKind::Ollama);
//!     let client = Client::from_config(config)?;
//!
//!     let request = Request::builder()
//!         .message(Message::user("Name three rivers as JSON"))
//!         .response_schema(serde_json::json!({"type": "object"}))
//!         .build();
//!
//!     let mut stream = client.stream(&request).await?;
//!     while stream.advance().await.is_some() {
//!         println!("{:?}", stream.structured());
//!     }
//!     let generation = stream.finish().await;
//!     println!("{}", generation.text());
//! #     }
//! #     Ok(())
//! # }
//! ```
//!
//! Recorded transcripts can be replayed without a network:
//!
//! ```
//! # #[cfg(feature = "providers")]
//! # {
//! use unillm::providers::Classifier;
//! use unillm::ProviderKind;
//!
//! let history = Classifier::for_provider(ProviderKind::Ollama).replay([
//!     r#"{"message":{"content":"Hello"},"done":false}"#,
//!     r#"{"done":true}"#,
//! ]);
//! assert_eq!(history.full_text(), "Hello");
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export core types
pub use unillm_core::*;

#[cfg(feature = "providers")]
#[cfg_attr(docsrs, doc(cfg(feature = "providers")))]
pub mod providers {
    //! Wire protocols, request conversion and transport
    pub use unillm_providers::*;
}

#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client {
    //! High-level client API
    pub use unillm_client::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use unillm_core::{
        ContentBlock, ContentExtractor, Error, Message, PartialJsonParser, ProviderKind, Request,
        Role, StreamChunk, StreamHistory,
    };

    #[cfg(feature = "providers")]
    pub use unillm_providers::{Classifier, Provider, ProviderConfig, StreamClassifier};

    #[cfg(feature = "client")]
    pub use unillm_client::{Client, Generation, GenerationStream, JsonSchemaValidator};
}
