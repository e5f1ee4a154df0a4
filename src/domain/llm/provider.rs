use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;

use super::{ChatRequest, GenerateRequest};
use crate::domain::DomainError;

/// One piece of incrementally generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Generated text as received from the backend
    Text(String),
    /// Descriptive failure; always the last fragment of a stream
    Error(String),
}

impl StreamFragment {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Error(text) => text,
        }
    }
}

/// Lazy, finite, non-restartable stream of generated fragments
pub type LlmStream = Pin<Box<dyn Stream<Item = StreamFragment> + Send>>;

/// Uniform interface over generation backends (Ollama, Groq, OpenAI)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Blocking single-prompt generation, returns trimmed text
    async fn generate(&self, request: GenerateRequest) -> Result<String, DomainError>;

    /// Streaming single-prompt generation.
    ///
    /// Transport failures never surface as `Err`: they end the stream with a
    /// single [`StreamFragment::Error`].
    async fn stream(&self, request: GenerateRequest) -> LlmStream;

    /// Multi-turn generation with an explicit message history
    async fn chat(&self, request: ChatRequest) -> Result<String, DomainError>;

    /// Cheap availability check
    async fn is_available(&self) -> bool;

    /// Models installed on (or configured for) the backend
    async fn list_models(&self) -> Vec<String>;

    /// Make sure the configured model is installed, pulling it if needed
    async fn ensure_model(&self) -> Result<bool, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Configured model identity
    fn model(&self) -> &str;
}
