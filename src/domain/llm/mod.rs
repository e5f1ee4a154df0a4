//! LLM provider domain models and traits

mod message;
mod provider;
mod request;

pub use message::{with_system, Message, MessageRole};
pub use provider::{LlmProvider, LlmStream, StreamFragment};
pub use request::{ChatRequest, GenerateRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
