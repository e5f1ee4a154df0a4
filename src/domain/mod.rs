//! Domain layer - Core business logic and entities

pub mod chat;
pub mod error;
pub mod knowledge_base;
pub mod llm;

pub use chat::{ChatEvent, ChatReply, ConversationSession, SessionStore, StreamSummary};
pub use error::DomainError;
pub use knowledge_base::{Document, DocumentMetadata, KnowledgeIndex, SearchResult};
pub use llm::{
    ChatRequest, GenerateRequest, LlmProvider, LlmStream, Message, MessageRole, StreamFragment,
};
