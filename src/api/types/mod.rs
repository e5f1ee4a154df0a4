//! Request and response bodies of the chat service

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatRequestBody, StreamFrame, SuggestionsResponse};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
