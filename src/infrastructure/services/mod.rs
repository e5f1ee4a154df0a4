//! Infrastructure services

mod chat_engine;

pub use chat_engine::{ChatEngine, ChatEventStream, ChatSettings};
