//! API layer - HTTP endpoints of the chat service

pub mod chat;
pub mod health;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
