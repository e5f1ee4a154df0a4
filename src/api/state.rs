//! Shared handler state

use std::sync::Arc;

use crate::infrastructure::services::ChatEngine;

#[derive(Debug, Clone)]
pub struct AppState {
    pub chat_engine: Arc<ChatEngine>,
}

impl AppState {
    pub fn new(chat_engine: Arc<ChatEngine>) -> Self {
        Self { chat_engine }
    }
}
