//! FitFlex Chat
//!
//! Retrieval-augmented gym assistant:
//! - TF-IDF knowledge base built from exported gym datasets
//! - Local (Ollama) and hosted (Groq, OpenAI) generation backends
//! - Per-session conversational memory with token streaming over SSE

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::state::AppState;
use crate::config::KnowledgeBaseConfig;
use crate::domain::{DomainError, KnowledgeIndex};
use crate::infrastructure::knowledge_base::load_index;
use crate::infrastructure::llm::LlmProviderFactory;
use crate::infrastructure::services::ChatEngine;

/// Load the persisted knowledge base.
///
/// When the base is not `required`, a missing or unreadable one yields
/// `None` and the service answers without retrieved context.
pub fn load_knowledge_base(
    config: &KnowledgeBaseConfig,
) -> Result<Option<KnowledgeIndex>, DomainError> {
    match load_index(&config.path) {
        Ok(index) => {
            info!(
                path = %config.path.display(),
                documents = index.len(),
                "Knowledge base loaded"
            );
            Ok(Some(index))
        }
        Err(e) if config.required => Err(e),
        Err(e) => {
            warn!(
                path = %config.path.display(),
                error = %e,
                "Knowledge base unavailable, answering without context. Run `fitflex-chat build-index` to create it"
            );
            Ok(None)
        }
    }
}

/// Wire the configured backend and knowledge base into a chat engine
pub async fn create_chat_engine(config: &AppConfig) -> anyhow::Result<ChatEngine> {
    let llm = LlmProviderFactory::create(&config.llm)?;
    info!(
        provider = llm.provider_name(),
        model = llm.model(),
        "LLM provider configured"
    );

    if config.llm.ensure_model_on_startup {
        match llm.ensure_model().await {
            Ok(true) => info!(model = llm.model(), "Model ready"),
            Ok(false) => warn!(model = llm.model(), "Model could not be pulled"),
            Err(e) => warn!(error = %e, "Backend not reachable at startup"),
        }
    }

    let index = load_knowledge_base(&config.knowledge_base)?;
    Ok(ChatEngine::with_settings(llm, index, config.chat_settings()))
}

pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let engine = create_chat_engine(config).await?;
    Ok(AppState::new(Arc::new(engine)))
}
