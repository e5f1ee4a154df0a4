use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::ollama::{OllamaProvider, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use super::openai_compatible::{
    OpenAiCompatibleProvider, DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
};
use crate::domain::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::domain::{DomainError, LlmProvider};

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    Groq,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            other => Err(DomainError::configuration(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

/// `llm` configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Longest silence tolerated from the backend while connected
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub ensure_model_on_startup: bool,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            ensure_model_on_startup: false,
        }
    }
}

/// Connection settings after defaults and environment overrides are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLlm {
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl LlmConfig {
    /// Apply per-provider defaults and environment overrides.
    ///
    /// For Ollama, `OLLAMA_BASE_URL`/`OLLAMA_URL` and `OLLAMA_MODEL` win over
    /// configured values. Hosted providers fall back to `GROQ_API_KEY` or
    /// `OPENAI_API_KEY` when no key is configured.
    pub fn resolve_with<F>(&self, env: F) -> Result<ResolvedLlm, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind: ProviderKind = self.provider.parse()?;
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let resolved = match kind {
            ProviderKind::Ollama => ResolvedLlm {
                kind,
                base_url: non_empty(env("OLLAMA_BASE_URL"))
                    .or_else(|| non_empty(env("OLLAMA_URL")))
                    .or_else(|| self.base_url.clone())
                    .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
                model: non_empty(env("OLLAMA_MODEL"))
                    .or_else(|| self.model.clone())
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                api_key: String::new(),
            },
            ProviderKind::Groq => ResolvedLlm {
                kind,
                base_url: self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
                model: self
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                api_key: non_empty(self.api_key.clone())
                    .or_else(|| env("GROQ_API_KEY"))
                    .unwrap_or_default(),
            },
            ProviderKind::OpenAi => ResolvedLlm {
                kind,
                base_url: self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: self
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_key: non_empty(self.api_key.clone())
                    .or_else(|| env("OPENAI_API_KEY"))
                    .unwrap_or_default(),
            },
        };

        Ok(resolved)
    }

    pub fn resolve(&self) -> Result<ResolvedLlm, DomainError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the configured provider. Unknown provider names fail here.
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let resolved = config.resolve()?;
        Self::from_resolved(&resolved, config)
    }

    pub fn from_resolved(
        resolved: &ResolvedLlm,
        config: &LlmConfig,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client =
            HttpClient::with_read_timeout(Duration::from_secs(config.request_timeout_secs))?;

        tracing::info!(
            provider = resolved.kind.as_str(),
            model = %resolved.model,
            base_url = %resolved.base_url,
            "Creating LLM provider"
        );

        let provider: Arc<dyn LlmProvider> = match resolved.kind {
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(
                http_client,
                &resolved.base_url,
                &resolved.model,
            )),
            ProviderKind::Groq | ProviderKind::OpenAi => {
                if resolved.api_key.is_empty() {
                    tracing::warn!(
                        provider = resolved.kind.as_str(),
                        "No API key configured, provider will report unavailable"
                    );
                }
                Arc::new(
                    OpenAiCompatibleProvider::new(
                        http_client,
                        resolved.kind.as_str(),
                        &resolved.api_key,
                        &resolved.base_url,
                        &resolved.model,
                    )
                    .with_max_tokens(config.max_tokens),
                )
            }
        };

        Ok(provider)
    }
}
