use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::llm::LlmConfig;
use crate::infrastructure::services::ChatSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Directory holding the three persisted index artifacts
    #[serde(default = "default_kb_path")]
    pub path: PathBuf,
    #[serde(default = "default_feature_store_dir")]
    pub feature_store_dir: PathBuf,
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    /// Refuse to serve without a loadable knowledge base
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Zero disables idle session expiry
    #[serde(default)]
    pub session_idle_ttl_secs: u64,
}

fn default_kb_path() -> PathBuf {
    PathBuf::from("models/artifacts/knowledge_base")
}

fn default_feature_store_dir() -> PathBuf {
    PathBuf::from("data/feature_store")
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("models/registry.json")
}

fn default_max_history() -> usize {
    10
}

fn default_top_k() -> usize {
    6
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
            feature_store_dir: default_feature_store_dir(),
            registry_path: default_registry_path(),
            required: false,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            top_k: default_top_k(),
            session_idle_ttl_secs: 0,
        }
    }
}

impl ChatConfig {
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.session_idle_ttl_secs > 0).then(|| Duration::from_secs(self.session_idle_ttl_secs))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Engine tunables assembled from the `chat` and `llm` sections
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            max_history: self.chat.max_history,
            top_k: self.chat.top_k,
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.llm.provider, "ollama");
        assert!(!config.knowledge_base.required);
        assert_eq!(config.chat.max_history, 10);
        assert_eq!(config.chat.top_k, 6);
        assert_eq!(config.chat.idle_ttl(), None);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"{
                    "llm": {"provider": "groq", "model": "llama-3.1-70b"},
                    "chat": {"session_idle_ttl_secs": 900},
                    "logging": {"level": "debug", "format": "json"}
                }"#,
                config::FileFormat::Json,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.model.as_deref(), Some("llama-3.1-70b"));
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.chat.top_k, 6);
        assert_eq!(config.chat.idle_ttl(), Some(Duration::from_secs(900)));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.host, "0.0.0.0");

        let settings = config.chat_settings();
        assert_eq!(settings.max_history, 10);
        assert_eq!(settings.temperature, 0.7);
    }
}
