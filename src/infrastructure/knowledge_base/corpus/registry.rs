//! Model registry summaries

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::domain::{DomainError, KnowledgeIndex};

const CATEGORY: &str = "model_info";
const LISTED_FEATURES: usize = 10;

/// One trained model as recorded by the training pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub algorithm: String,
    #[serde(rename = "type", default = "unknown")]
    pub model_type: String,
    #[serde(default)]
    pub metrics: serde_json::Map<String, Value>,
    #[serde(default)]
    pub n_train: Option<Value>,
    #[serde(default)]
    pub n_test: Option<Value>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ModelEntry {
    pub fn describe(&self) -> String {
        let metrics: Vec<String> = self
            .metrics
            .iter()
            .map(|(k, v)| format!("{}={}", k, plain(v)))
            .collect();
        let features: Vec<&str> = self
            .features
            .iter()
            .take(LISTED_FEATURES)
            .map(String::as_str)
            .collect();
        let ellipsis = if self.features.len() > LISTED_FEATURES {
            "…"
        } else {
            ""
        };
        let count = |v: &Option<Value>| v.as_ref().map_or_else(|| "?".to_string(), plain);

        format!(
            "ML Model '{}' ({} {}): trained on {} samples, tested on {} samples. Performance metrics: {}. Uses {} features: {}{}.",
            self.name,
            self.algorithm,
            self.model_type,
            count(&self.n_train),
            count(&self.n_test),
            metrics.join(", "),
            self.features.len(),
            features.join(", "),
            ellipsis
        )
    }
}

pub fn load_registry(path: &Path) -> Result<Vec<ModelEntry>, DomainError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        DomainError::validation(format!("Invalid model registry {}: {}", path.display(), e))
    })
}

/// Add one document per registered model
pub fn add_model_info(index: &mut KnowledgeIndex, entries: &[ModelEntry]) {
    for entry in entries {
        index.add(entry.describe(), CATEGORY, entry.name.clone());
    }
}
