use std::path::{Path, PathBuf};

use super::corpus::{add_fitness_knowledge, add_model_info, load_registry, FeatureTable, DATASETS};
use crate::domain::{DomainError, KnowledgeIndex};

/// Assembles the knowledge base from everything the data pipeline exported
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    feature_store_dir: PathBuf,
    registry_path: Option<PathBuf>,
}

impl CorpusBuilder {
    pub fn new(feature_store_dir: impl Into<PathBuf>) -> Self {
        Self {
            feature_store_dir: feature_store_dir.into(),
            registry_path: None,
        }
    }

    pub fn with_registry(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Generate every document and fit the index. Missing sources are skipped.
    pub fn build(&self) -> Result<KnowledgeIndex, DomainError> {
        let mut index = KnowledgeIndex::new();

        for dataset in DATASETS.iter() {
            let path = self.feature_store_dir.join(dataset.file);
            if !path.exists() {
                tracing::info!(file = dataset.file, "Skipping feature store (not found)");
                continue;
            }

            let table = FeatureTable::load(&path)?;
            let before = index.len();
            (dataset.generate)(&mut index, &table);
            tracing::info!(
                file = dataset.file,
                rows = table.len(),
                documents = index.len() - before,
                "Loaded feature store"
            );
        }

        if let Some(path) = self.registry_path.as_deref().filter(|p| p.exists()) {
            let entries = load_registry(path)?;
            add_model_info(&mut index, &entries);
            tracing::info!(models = entries.len(), "Loaded model registry");
        }

        add_fitness_knowledge(&mut index);
        index.build();

        tracing::info!(documents = index.len(), "Knowledge base built");
        Ok(index)
    }

    pub fn feature_store_dir(&self) -> &Path {
        &self.feature_store_dir
    }
}
