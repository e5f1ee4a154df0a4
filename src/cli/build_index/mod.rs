//! Build-index command - fits the knowledge base and writes its artifacts

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::config::KnowledgeBaseConfig;
use crate::domain::DomainError;
use crate::infrastructure::knowledge_base::{save_index, CorpusBuilder};

#[derive(Args, Debug, Default)]
pub struct BuildIndexArgs {
    /// Directory with the exported `*_features.json` files
    #[arg(long)]
    pub feature_store_dir: Option<PathBuf>,

    /// Model registry JSON (skipped when absent)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Output directory for the index artifacts
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: BuildIndexArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let documents = build_and_save(&config.knowledge_base, &args)?;

    println!("Knowledge base built with {} documents", documents);
    Ok(())
}

/// Returns the number of indexed documents
pub fn build_and_save(
    config: &KnowledgeBaseConfig,
    args: &BuildIndexArgs,
) -> Result<usize, DomainError> {
    let feature_store_dir = args
        .feature_store_dir
        .as_deref()
        .unwrap_or(&config.feature_store_dir);
    let registry = args.registry.as_deref().unwrap_or(&config.registry_path);
    let output: &Path = args.output.as_deref().unwrap_or(&config.path);

    let index = CorpusBuilder::new(feature_store_dir)
        .with_registry(registry)
        .build()?;
    save_index(&index, output)?;

    info!(
        path = %output.display(),
        documents = index.len(),
        "Knowledge base saved"
    );
    Ok(index.len())
}
