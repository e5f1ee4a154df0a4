//! On-disk knowledge base: three JSON artifacts in one directory

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::knowledge_base::{
    Document, DocumentMetadata, KnowledgeIndex, SparseMatrix, TfidfVectorizer,
};
use crate::domain::DomainError;

pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const MATRIX_FILE: &str = "tfidf_matrix.json";
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Parallel arrays, `documents[i]` is described by `metadata[i]`
#[derive(Debug, Serialize, Deserialize)]
struct DocumentsFile {
    documents: Vec<String>,
    metadata: Vec<DocumentMetadata>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|e| {
        DomainError::storage(format!("Failed to write {}: {}", path.display(), e))
    })?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            DomainError::not_found(format!("Knowledge base file missing: {}", path.display()))
        }
        _ => DomainError::from(e),
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        DomainError::knowledge_base(format!("Corrupt artifact {}: {}", path.display(), e))
    })
}

/// Persist a built index to `dir`, creating it if needed
pub fn save_index(index: &KnowledgeIndex, dir: impl AsRef<Path>) -> Result<(), DomainError> {
    let dir = dir.as_ref();
    let model = index
        .model()
        .ok_or_else(|| DomainError::knowledge_base("Index must be built before it is saved"))?;

    std::fs::create_dir_all(dir)?;

    let documents = DocumentsFile {
        documents: index.documents().iter().map(|d| d.text().to_string()).collect(),
        metadata: index.documents().iter().map(|d| d.metadata().clone()).collect(),
    };

    write_json(&dir.join(VECTORIZER_FILE), &model.vectorizer)?;
    write_json(&dir.join(MATRIX_FILE), &model.matrix)?;
    write_json(&dir.join(DOCUMENTS_FILE), &documents)?;

    tracing::info!(
        path = %dir.display(),
        documents = index.len(),
        features = model.vectorizer.vocabulary_size(),
        "Knowledge base saved"
    );
    Ok(())
}

/// Load a previously saved index. All three artifacts must be present.
pub fn load_index(dir: impl AsRef<Path>) -> Result<KnowledgeIndex, DomainError> {
    let dir = dir.as_ref();

    let missing: Vec<PathBuf> = [VECTORIZER_FILE, MATRIX_FILE, DOCUMENTS_FILE]
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| !path.exists())
        .collect();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        return Err(DomainError::not_found(format!(
            "Knowledge base incomplete, missing: {}",
            names.join(", ")
        )));
    }

    let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
    let matrix: SparseMatrix = read_json(&dir.join(MATRIX_FILE))?;
    let stored: DocumentsFile = read_json(&dir.join(DOCUMENTS_FILE))?;

    if stored.documents.len() != stored.metadata.len() {
        return Err(DomainError::knowledge_base(format!(
            "{} has {} documents but {} metadata entries",
            DOCUMENTS_FILE,
            stored.documents.len(),
            stored.metadata.len()
        )));
    }

    let documents: Vec<Document> = stored
        .documents
        .into_iter()
        .zip(stored.metadata)
        .map(|(text, metadata)| Document::from_parts(text, metadata))
        .collect();

    let index = KnowledgeIndex::from_parts(documents, vectorizer, matrix)?;
    tracing::info!(path = %dir.display(), documents = index.len(), "Knowledge base loaded");
    Ok(index)
}
