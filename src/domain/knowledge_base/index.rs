//! In-memory TF-IDF knowledge index

use super::document::{Document, SearchResult};
use super::vectorizer::{SparseMatrix, TfidfConfig, TfidfVectorizer};
use crate::domain::DomainError;

/// Minimum cosine similarity for a document to count as relevant
pub const RELEVANCE_FLOOR: f64 = 0.02;

/// Default number of hits returned by [`KnowledgeIndex::query`]
pub const DEFAULT_TOP_K: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FittedModel {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) matrix: SparseMatrix,
}

/// Ordered document collection plus its fitted similarity model.
///
/// Row `i` of the matrix always describes document `i`. Documents added after
/// [`build`](Self::build) are not searchable until the next build.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    config: TfidfConfig,
    documents: Vec<Document>,
    model: Option<FittedModel>,
}

impl KnowledgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TfidfConfig) -> Self {
        Self {
            config,
            documents: Vec::new(),
            model: None,
        }
    }

    /// Rebuild an index from persisted parts, rejecting inconsistent sets
    pub fn from_parts(
        documents: Vec<Document>,
        vectorizer: TfidfVectorizer,
        matrix: SparseMatrix,
    ) -> Result<Self, DomainError> {
        if matrix.n_rows() != documents.len() {
            return Err(DomainError::knowledge_base(format!(
                "matrix has {} rows but {} documents were stored",
                matrix.n_rows(),
                documents.len()
            )));
        }
        if matrix.n_features != vectorizer.vocabulary_size()
            || !matrix.is_consistent()
            || !vectorizer.is_consistent()
        {
            return Err(DomainError::knowledge_base(
                "vectorizer vocabulary does not match matrix dimensions",
            ));
        }

        Ok(Self {
            config: vectorizer.config().clone(),
            documents,
            model: Some(FittedModel { vectorizer, matrix }),
        })
    }

    pub fn add(
        &mut self,
        text: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) {
        self.documents.push(Document::new(text, category, source));
    }

    /// Fit the vectorizer over every accumulated document
    pub fn build(&mut self) {
        let texts: Vec<&str> = self.documents.iter().map(Document::text).collect();
        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(self.config.clone(), &texts);
        self.model = Some(FittedModel { vectorizer, matrix });
    }

    /// Up to `top_k` documents above the relevance floor, most similar first.
    /// Equal scores keep insertion order.
    pub fn query(&self, question: &str, top_k: usize) -> Vec<SearchResult> {
        let Some(model) = &self.model else {
            return Vec::new();
        };

        let query = model.vectorizer.transform(question);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = model
            .matrix
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, query.cosine(row)))
            .filter(|(_, score)| *score > RELEVANCE_FLOOR)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(i, score)| SearchResult::new(&self.documents[i], score))
            .collect()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.model.is_some()
    }

    pub(crate) fn model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }
}
