//! Knowledge index domain: documents, TF-IDF weighting and similarity search

mod document;
mod index;
mod stopwords;
mod vectorizer;

pub use document::{Document, DocumentMetadata, SearchResult};
pub use index::{KnowledgeIndex, DEFAULT_TOP_K, RELEVANCE_FLOOR};
pub(crate) use index::FittedModel;
pub use vectorizer::{analyze, SparseMatrix, SparseVector, TfidfConfig, TfidfVectorizer};
