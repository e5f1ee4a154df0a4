//! Knowledge base construction and persistence

mod builder;
pub mod corpus;
mod persistence;

pub use builder::CorpusBuilder;
pub use persistence::{load_index, save_index, DOCUMENTS_FILE, MATRIX_FILE, VECTORIZER_FILE};
