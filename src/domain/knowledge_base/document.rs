//! Knowledge base document and search result entities

use serde::{Deserialize, Serialize};

/// Provenance attached to every indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub category: String,
    pub source: String,
}

impl DocumentMetadata {
    pub fn new(category: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            source: source.into(),
        }
    }
}

/// One retrievable unit of text. Never mutated once added to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    metadata: DocumentMetadata,
}

impl Document {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            metadata: DocumentMetadata::new(category, source),
        }
    }

    pub fn from_parts(text: String, metadata: DocumentMetadata) -> Self {
        Self { text, metadata }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &str {
        &self.metadata.category
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }
}

/// A document returned by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f64,
    pub metadata: DocumentMetadata,
}

impl SearchResult {
    pub fn new(document: &Document, score: f64) -> Self {
        Self {
            text: document.text.clone(),
            score,
            metadata: document.metadata.clone(),
        }
    }

    pub fn category(&self) -> &str {
        &self.metadata.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_accessors() {
        let doc = Document::new("HIIT burns 400-600 kcal", "fitness_knowledge", "knowledge_0");
        assert_eq!(doc.text(), "HIIT burns 400-600 kcal");
        assert_eq!(doc.category(), "fitness_knowledge");
        assert_eq!(doc.source(), "knowledge_0");
    }

    #[test]
    fn test_search_result_serialization() {
        let doc = Document::new("text", "calories", "overview");
        let json = serde_json::to_value(SearchResult::new(&doc, 0.5)).unwrap();
        assert_eq!(json["metadata"]["category"], "calories");
        assert_eq!(json["score"], 0.5);
    }
}
