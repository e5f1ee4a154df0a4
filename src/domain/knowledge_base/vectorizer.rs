//! TF-IDF term weighting over unigrams and bigrams

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::stopwords::is_stop_word;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Vectorizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfidfConfig {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub sublinear_tf: bool,
    pub remove_stop_words: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 8000,
            ngram_range: (1, 2),
            sublinear_tf: true,
            remove_stop_words: true,
        }
    }
}

/// Sparse row: `(feature index, weight)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f64)>,
}

impl SparseVector {
    fn from_unsorted(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; zero when either side is empty
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            self.dot(other) / denom
        }
    }

    fn max_index(&self) -> Option<u32> {
        self.entries.last().map(|(index, _)| *index)
    }
}

/// Document-term matrix, one L2-normalised row per document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub n_features: usize,
    pub rows: Vec<SparseVector>,
}

impl SparseMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when every stored column index fits the declared width
    pub fn is_consistent(&self) -> bool {
        self.rows
            .iter()
            .filter_map(SparseVector::max_index)
            .all(|index| (index as usize) < self.n_features)
    }
}

/// Fitted TF-IDF model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit on a corpus and return the model with the transformed corpus
    pub fn fit_transform<S: AsRef<str>>(config: TfidfConfig, corpus: &[S]) -> (Self, SparseMatrix) {
        let analyzed: Vec<Vec<String>> = corpus
            .iter()
            .map(|text| analyze(&config, text.as_ref()))
            .collect();

        let mut term_freq: BTreeMap<&str, u64> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, u64> = HashMap::new();
        for terms in &analyzed {
            let mut seen: Vec<&str> = Vec::new();
            for term in terms {
                *term_freq.entry(term.as_str()).or_default() += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                }
            }
            for term in seen {
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        // Alphabetical iteration plus a stable sort keeps ties in term order.
        let mut ranked: Vec<(&str, u64)> = term_freq.into_iter().collect();
        if ranked.len() > config.max_features {
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.truncate(config.max_features);
        }
        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_docs = analyzed.len() as f64;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, term) in kept.iter().enumerate() {
            let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert((*term).to_string(), index as u32);
        }

        let vectorizer = Self {
            config,
            vocabulary,
            idf,
        };
        let rows = analyzed
            .iter()
            .map(|terms| vectorizer.weigh(terms))
            .collect();
        let matrix = SparseMatrix {
            n_features: vectorizer.idf.len(),
            rows,
        };

        (vectorizer, matrix)
    }

    /// Vectorise text under the fitted vocabulary; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&analyze(&self.config, text))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    /// True when vocabulary indices and idf weights line up
    pub fn is_consistent(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self
                .vocabulary
                .values()
                .all(|index| (*index as usize) < self.idf.len())
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for term in terms {
            if let Some(index) = self.vocabulary.get(term) {
                *counts.entry(*index).or_default() += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (index, tf * self.idf[index as usize])
            })
            .collect();

        let mut vector = SparseVector::from_unsorted(entries);
        vector.normalize();
        vector
    }
}

/// Lowercase, tokenize, drop stop words, then emit the configured n-grams
pub fn analyze(config: &TfidfConfig, text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !config.remove_stop_words || !is_stop_word(token))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
