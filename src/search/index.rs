//! TF-IDF inverted index over entry names and desc snippets.

use std::collections::HashMap;

use rust_stemmers::{Algorithm, Stemmer};

use super::tokenize::{TermHash, hash_term, tokenize_and_stem};

/// A searchable term index. Documents are the dense entry indices handed to
/// [`TermBuilder`](super::tokenize::TermBuilder); scores are precomputed
/// TF-IDF weights.
#[derive(Debug, Clone)]
pub(crate) struct InvertedIndex {
    /// Term hash to `(entry_index, score)` pairs, sorted by score descending.
    terms: HashMap<TermHash, Vec<(usize, f32)>>,
}

impl InvertedIndex {
    pub(super) fn new(terms: HashMap<TermHash, Vec<(usize, f32)>>) -> Self {
        Self { terms }
    }

    /// Entries matching the query, best first.
    ///
    /// The query is tokenized and stemmed exactly like indexed text, so
    /// `parsing` finds `parse` and `GraphemeCursor` finds `grapheme` and
    /// `cursor` documents. Entries hit by several tokens add their scores.
    pub(crate) fn search(&self, query: &str) -> Vec<(usize, f32)> {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(query, &stemmer);
        if tokens.is_empty() {
            return vec![];
        }

        let mut combined: HashMap<usize, f32> = HashMap::new();
        for token in &tokens {
            if let Some(hits) = self.terms.get(&hash_term(token)) {
                for (entry, score) in hits {
                    *combined.entry(*entry).or_insert(0.0) += score;
                }
            }
        }

        let mut results: Vec<_> = combined.into_iter().collect();
        results.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        results
    }

    /// Number of distinct terms.
    pub(crate) fn term_count(&self) -> usize {
        self.terms.len()
    }
}
