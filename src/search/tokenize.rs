//! Tokenization and stemming for the doc-text index.

use ahash::{AHashMap, AHasher};
use rust_stemmers::{Algorithm, Stemmer};
use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use super::index::InvertedIndex;

/// Minimum token length worth indexing. 1, so short type names like `u8`
/// (tokenized as `u`) and `io` stay searchable.
const MIN_TOKEN_LENGTH: usize = 1;

/// High-frequency English words dropped from the index; they match nearly
/// every desc snippet and add nothing to ranking.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Term hash for fast lookup.
pub(crate) type TermHash = u64;

/// Accumulates per-document term frequencies, then folds them into TF-IDF
/// scores. Documents are dense indices assigned by the caller.
pub(crate) struct TermBuilder {
    /// Flat `(term, document)` to raw TF score.
    term_docs: HashMap<(TermHash, usize), f32>,
    /// Document to total term count, for length normalization.
    doc_lengths: HashMap<usize, usize>,
    stemmer: Stemmer,
}

impl Default for TermBuilder {
    fn default() -> Self {
        Self {
            term_docs: HashMap::default(),
            doc_lengths: HashMap::default(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl TermBuilder {
    /// Tokenize `text` and credit each term to `doc`, scaled by
    /// `base_score` so names can weigh more than doc text.
    pub(crate) fn add_terms(&mut self, text: &str, doc: usize, base_score: f32) {
        let words = tokenize_and_stem(text, &self.stemmer);

        let mut word_counts: AHashMap<String, usize> = AHashMap::with_capacity(words.len());
        for word in words {
            *word_counts.entry(word).or_insert(0) += 1;
        }

        let doc_len: usize = word_counts.values().sum();
        *self.doc_lengths.entry(doc).or_insert(0) += doc_len;

        for (word, count) in word_counts {
            let tf_score = (count as f32) * base_score;
            *self.term_docs.entry((hash_term(&word), doc)).or_insert(0.0) += tf_score;
        }
    }

    /// Compute final scores: `TF-IDF = (1 + ln(tf_normalized)) * ln(total / doc_freq)`,
    /// where TF is normalized by document length relative to the average so
    /// long doc strings do not drown out short names.
    pub(crate) fn finalize(self) -> InvertedIndex {
        let total_docs = self.doc_lengths.len() as f32;
        let total_length: usize = self.doc_lengths.values().sum();
        let avg_doc_length = if self.doc_lengths.is_empty() {
            1.0
        } else {
            total_length as f32 / self.doc_lengths.len() as f32
        };

        let mut grouped: HashMap<TermHash, Vec<(usize, f32)>> = HashMap::new();
        for ((term_hash, doc), tf_score) in self.term_docs {
            grouped.entry(term_hash).or_default().push((doc, tf_score));
        }

        let mut terms: HashMap<TermHash, Vec<(usize, f32)>> = HashMap::new();
        for (term_hash, doc_scores) in grouped {
            let doc_freq = doc_scores.len() as f32;
            let idf = (total_docs / doc_freq).ln();

            let mut tf_idf_scores: Vec<_> = doc_scores
                .into_iter()
                .map(|(doc, tf_score)| {
                    let doc_length = self.doc_lengths.get(&doc).copied().unwrap_or(1) as f32;
                    let length_norm = doc_length / avg_doc_length;
                    // Clamp so very short documents are not over-rewarded.
                    let tf_normalized = tf_score / length_norm.max(0.5);
                    (doc, (1.0 + tf_normalized.ln()) * idf)
                })
                .collect();

            tf_idf_scores.sort_by(|(_, a), (_, b)| b.total_cmp(a));
            terms.insert(term_hash, tf_idf_scores);
        }

        InvertedIndex::new(terms)
    }
}

/// Split text into searchable terms, stemmed and lowercased.
///
/// A small state machine splits on several boundaries at once:
/// - CamelCase: `GraphemeCursor` splits at the case change
/// - snake_case: `next_boundary` splits at the underscore
/// - hyphens and any other non-alphabetic character end the current word
///
/// Two pointers track the full word and the current sub-component, so both
/// the pieces and the compound land in the index.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = vec![];

    let mut last_case = None;
    let mut word_start = 0;
    let mut subword_start = 0;
    let mut word_pending = true;
    let mut subword_pending = true;

    for (i, c) in text.char_indices() {
        if word_pending {
            word_start = i;
            subword_start = i;
            word_pending = false;
            subword_pending = false;
        }
        if subword_pending {
            subword_start = i;
            subword_pending = false;
        }

        // A lowercase-to-uppercase transition is a CamelCase boundary.
        let current_case = c.is_alphabetic().then(|| c.is_uppercase());
        let case_change = last_case == Some(false) && current_case == Some(true);
        last_case = current_case;

        if c == '-' || c == '_' {
            // Sub-component boundary inside a compound word.
            if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_pending = true;
        } else if !c.is_alphabetic() {
            // End of the whole word. Emit the trailing sub-component first,
            // unless it is the word itself.
            if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH && subword_start != word_start {
                push_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            if i.saturating_sub(word_start) >= MIN_TOKEN_LENGTH {
                push_token(&text[word_start..i], &mut tokens, stemmer);
            }
            word_pending = true;
        } else if case_change {
            if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start = i;
        }
    }

    // Flush whatever the end of the text cut off.
    if !word_pending {
        let last_subword = &text[subword_start..];
        if word_start != subword_start && last_subword.len() >= MIN_TOKEN_LENGTH {
            push_token(last_subword, &mut tokens, stemmer);
        }
        let last_word = &text[word_start..];
        if last_word.len() >= MIN_TOKEN_LENGTH {
            push_token(last_word, &mut tokens, stemmer);
        }
    }

    tokens
}

/// Lowercase, drop stop words, stem, collect.
fn push_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowercase = token.to_lowercase();
    if STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }
    tokens.push(stemmer.stem(&lowercase).into_owned());
}

/// Case-insensitive term hash.
pub(crate) fn hash_term(term: &str) -> u64 {
    let mut hasher = AHasher::default();
    term.to_lowercase().hash(&mut hasher);
    hasher.finish()
}
