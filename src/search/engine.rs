//! The query side of the index: what the search widget did in the browser,
//! answered natively against a resolved [`SearchIndex`].

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;
use tracing::debug;

use crate::error::SearchError;
use crate::index::{CrateEntries, IndexEntry, SearchIndex};
use crate::item_type::ItemType;

use super::index::InvertedIndex;
use super::query::{ParsedQuery, QueryTerms, parse_query};
use super::scoring::{calculate_path_relevance, calculate_relevance};
use super::tokenize::TermBuilder;

/// Term weight for entry names.
const NAME_WEIGHT: f32 = 2.0;
/// Term weight for desc snippets.
const DOCS_WEIGHT: f32 = 1.0;
/// Doc-text hits are folded into this band, below the weakest name match.
const DOCS_SCORE_CEILING: f32 = 9.0;
/// Minimum Jaro-Winkler similarity for a crate-name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;
/// At most this many crate-name suggestions.
const SUGGESTION_LIMIT: usize = 5;

/// One search hit, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub crate_name: String,
    /// Full display path, owning type included (`path::Parent::name`).
    pub path: String,
    pub name: String,
    pub kind: ItemType,
    /// 0 to 100; name matches score 10/50/100, doc-text matches land below.
    pub score: u32,
    pub desc: String,
}

/// Answers queries against a borrowed index. Build once, query many times:
/// construction tokenizes every entry into the doc-text term index.
pub struct SearchEngine<'a> {
    entries: Vec<EntryRef<'a>>,
    terms: InvertedIndex,
    crate_names: Vec<&'a str>,
}

/// One entry row plus the lowercased forms matching works on.
struct EntryRef<'a> {
    krate: &'a str,
    tables: &'a CrateEntries,
    entry: &'a IndexEntry,
    name: String,
    /// Path segments plus the owning type's name, when there is one.
    segments: Vec<String>,
}

/// An entry index with its relevance scores, before sorting.
struct Hit {
    index: usize,
    score: u32,
    path_score: u32,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        let mut entries = Vec::with_capacity(index.entry_count());
        let mut builder = TermBuilder::default();

        for (krate, tables) in index.crates() {
            for entry in &tables.entries {
                let doc = entries.len();
                builder.add_terms(&entry.name, doc, NAME_WEIGHT);
                builder.add_terms(&entry.desc, doc, DOCS_WEIGHT);

                let mut segments: Vec<String> = entry
                    .path
                    .split("::")
                    .filter(|s| !s.is_empty())
                    .map(str::to_lowercase)
                    .collect();
                if let Some(parent) = tables.parent_of(entry) {
                    segments.push(parent.name.to_lowercase());
                }

                entries.push(EntryRef {
                    krate,
                    tables,
                    entry,
                    name: entry.name.to_lowercase(),
                    segments,
                });
            }
        }

        let terms = builder.finalize();
        debug!(
            entries = entries.len(),
            terms = terms.term_count(),
            "built search engine"
        );

        Self {
            entries,
            terms,
            crate_names: index.crate_names(),
        }
    }

    /// Run a query. `crate_filter` restricts the search to one crate; a
    /// filter naming an unknown crate fails with "did you mean" suggestions.
    /// Results are sorted best first and cut off at `limit`.
    pub fn search(
        &self,
        raw: &str,
        crate_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query = parse_query(raw)?;

        if let Some(wanted) = crate_filter
            && !self.crate_names.contains(&wanted)
        {
            return Err(SearchError::UnknownCrate {
                name: wanted.to_string(),
                suggestions: self.suggest_crates(wanted),
            });
        }

        let mut hits = match &query.terms {
            QueryTerms::Name { path, needle } => {
                self.name_hits(&query, path, needle, crate_filter)
            }
            QueryTerms::Signature { inputs, output } => {
                self.signature_hits(&query, inputs, output.as_deref(), crate_filter)
            }
        };

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.path_score.cmp(&a.path_score))
                .then_with(|| self.entries[a.index].name.cmp(&self.entries[b.index].name))
                .then_with(|| self.entries[a.index].krate.cmp(self.entries[b.index].krate))
        });

        Ok(hits
            .into_iter()
            .take(limit)
            .map(|hit| self.result(&hit))
            .collect())
    }

    /// The sorted crate names this engine knows, the counterpart of the
    /// widget's crate dropdown.
    pub fn crate_names(&self) -> &[&'a str] {
        &self.crate_names
    }

    fn name_hits(
        &self,
        query: &ParsedQuery,
        path: &[String],
        needle: &str,
        crate_filter: Option<&str>,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        let mut matched = vec![false; self.entries.len()];

        for (index, entry) in self.entries.iter().enumerate() {
            if !passes(entry, query, crate_filter) {
                continue;
            }
            let Some(score) = calculate_relevance(&entry.name, needle) else {
                continue;
            };
            let path_score = if path.is_empty() {
                0
            } else {
                match calculate_path_relevance(&entry.segments, path) {
                    Some(score) => score,
                    None => continue,
                }
            };
            matched[index] = true;
            hits.push(Hit {
                index,
                score,
                path_score,
            });
        }

        // Doc-text pass, plain needles only: path qualification means the
        // caller knows what the item is called.
        if path.is_empty() {
            let doc_hits: Vec<(usize, f32)> = self
                .terms
                .search(needle)
                .into_iter()
                .filter(|&(index, _)| {
                    !matched[index] && passes(&self.entries[index], query, crate_filter)
                })
                .collect();

            // Normalize against the best retained hit, into the band below
            // the weakest name match.
            if let Some(&(_, best)) = doc_hits.first() {
                for (index, raw_score) in doc_hits {
                    let score = if best > 0.0 {
                        ((raw_score / best) * DOCS_SCORE_CEILING).round().max(1.0) as u32
                    } else {
                        1
                    };
                    hits.push(Hit {
                        index,
                        score,
                        path_score: 0,
                    });
                }
            }
        }

        hits
    }

    fn signature_hits(
        &self,
        query: &ParsedQuery,
        inputs: &[String],
        output: Option<&str>,
        crate_filter: Option<&str>,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if !passes(entry, query, crate_filter) {
                continue;
            }
            let Some(sig) = &entry.entry.signature else {
                continue;
            };
            if !inputs.iter().all(|needle| sig.mentions_input(needle)) {
                continue;
            }
            if let Some(ret) = output
                && !sig.mentions_output(ret)
            {
                continue;
            }
            // Spelling out the exact number of inputs outranks matching a
            // wider signature.
            let score = if sig.inputs.len() == inputs.len() { 100 } else { 50 };
            hits.push(Hit {
                index,
                score,
                path_score: 0,
            });
        }
        hits
    }

    fn result(&self, hit: &Hit) -> SearchResult {
        let entry = &self.entries[hit.index];
        SearchResult {
            crate_name: entry.krate.to_string(),
            path: entry.tables.display_path(entry.entry),
            name: entry.entry.name.clone(),
            kind: entry.entry.kind,
            score: hit.score,
            desc: entry.entry.desc.clone(),
        }
    }

    fn suggest_crates(&self, wanted: &str) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .crate_names
            .iter()
            .map(|name| (jaro_winkler::similarity(wanted.chars(), name.chars()), *name))
            .filter(|&(score, _)| score > SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
        scored
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Crate and kind filters shared by every matching pass.
fn passes(entry: &EntryRef<'_>, query: &ParsedQuery, crate_filter: Option<&str>) -> bool {
    if let Some(wanted) = crate_filter
        && entry.krate != wanted
    {
        return false;
    }
    if let Some(kind) = query.kind
        && entry.entry.kind != kind
    {
        return false;
    }
    true
}
