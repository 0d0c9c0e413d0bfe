//! String interning for the serialized artifact.
//!
//! Generators kept `search-index.js` small by hoisting repeated string
//! literals into a single array (`var R=[...];`) and writing `R[17]` at each
//! use site. Interning is purely a serialization concern: the resolved index
//! always holds owned strings, references are chased during
//! [`resolve`](crate::parse::resolve), and the emitter rebuilds a table of
//! its own with [`Interner`].

use ahash::AHashMap;

use crate::emit::js_string;

/// Occurrence counter for the emitter's first pass.
///
/// Every string destined for the output (except constant-substituted ones and
/// crate-name keys, which the generator never aggregated) is [`note`]d; the
/// resulting [`InternMap`] decides which of them earn a slot in `R`.
///
/// [`note`]: Interner::note
#[derive(Debug, Default)]
pub struct Interner {
    seen: AHashMap<String, Candidate>,
}

#[derive(Debug)]
struct Candidate {
    uses: usize,
    /// Byte length of the quoted, escaped literal.
    quoted_len: usize,
    first_seen: usize,
}

/// Worst-case byte cost of one `R[nnn]` reference.
const REF_COST: usize = 6;

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `s` in the output.
    pub fn note(&mut self, s: &str) {
        if let Some(candidate) = self.seen.get_mut(s) {
            candidate.uses += 1;
            return;
        }
        let candidate =
            Candidate { uses: 1, quoted_len: js_string(s).len(), first_seen: self.seen.len() };
        self.seen.insert(s.to_string(), candidate);
    }

    /// Keep every string whose interned form is smaller than its inline uses,
    /// ordered by descending savings so the biggest wins come first.
    pub fn freeze(self) -> InternMap {
        let mut picked: Vec<(String, Candidate, usize)> = self
            .seen
            .into_iter()
            .filter_map(|(s, c)| savings(&c).map(|saved| (s, c, saved)))
            .collect();
        picked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.first_seen.cmp(&b.1.first_seen)));

        let saved = picked.iter().map(|(_, _, saved)| saved).sum();
        let mut entries = Vec::with_capacity(picked.len());
        let mut index = AHashMap::with_capacity(picked.len());
        for (slot, (s, _, _)) in picked.into_iter().enumerate() {
            index.insert(s.clone(), slot as u32);
            entries.push(s);
        }
        InternMap {
            entries,
            index,
            saved,
        }
    }
}

/// Bytes saved by interning, `None` when inline is no worse.
///
/// Inline, `uses` copies of the quoted literal are written. Interned, the
/// literal is written once into the array (plus a comma) and each use becomes
/// a reference. Single-use strings never qualify.
fn savings(c: &Candidate) -> Option<usize> {
    let inline = c.uses * c.quoted_len;
    let interned = c.quoted_len + 1 + c.uses * REF_COST;
    (c.uses > 1 && inline > interned).then(|| inline - interned)
}

/// Frozen interning decisions for the emitter's second pass.
#[derive(Debug)]
pub struct InternMap {
    entries: Vec<String>,
    index: AHashMap<String, u32>,
    saved: usize,
}

impl InternMap {
    /// The slot assigned to `s`, `None` when it stays inline.
    pub fn slot(&self, s: &str) -> Option<u32> {
        self.index.get(s).copied()
    }

    /// Array entries in slot order, for writing `var R=[...]`.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated output bytes saved by the interning decisions.
    pub fn bytes_saved(&self) -> usize {
        self.saved
    }
}
