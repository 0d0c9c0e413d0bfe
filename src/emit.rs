//! Artifact emission.
//!
//! Serializes a [`SearchIndex`] back into `search-index.js` text the way the
//! original generator wrote it: the constant prologue, an optional interning
//! array, one minified assignment per crate in sorted name order, and the
//! two initialization calls. Emission re-applies the path delta encoding and
//! the singleton-output flattening, and re-derives the interning table from
//! scratch, so parse, emit, parse round-trips to an identical index.

use std::fmt::{self, Write};

use tracing::debug;

use crate::index::{CrateEntries, FunctionSignature, SearchIndex, TypeName};
use crate::intern::{InternMap, Interner};

/// The fixed first line every artifact starts with.
pub const PROLOGUE: &str = "var N=null,E=\"\",T=\"t\",U=\"u\",searchIndex={};";

/// The fixed last line handing the table to the browser widget.
pub const EPILOGUE: &str = "initSearch(searchIndex);addSearchOptions(searchIndex);";

/// Serialize an index to artifact text.
pub fn emit(index: &SearchIndex) -> String {
    let records: Vec<(&str, Record)> = index
        .crates()
        .map(|(name, entries)| (name, Record::build(entries)))
        .collect();

    let mut interner = Interner::new();
    for (_, record) in &records {
        record.collect(&mut interner);
    }
    let map = interner.freeze();

    let mut out = String::new();
    // Infallible: fmt::Write into a String cannot fail.
    let _ = write_artifact(&mut out, &records, &map);

    debug!(
        crates = records.len(),
        entries = index.entry_count(),
        interned = map.entries().len(),
        saved = map.bytes_saved(),
        bytes = out.len(),
        "emitted search index artifact"
    );
    out
}

fn write_artifact(
    out: &mut String,
    records: &[(&str, Record)],
    map: &InternMap,
) -> fmt::Result {
    out.push_str(PROLOGUE);
    out.push('\n');

    if !map.is_empty() {
        out.push_str("var R=[");
        for (idx, entry) in map.entries().iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            out.push_str(&js_string(entry));
        }
        out.push_str("];\n");
    }

    for (name, record) in records {
        write!(out, "searchIndex[{}]=", js_string(name))?;
        record.write(out, map)?;
        out.push_str(";\n");
    }

    out.push_str(EPILOGUE);
    Ok(())
}

/// A crate record with paths already delta-encoded, ready to be counted and
/// then written.
struct Record {
    doc: String,
    rows: Vec<Slot>,
    parents: Vec<Slot>,
}

/// One serializable position of a row.
enum Slot {
    Null,
    Num(u64),
    Str(String),
    List(Vec<Slot>),
}

impl Record {
    fn build(entries: &CrateEntries) -> Self {
        let mut rows = Vec::with_capacity(entries.entries.len());
        let mut last_path = "";
        for entry in &entries.entries {
            let path = if entry.path == last_path {
                String::new()
            } else {
                last_path = &entry.path;
                entry.path.clone()
            };
            rows.push(Slot::List(vec![
                Slot::Num(u64::from(entry.kind.code())),
                Slot::Str(entry.name.clone()),
                Slot::Str(path),
                Slot::Str(entry.desc.clone()),
                match entry.parent {
                    Some(idx) => Slot::Num(u64::from(idx)),
                    None => Slot::Null,
                },
                match &entry.signature {
                    Some(sig) => signature_slot(sig),
                    None => Slot::Null,
                },
            ]));
        }

        let parents = entries
            .parents
            .iter()
            .map(|parent| {
                Slot::List(vec![
                    Slot::Num(u64::from(parent.kind.code())),
                    Slot::Str(parent.name.clone()),
                ])
            })
            .collect();

        Self {
            doc: entries.doc.clone(),
            rows,
            parents,
        }
    }

    fn collect(&self, interner: &mut Interner) {
        collect_str(&self.doc, interner);
        for slot in self.rows.iter().chain(&self.parents) {
            slot.collect(interner);
        }
    }

    fn write(&self, out: &mut String, map: &InternMap) -> fmt::Result {
        out.push_str("{\"doc\":");
        write_str(out, &self.doc, map);
        out.push_str(",\"i\":[");
        write_slots(out, &self.rows, map)?;
        out.push_str("],\"p\":[");
        write_slots(out, &self.parents, map)?;
        out.push_str("]}");
        Ok(())
    }
}

/// `[inputs]`, or `[inputs, type]` for a single output type, or
/// `[inputs, [types...]]` for several.
fn signature_slot(sig: &FunctionSignature) -> Slot {
    let inputs = Slot::List(sig.inputs.iter().map(type_slot).collect());
    match sig.output.as_slice() {
        [] => Slot::List(vec![inputs]),
        [single] => Slot::List(vec![inputs, type_slot(single)]),
        several => Slot::List(vec![
            inputs,
            Slot::List(several.iter().map(type_slot).collect()),
        ]),
    }
}

fn type_slot(ty: &TypeName) -> Slot {
    if ty.generics.is_empty() {
        Slot::List(vec![Slot::Str(ty.name.clone())])
    } else {
        Slot::List(vec![
            Slot::Str(ty.name.clone()),
            Slot::List(ty.generics.iter().cloned().map(Slot::Str).collect()),
        ])
    }
}

impl Slot {
    fn collect(&self, interner: &mut Interner) {
        match self {
            Slot::Str(s) => collect_str(s, interner),
            Slot::List(slots) => {
                for slot in slots {
                    slot.collect(interner);
                }
            }
            Slot::Null | Slot::Num(_) => {}
        }
    }

    fn write(&self, out: &mut String, map: &InternMap) -> fmt::Result {
        match self {
            Slot::Null => out.push('N'),
            Slot::Num(n) => write!(out, "{n}")?,
            Slot::Str(s) => write_str(out, s, map),
            Slot::List(slots) => {
                out.push('[');
                write_slots(out, slots, map)?;
                out.push(']');
            }
        }
        Ok(())
    }
}

fn write_slots(out: &mut String, slots: &[Slot], map: &InternMap) -> fmt::Result {
    for (idx, slot) in slots.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        slot.write(out, map)?;
    }
    Ok(())
}

/// The single-character constants of the prologue; these strings are never
/// interned because the constant is always shorter.
fn constant_for(s: &str) -> Option<char> {
    match s {
        "" => Some('E'),
        "t" => Some('T'),
        "u" => Some('U'),
        _ => None,
    }
}

fn collect_str(s: &str, interner: &mut Interner) {
    if constant_for(s).is_none() {
        interner.note(s);
    }
}

fn write_str(out: &mut String, s: &str, map: &InternMap) {
    if let Some(constant) = constant_for(s) {
        out.push(constant);
    } else if let Some(slot) = map.slot(s) {
        // Infallible, same as above.
        let _ = write!(out, "R[{slot}]");
    } else {
        out.push_str(&js_string(s));
    }
}

/// Quote and escape a string for the artifact. The escape set matches what
/// the lexer decodes; non-ASCII text is written raw, the way the generator
/// left `…` in place.
pub(crate) fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                // Infallible write into a String.
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
