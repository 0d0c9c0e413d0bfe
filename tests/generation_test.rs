//! Tests for programmatic index construction and artifact emission.

mod common;

use assert2::{check, let_assert};
use rustdoc_index::emit::{EPILOGUE, PROLOGUE, emit};
use rustdoc_index::index::TypeName;
use rustdoc_index::parse::parse_artifact;
use rustdoc_index::validate::validate;
use rustdoc_index::{IndexBuilder, ItemType, SearchIndex};

fn filters_index() -> SearchIndex {
    let mut builder = IndexBuilder::new();
    {
        let mut filters = builder.crate_entries(
            "filters",
            "Probabilistic membership filters with a configurable false positive rate \
             and no false negatives.",
        );
        let bloom = filters.add_parent(ItemType::Struct, "Bloom");
        filters.add_item(
            ItemType::Struct,
            "Bloom",
            "filters",
            "Answers membership queries without storing the keys.",
        );
        filters
            .add_item(
                ItemType::Method,
                "insert",
                "filters",
                "Answers membership queries without storing the keys.",
            )
            .parent(bloom)
            .unwrap()
            .signature(
                vec![TypeName::new("self"), TypeName::new("K")],
                vec![],
            );
        filters
            .add_item(
                ItemType::Method,
                "contains",
                "filters",
                "Answers membership queries without storing the keys.",
            )
            .parent(bloom)
            .unwrap()
            .signature(
                vec![TypeName::new("self"), TypeName::new("K")],
                vec![TypeName::with_generics("Result", ["bool", "Error"])],
            );
        filters.finish();
    }
    builder.finish()
}

/// Test: emitted artifacts carry the legacy statement frame.
#[test]
fn artifacts_carry_the_legacy_frame() {
    let text = emit(&filters_index());
    check!(text.starts_with(PROLOGUE));
    check!(text.ends_with(EPILOGUE), "no trailing newline after the call line");

    let lines: Vec<&str> = text.lines().collect();
    // Prologue, interning array, one crate, epilogue.
    check!(lines.len() == 4, "lines: {:?}", lines);
    check!(lines[1].starts_with("var R=["));
    check!(lines[2].starts_with("searchIndex[\"filters\"]={"));
}

/// Test: a desc repeated across rows is interned once.
#[test]
fn repeated_descs_are_interned() {
    let text = emit(&filters_index());
    check!(text.contains("var R=[\"Answers membership queries without storing the keys.\"]"));
    // Three rows reference the single entry.
    check!(text.matches("R[0]").count() == 3, "text: {}", text);
}

/// Test: crate docs past the snippet budget are shortened on a word
/// boundary with a trailing ellipsis.
#[test]
fn long_docs_are_shortened() {
    let index = filters_index();
    let doc = &index.get("filters").unwrap().doc;
    check!(doc.ends_with('…'), "doc: {:?}", doc);
    check!(doc.chars().count() <= 61, "doc: {:?}", doc);
    check!(doc.starts_with("Probabilistic membership filters"));
}

/// Test: signature type names are lowercased the way the generator wrote
/// them, and survive a round trip.
#[test]
fn signature_types_are_lowercased() {
    let index = filters_index();
    let filters = index.get("filters").unwrap();
    let contains = filters.entries.iter().find(|e| e.name == "contains").unwrap();
    let_assert!(Some(sig) = &contains.signature);
    check!(sig.inputs[1].name == "k");
    check!(sig.output[0].name == "result");
    check!(sig.output[0].generics == vec!["bool", "error"]);

    let reparsed = SearchIndex::parse_str(&emit(&index)).unwrap();
    check!(reparsed == index);
}

/// Test: built artifacts validate with no findings.
#[test]
fn built_artifacts_validate_clean() {
    let text = emit(&filters_index());
    let report = validate(&parse_artifact(&text).unwrap());
    check!(report.is_clean(), "findings: {:?}", report.findings);
}

/// Test: crates are emitted in name order regardless of insertion order.
#[test]
fn crates_emit_in_sorted_order() {
    let mut builder = IndexBuilder::new();
    {
        let mut zeta = builder.crate_entries("zeta", "");
        zeta.add_item(ItemType::Function, "zap", "zeta", "Zaps.");
        zeta.finish();
    }
    {
        let mut alpha = builder.crate_entries("alpha", "");
        alpha.add_item(ItemType::Function, "ack", "alpha", "Acks.");
        alpha.finish();
    }
    let text = emit(&builder.finish());
    let lines: Vec<&str> = text.lines().collect();
    check!(lines.len() == 4, "lines: {:?}", lines);
    check!(lines[1].starts_with("searchIndex[\"alpha\"]"));
    check!(lines[2].starts_with("searchIndex[\"zeta\"]"));
}
