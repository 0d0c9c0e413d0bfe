//! Command-line surface.
//!
//! Four subcommands over artifact files: `check` parses and validates,
//! `inspect` summarizes crates and interning, `search` runs the engine the
//! way the documentation widget did, and `merge` combines several artifacts
//! into one. Reports go to stdout as text or JSON; logging stays on stderr.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::emit::{emit, js_string};
use crate::error::{Result, SearchError};
use crate::index::SearchIndex;
use crate::item_type::ItemType;
use crate::parse::{RawArtifact, RawStmt, RawValue, RawValueKind, parse_artifact, resolve};
use crate::search::{SearchEngine, SearchResult};
use crate::validate::{Finding, Severity, ValidationReport, validate};

#[derive(Parser)]
#[command(name = "rustdoc-index")]
#[command(about = "Validate, inspect and search legacy rustdoc search indexes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate an artifact, printing every finding.
    Check {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Exit nonzero on warnings too.
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Summarize the crates, entry tables and interning of an artifact.
    Inspect {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Search an artifact by name, `kind:` filter, path or signature.
    Search {
        file: PathBuf,
        query: String,
        /// Restrict matches to one crate.
        #[arg(short = 'c', long = "crate")]
        crate_filter: Option<String>,
        #[arg(short = 'n', long, default_value = "25")]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Combine artifacts into one; later files win crate-name collisions.
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Where to write the combined artifact.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            file,
            format,
            deny_warnings,
        } => check(&file, format, deny_warnings),
        Commands::Inspect { file, format } => inspect(&file, format),
        Commands::Search {
            file,
            query,
            crate_filter,
            limit,
            format,
        } => search(&file, &query, crate_filter.as_deref(), limit, format),
        Commands::Merge { files, output } => merge(&files, &output),
    }
}

fn check(file: &Path, format: OutputFormat, deny_warnings: bool) -> Result<ExitCode> {
    let source = read_source(file)?;
    let report = check_report(&source);
    match format {
        OutputFormat::Text => print!("{}", render_findings(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(exit_code(check_failed(&report, deny_warnings)))
}

/// Validate source text. A syntax error still yields a report, carried as
/// its single finding, so `check` output keeps one shape.
fn check_report(source: &str) -> ValidationReport {
    match parse_artifact(source) {
        Ok(raw) => validate(&raw),
        Err(e) => ValidationReport {
            findings: vec![Finding {
                severity: Severity::Error,
                offset: e.offset,
                message: e.message,
            }],
        },
    }
}

fn check_failed(report: &ValidationReport, deny_warnings: bool) -> bool {
    report.has_errors() || (deny_warnings && report.warning_count() > 0)
}

fn render_findings(report: &ValidationReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        let _ = writeln!(
            out,
            "{}: {} (offset {})",
            finding.severity, finding.message, finding.offset
        );
    }
    let _ = writeln!(
        out,
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
    out
}

fn inspect(file: &Path, format: OutputFormat) -> Result<ExitCode> {
    let source = read_source(file)?;
    let raw = parse_artifact(&source)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    let index =
        resolve(&raw).with_context(|| format!("failed to resolve {}", file.display()))?;
    let report = build_inspect(&raw, &index);
    match format {
        OutputFormat::Text => print!("{}", render_inspect(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub crates: Vec<CrateSummary>,
    pub arrays: Vec<ArrayStats>,
    /// Entry rows across all crates.
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct CrateSummary {
    pub name: String,
    pub doc: String,
    pub entries: usize,
    pub parents: usize,
    pub kinds: Vec<KindCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: ItemType,
    pub count: usize,
}

/// Reference statistics for one interning array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayStats {
    pub name: String,
    pub entries: usize,
    pub referenced: usize,
    pub unreferenced: usize,
    /// Output bytes the array saves over writing every reference inline,
    /// zero when the interning does not pay for itself.
    pub bytes_saved: usize,
}

fn build_inspect(raw: &RawArtifact, index: &SearchIndex) -> InspectReport {
    let crates = index
        .crates()
        .map(|(name, tables)| CrateSummary {
            name: name.to_string(),
            doc: tables.doc.clone(),
            entries: tables.entries.len(),
            parents: tables.parents.len(),
            kinds: tables
                .counts_by_kind()
                .into_iter()
                .map(|(kind, count)| KindCount { kind, count })
                .collect(),
        })
        .collect();
    InspectReport {
        crates,
        arrays: array_stats(raw),
        entries: index.entry_count(),
    }
}

/// Per-entry reference tallies for one array binding.
struct Tally {
    /// Byte length of each entry's quoted literal form.
    quoted: Vec<usize>,
    uses: Vec<usize>,
    /// Source bytes spent on references into this array.
    ref_bytes: usize,
}

/// Count how every interning array of a raw artifact is actually used.
///
/// Savings compare the interned encoding against inlining every reference:
/// each entry costs its literal plus a separating comma, each reference its
/// own source length. Unreferenced entries are pure cost.
fn array_stats(artifact: &RawArtifact) -> Vec<ArrayStats> {
    let mut tables: BTreeMap<String, Tally> = BTreeMap::new();

    for stmt in &artifact.stmts {
        if let RawStmt::VarDecl { bindings, .. } = stmt {
            for binding in bindings {
                let Some(value) = &binding.value else {
                    continue;
                };
                if let RawValueKind::Array(entries) = &value.kind {
                    let quoted = entries
                        .iter()
                        .map(|entry| match &entry.kind {
                            RawValueKind::Str(s) => js_string(s).len(),
                            _ => 0,
                        })
                        .collect::<Vec<_>>();
                    let uses = vec![0; entries.len()];
                    tables.insert(
                        binding.name.clone(),
                        Tally {
                            quoted,
                            uses,
                            ref_bytes: 0,
                        },
                    );
                }
            }
        }
    }

    for stmt in &artifact.stmts {
        match stmt {
            RawStmt::Assign { value, .. } => tally_refs(value, &mut tables),
            RawStmt::VarDecl { bindings, .. } => {
                for binding in bindings {
                    if let Some(value) = &binding.value
                        && !matches!(value.kind, RawValueKind::Array(_))
                    {
                        tally_refs(value, &mut tables);
                    }
                }
            }
            RawStmt::Call { .. } => {}
        }
    }

    tables
        .into_iter()
        .map(|(name, tally)| {
            let referenced = tally.uses.iter().filter(|uses| **uses > 0).count();
            let inline: usize = tally
                .uses
                .iter()
                .zip(&tally.quoted)
                .map(|(uses, quoted)| uses * quoted)
                .sum();
            let stored: usize = tally.quoted.iter().map(|quoted| quoted + 1).sum();
            ArrayStats {
                name,
                entries: tally.quoted.len(),
                referenced,
                unreferenced: tally.quoted.len() - referenced,
                bytes_saved: inline.saturating_sub(stored + tally.ref_bytes),
            }
        })
        .collect()
}

fn tally_refs(value: &RawValue, tables: &mut BTreeMap<String, Tally>) {
    match &value.kind {
        RawValueKind::InternRef { array, index } => {
            if let Some(tally) = tables.get_mut(array.as_str())
                && let Some(uses) = usize::try_from(*index)
                    .ok()
                    .and_then(|i| tally.uses.get_mut(i))
            {
                *uses += 1;
                tally.ref_bytes += value.span.end - value.span.start;
            }
        }
        RawValueKind::Array(values) => {
            for value in values {
                tally_refs(value, tables);
            }
        }
        RawValueKind::Object(entries) => {
            for entry in entries {
                tally_refs(&entry.value, tables);
            }
        }
        _ => {}
    }
}

fn render_inspect(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Crates ({}):", report.crates.len());
    for krate in &report.crates {
        let _ = writeln!(
            out,
            "  • {}: {} entries, {} parents",
            krate.name, krate.entries, krate.parents
        );
        if !krate.doc.is_empty() {
            let _ = writeln!(out, "    {}", krate.doc);
        }
        for kind in &krate.kinds {
            let _ = writeln!(out, "      {}: {}", kind.kind, kind.count);
        }
    }
    if !report.arrays.is_empty() {
        let _ = writeln!(out, "Interning:");
        for array in &report.arrays {
            let _ = writeln!(
                out,
                "  • {}: {} entries, {} referenced, {} unreferenced, {} bytes saved",
                array.name, array.entries, array.referenced, array.unreferenced, array.bytes_saved
            );
        }
    }
    let _ = writeln!(
        out,
        "Total: {} entries in {} crate(s)",
        report.entries,
        report.crates.len()
    );
    out
}

fn search(
    file: &Path,
    query: &str,
    crate_filter: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<ExitCode> {
    let index = SearchIndex::load(file)?;
    let engine = SearchEngine::new(&index);
    let results = match engine.search(query, crate_filter, limit) {
        Ok(results) => results,
        Err(SearchError::UnknownCrate { name, suggestions }) if !suggestions.is_empty() => {
            anyhow::bail!(
                "unknown crate `{}`; did you mean {}?",
                name,
                suggestions.join(", ")
            )
        }
        Err(e) => return Err(e.into()),
    };
    match format {
        OutputFormat::Text => print!("{}", render_results(query, &results)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn render_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        let _ = writeln!(out, "No items matching '{}'", query);
        return out;
    }
    let _ = writeln!(out, "Found {} item(s) matching '{}':", results.len(), query);
    for result in results {
        let _ = writeln!(
            out,
            "{:>3}  {} {} [{}]",
            result.score, result.kind, result.path, result.crate_name
        );
        if !result.desc.is_empty() {
            let _ = writeln!(out, "     {}", result.desc);
        }
    }
    out
}

fn merge(files: &[PathBuf], output: &Path) -> Result<ExitCode> {
    let mut merged = SearchIndex::new();
    for file in files {
        let index = SearchIndex::load(file)?;
        info!(file = %file.display(), crates = index.len(), "merging artifact");
        for (name, tables) in index.crates() {
            merged.insert_crate(name, tables.clone());
        }
    }
    let text = emit(&merged);
    std::fs::write(output, &text)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {} crate(s) to {}", merged.len(), output.display());
    Ok(ExitCode::SUCCESS)
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

const fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
