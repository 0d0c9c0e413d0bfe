//! Consistency checking over raw artifacts.
//!
//! [`validate`] walks a parsed artifact in statement order and reports every
//! problem it can find instead of stopping at the first, the way
//! [`resolve`](crate::parse::resolve) does. Errors are conditions a consumer
//! of the artifact would trip over at lookup time (dangling references,
//! malformed rows, missing initialization calls); warnings are oddities the
//! generator never produced but a forgiving consumer would survive.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::item_type::ItemType;
use crate::parse::{RawArtifact, RawBinding, RawStmt, RawValue, RawValueKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One validation finding, anchored to a byte offset in the source.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check a raw artifact for internal consistency.
pub fn validate(artifact: &RawArtifact) -> ValidationReport {
    let mut validator = Validator::default();
    validator.run(artifact);
    let mut findings = validator.findings;
    findings.sort_by_key(|f| f.offset);
    ValidationReport { findings }
}

#[derive(Default)]
struct Validator<'a> {
    findings: Vec<Finding>,
    /// Valued bindings seen so far.
    bindings: HashMap<&'a str, &'a RawValue>,
    /// Every declared name, valueless bindings included.
    declared: HashSet<&'a str>,
    arrays: HashMap<&'a str, ArrayInfo>,
    /// First assignment span per crate name.
    crates: HashMap<&'a str, Span>,
    /// Target of the first crate assignment, `searchIndex` in practice.
    target: Option<&'a str>,
    first_call: Option<Span>,
    calls: Vec<(&'a str, &'a str, Span)>,
    end_offset: usize,
}

struct ArrayInfo {
    span: Span,
    referenced: Vec<bool>,
}

/// Outcome of resolving a value expected to be a string.
enum StringShape<'a> {
    Ok(&'a str),
    /// The value was a broken reference; a finding was already emitted.
    Reported,
    /// Not string-shaped at all; the caller owns the diagnostic.
    Other,
}

impl<'a> Validator<'a> {
    fn run(&mut self, artifact: &'a RawArtifact) {
        for stmt in &artifact.stmts {
            self.end_offset = stmt.span().end;
            match stmt {
                RawStmt::VarDecl { bindings, .. } => self.var_decl(bindings),
                RawStmt::Assign {
                    target,
                    key,
                    key_span,
                    value,
                    span,
                } => self.assignment(target, key, *key_span, value, *span),
                RawStmt::Call { callee, arg, span } => {
                    if self.first_call.is_none() {
                        self.first_call = Some(*span);
                    }
                    self.calls.push((callee, arg, *span));
                }
            }
        }
        self.epilogue();
    }

    fn var_decl(&mut self, bindings: &'a [RawBinding]) {
        for binding in bindings {
            self.declared.insert(&binding.name);
            let Some(value) = &binding.value else {
                continue;
            };
            self.bindings.insert(&binding.name, value);
            if let RawValueKind::Array(entries) = &value.kind {
                for (idx, entry) in entries.iter().enumerate() {
                    if !matches!(entry.kind, RawValueKind::Str(_)) {
                        self.warning(
                            entry.span,
                            format!(
                                "interning array `{}` entry {idx} is not a string literal",
                                binding.name
                            ),
                        );
                    }
                }
                self.arrays.insert(
                    &binding.name,
                    ArrayInfo {
                        span: binding.span,
                        referenced: vec![false; entries.len()],
                    },
                );
            } else {
                self.walk_refs(value);
            }
        }
    }

    fn assignment(
        &mut self,
        target: &'a str,
        key: &'a str,
        key_span: Span,
        value: &'a RawValue,
        span: Span,
    ) {
        if !self.declared.contains(target) {
            self.error(
                span,
                format!("assignment to `{target}` before it is declared"),
            );
        }
        if self.target.is_none() {
            self.target = Some(target);
        }
        if let Some(call_span) = self.first_call {
            self.error(
                span,
                format!(
                    "crate `{key}` is assigned after the initialization calls (first call at offset {})",
                    call_span.start
                ),
            );
        }
        if self.crates.insert(key, key_span).is_some() {
            self.warning(
                key_span,
                format!("crate `{key}` is assigned more than once; the later assignment wins"),
            );
        }
        self.record(key, value);
    }

    fn record(&mut self, krate: &'a str, value: &'a RawValue) {
        let RawValueKind::Object(entries) = &value.kind else {
            self.error(
                value.span,
                format!("record for crate `{krate}` is not an object"),
            );
            self.walk_refs(value);
            return;
        };

        for entry in entries {
            if !matches!(entry.key.as_str(), "doc" | "i" | "p") {
                self.warning(
                    entry.key_span,
                    format!("unknown key `{}` in record for crate `{krate}`", entry.key),
                );
                self.walk_refs(&entry.value);
            }
        }

        match value.entry("doc") {
            Some(doc) => {
                if let StringShape::Other = self.string_of(doc) {
                    self.error(doc.span, format!("`doc` of crate `{krate}` is not a string"));
                    self.walk_refs(doc);
                }
            }
            None => self.error(
                value.span,
                format!("record for crate `{krate}` is missing the `doc` key"),
            ),
        }

        let parent_kinds = match value.entry("p") {
            Some(parents) => self.parents(krate, parents),
            None => {
                self.error(
                    value.span,
                    format!("record for crate `{krate}` is missing the `p` key"),
                );
                Vec::new()
            }
        };

        match value.entry("i") {
            Some(rows) => self.rows(krate, rows, &parent_kinds),
            None => self.error(
                value.span,
                format!("record for crate `{krate}` is missing the `i` key"),
            ),
        }
    }

    /// Validates the parent table and returns the kind of each row, `None`
    /// where the kind could not be read.
    fn parents(&mut self, krate: &str, value: &'a RawValue) -> Vec<Option<ItemType>> {
        let Some(rows) = self.array_of(value) else {
            self.error(value.span, format!("`p` of crate `{krate}` is not an array"));
            self.walk_refs(value);
            return Vec::new();
        };

        let mut kinds = Vec::with_capacity(rows.len());
        for (idx, pair) in rows.iter().enumerate() {
            let slots = self.array_of(pair);
            let Some([kind_slot, name_slot]) = slots else {
                self.error(
                    pair.span,
                    format!("parent {idx} of crate `{krate}` is not a [kind, name] pair"),
                );
                self.walk_refs(pair);
                kinds.push(None);
                continue;
            };
            kinds.push(self.kind_of(kind_slot, || {
                format!("parent {idx} of crate `{krate}`")
            }));
            if let StringShape::Other = self.string_of(name_slot) {
                self.error(
                    name_slot.span,
                    format!("parent {idx} of crate `{krate}` has a non-string name"),
                );
                self.walk_refs(name_slot);
            }
        }
        kinds
    }

    fn rows(&mut self, krate: &str, value: &'a RawValue, parent_kinds: &[Option<ItemType>]) {
        let Some(rows) = self.array_of(value) else {
            self.error(value.span, format!("`i` of crate `{krate}` is not an array"));
            self.walk_refs(value);
            return;
        };

        for (row_idx, row) in rows.iter().enumerate() {
            let Some(slots) = self.array_of(row) else {
                self.error(
                    row.span,
                    format!("entry {row_idx} of crate `{krate}` is not an array"),
                );
                self.walk_refs(row);
                continue;
            };

            if !(4..=6).contains(&slots.len()) {
                self.error(
                    row.span,
                    format!(
                        "entry {row_idx} of crate `{krate}` has {} slots (expected 4 to 6)",
                        slots.len()
                    ),
                );
                self.walk_refs(row);
                continue;
            }
            if slots.len() != 6 {
                self.warning(
                    row.span,
                    format!(
                        "entry {row_idx} of crate `{krate}` has {} slots; the generator always wrote 6",
                        slots.len()
                    ),
                );
            }

            self.kind_of(&slots[0], || format!("entry {row_idx} of crate `{krate}`"));

            for (slot, what) in [(&slots[1], "name"), (&slots[3], "desc")] {
                if let StringShape::Other = self.string_of(slot) {
                    self.error(
                        slot.span,
                        format!("entry {row_idx} of crate `{krate}` has a non-string {what}"),
                    );
                    self.walk_refs(slot);
                }
            }

            match self.string_of(&slots[2]) {
                StringShape::Ok(path) => {
                    if row_idx == 0 && path.is_empty() {
                        self.warning(
                            slots[2].span,
                            format!(
                                "first entry of crate `{krate}` has an empty path and nothing to inherit"
                            ),
                        );
                    }
                }
                StringShape::Other => {
                    self.error(
                        slots[2].span,
                        format!("entry {row_idx} of crate `{krate}` has a non-string path"),
                    );
                    self.walk_refs(&slots[2]);
                }
                StringShape::Reported => {}
            }

            if let Some(parent_slot) = slots.get(4) {
                self.parent_ref(krate, row_idx, parent_slot, parent_kinds);
            }
            if let Some(signature_slot) = slots.get(5) {
                self.signature(krate, row_idx, signature_slot);
            }
        }
    }

    fn parent_ref(
        &mut self,
        krate: &str,
        row_idx: usize,
        value: &'a RawValue,
        parent_kinds: &[Option<ItemType>],
    ) {
        if self.is_null(value) {
            return;
        }
        let Some(idx) = self.number_of(value) else {
            self.error(
                value.span,
                format!("entry {row_idx} of crate `{krate}` has a non-numeric parent reference"),
            );
            self.walk_refs(value);
            return;
        };
        let Some(kind) = usize::try_from(idx).ok().and_then(|i| parent_kinds.get(i)) else {
            self.error(
                value.span,
                format!(
                    "entry {row_idx} of crate `{krate}` references parent {idx} but the parent table has {} rows",
                    parent_kinds.len()
                ),
            );
            return;
        };
        if let Some(kind) = kind {
            if !kind.can_own_members() {
                self.warning(
                    value.span,
                    format!(
                        "entry {row_idx} of crate `{krate}` has a parent of kind `{}`, which cannot own members",
                        kind.filter_name()
                    ),
                );
            }
        }
    }

    fn signature(&mut self, krate: &str, row_idx: usize, value: &'a RawValue) {
        if self.is_null(value) {
            return;
        }
        let Some(parts) = self.array_of(value) else {
            self.error(
                value.span,
                format!("entry {row_idx} of crate `{krate}` has a malformed signature"),
            );
            self.walk_refs(value);
            return;
        };

        let (inputs, output) = match parts {
            [inputs] => (inputs, None),
            [inputs, output] => (inputs, Some(output)),
            _ => {
                self.error(
                    value.span,
                    format!(
                        "entry {row_idx} of crate `{krate}` has a signature with {} elements (expected 1 or 2)",
                        parts.len()
                    ),
                );
                self.walk_refs(value);
                return;
            }
        };

        match self.array_of(inputs) {
            Some(types) => {
                for ty in types {
                    self.type_name(krate, row_idx, ty);
                }
            }
            None => {
                self.error(
                    inputs.span,
                    format!("entry {row_idx} of crate `{krate}` has non-array signature inputs"),
                );
                self.walk_refs(inputs);
            }
        }

        if let Some(output) = output {
            let Some(elems) = self.array_of(output) else {
                self.error(
                    output.span,
                    format!("entry {row_idx} of crate `{krate}` has a non-array signature output"),
                );
                self.walk_refs(output);
                return;
            };
            match elems.first() {
                None => {}
                Some(first) if matches!(first.kind, RawValueKind::Array(_)) => {
                    for ty in elems {
                        self.type_name(krate, row_idx, ty);
                    }
                }
                Some(_) => self.type_name_slots(krate, row_idx, elems, output.span),
            }
        }
    }

    fn type_name(&mut self, krate: &str, row_idx: usize, value: &'a RawValue) {
        let Some(slots) = self.array_of(value) else {
            self.error(
                value.span,
                format!("entry {row_idx} of crate `{krate}` has a malformed signature type"),
            );
            self.walk_refs(value);
            return;
        };
        self.type_name_slots(krate, row_idx, slots, value.span);
    }

    fn type_name_slots(
        &mut self,
        krate: &str,
        row_idx: usize,
        slots: &'a [RawValue],
        span: Span,
    ) {
        let (name, generics) = match slots {
            [name] => (name, None),
            [name, generics] => (name, Some(generics)),
            _ => {
                self.error(
                    span,
                    format!("entry {row_idx} of crate `{krate}` has a malformed signature type"),
                );
                for slot in slots {
                    self.walk_refs(slot);
                }
                return;
            }
        };
        if let StringShape::Other = self.string_of(name) {
            self.error(
                name.span,
                format!("entry {row_idx} of crate `{krate}` has a non-string type name"),
            );
            self.walk_refs(name);
        }
        if let Some(generics) = generics {
            match self.array_of(generics) {
                Some(gens) => {
                    for generic in gens {
                        if let StringShape::Other = self.string_of(generic) {
                            self.error(
                                generic.span,
                                format!(
                                    "entry {row_idx} of crate `{krate}` has a non-string generic argument"
                                ),
                            );
                            self.walk_refs(generic);
                        }
                    }
                }
                None => {
                    self.error(
                        generics.span,
                        format!(
                            "entry {row_idx} of crate `{krate}` has non-array generic arguments"
                        ),
                    );
                    self.walk_refs(generics);
                }
            }
        }
    }

    /// Checks on the artifact as a whole, once every statement was seen.
    fn epilogue(&mut self) {
        let end = Span::new(self.end_offset, self.end_offset);

        if self.crates.is_empty() {
            self.warning(end, "artifact assigns no crates".to_string());
        }

        let init = self.calls.iter().find(|c| c.0 == "initSearch").copied();
        let add = self
            .calls
            .iter()
            .find(|c| c.0 == "addSearchOptions")
            .copied();

        match init {
            None => self.error(end, "missing initSearch(...) call".to_string()),
            Some((_, arg, span)) => self.check_call_arg("initSearch", arg, span),
        }
        match add {
            None => self.error(end, "missing addSearchOptions(...) call".to_string()),
            Some((_, arg, span)) => self.check_call_arg("addSearchOptions", arg, span),
        }
        if let (Some(init), Some(add)) = (init, add) {
            if add.2.start < init.2.start {
                self.error(
                    add.2,
                    "addSearchOptions is called before initSearch".to_string(),
                );
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (callee, _, span) in self.calls.clone() {
            if !matches!(callee, "initSearch" | "addSearchOptions") {
                self.warning(span, format!("unexpected call to `{callee}`"));
            } else if !seen.insert(callee) {
                self.warning(span, format!("duplicate call to `{callee}`"));
            }
        }

        let mut unreferenced: Vec<(&str, usize, usize, Span)> = self
            .arrays
            .iter()
            .map(|(name, info)| {
                let unused = info.referenced.iter().filter(|r| !**r).count();
                (*name, unused, info.referenced.len(), info.span)
            })
            .filter(|(_, unused, len, _)| *unused > 0 && *len > 0)
            .collect();
        unreferenced.sort_by_key(|(name, ..)| *name);
        for (name, unused, len, span) in unreferenced {
            self.warning(
                span,
                format!("interning array `{name}`: {unused} of {len} entries are never referenced"),
            );
        }
    }

    fn check_call_arg(&mut self, callee: &str, arg: &str, span: Span) {
        if let Some(target) = self.target {
            if arg != target {
                self.error(
                    span,
                    format!("{callee} is called with `{arg}` but the index is `{target}`"),
                );
            }
        }
    }

    /// Resolve a value expected to hold a string, marking interning
    /// references as used and reporting broken ones.
    fn string_of(&mut self, value: &'a RawValue) -> StringShape<'a> {
        match &value.kind {
            RawValueKind::Str(s) => StringShape::Ok(s),
            RawValueKind::Ident(name) => match self.bindings.get(name.as_str()) {
                Some(bound) => match &bound.kind {
                    RawValueKind::Str(s) => StringShape::Ok(s),
                    _ => StringShape::Other,
                },
                None => {
                    self.error(value.span, format!("reference to undeclared `{name}`"));
                    StringShape::Reported
                }
            },
            RawValueKind::InternRef { array, index } => {
                match self.intern_ref(array, *index, value.span) {
                    Some(s) => StringShape::Ok(s),
                    None => StringShape::Reported,
                }
            }
            _ => StringShape::Other,
        }
    }

    /// Bounds-check `array[index]`, marking it referenced. Emits a finding
    /// and returns `None` when the reference cannot resolve to a string.
    fn intern_ref(&mut self, array: &str, index: u64, span: Span) -> Option<&'a str> {
        let Some(info) = self.arrays.get_mut(array) else {
            if self.declared.contains(array) {
                self.error(span, format!("`{array}` is not an interning array"));
            } else {
                self.error(span, format!("reference to undeclared `{array}`"));
            }
            return None;
        };
        let len = info.referenced.len();
        let Some(flag) = usize::try_from(index)
            .ok()
            .and_then(|i| info.referenced.get_mut(i))
        else {
            self.error(
                span,
                format!("reference {array}[{index}] is out of bounds ({array} has {len} entries)"),
            );
            return None;
        };
        *flag = true;

        // The binding is still in `bindings`; pull the entry text from it.
        let bound: &'a RawValue = self.bindings.get(array).copied()?;
        let entries = bound.as_array()?;
        let entry = usize::try_from(index).ok().and_then(|i| entries.get(i))?;
        match &entry.kind {
            RawValueKind::Str(s) => Some(s),
            // Non-string entries already warned at declaration time.
            _ => None,
        }
    }

    /// Recursively bounds-check references in a subtree that no shape check
    /// will visit.
    fn walk_refs(&mut self, value: &'a RawValue) {
        match &value.kind {
            RawValueKind::InternRef { array, index } => {
                self.intern_ref(array, *index, value.span);
            }
            RawValueKind::Array(values) => {
                for v in values {
                    self.walk_refs(v);
                }
            }
            RawValueKind::Object(entries) => {
                for entry in entries {
                    self.walk_refs(&entry.value);
                }
            }
            _ => {}
        }
    }

    fn kind_of(&mut self, value: &'a RawValue, place: impl FnOnce() -> String) -> Option<ItemType> {
        let Some(code) = self.number_of(value) else {
            self.error(value.span, format!("{} has a non-numeric kind", place()));
            self.walk_refs(value);
            return None;
        };
        let kind = u32::try_from(code).ok().and_then(ItemType::from_code);
        if kind.is_none() {
            self.error(value.span, format!("{} has unknown kind code {code}", place()));
        }
        kind
    }

    fn is_null(&self, value: &RawValue) -> bool {
        match &value.kind {
            RawValueKind::Null => true,
            RawValueKind::Ident(name) => self
                .bindings
                .get(name.as_str())
                .is_some_and(|bound| matches!(bound.kind, RawValueKind::Null)),
            _ => false,
        }
    }

    fn number_of(&self, value: &RawValue) -> Option<u64> {
        match &value.kind {
            RawValueKind::Number(n) => Some(*n),
            RawValueKind::Ident(name) => match self.bindings.get(name.as_str()) {
                Some(bound) => match bound.kind {
                    RawValueKind::Number(n) => Some(n),
                    _ => None,
                },
                None => None,
            },
            _ => None,
        }
    }

    fn array_of(&self, value: &'a RawValue) -> Option<&'a [RawValue]> {
        match &value.kind {
            RawValueKind::Array(values) => Some(values),
            RawValueKind::Ident(name) => self
                .bindings
                .get(name.as_str())
                .and_then(|v| v.as_array()),
            _ => None,
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Error,
            offset: span.start,
            message: message.into(),
        });
    }

    fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            offset: span.start,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_artifact;
    use assert2::check;
    use rstest::rstest;

    fn report(source: &str) -> ValidationReport {
        validate(&parse_artifact(source).unwrap())
    }

    fn messages(report: &ValidationReport, severity: Severity) -> Vec<&str> {
        report
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(|f| f.message.as_str())
            .collect()
    }

    const PROLOGUE: &str = r#"var N=null,E="",T="t",U="u",searchIndex={};"#;
    const EPILOGUE: &str = "initSearch(searchIndex);addSearchOptions(searchIndex);";

    fn wrap(body: &str) -> String {
        format!("{PROLOGUE}{body}{EPILOGUE}")
    }

    #[test]
    fn clean_artifact_has_no_findings() {
        let source = wrap(
            "var R=[\"a struct with a long name\",\"and_a_method_name\"];\
             searchIndex[\"demo\"]={\"doc\":E,\"i\":[\
             [3,R[0],\"demo\",E,N,N],\
             [11,R[1],E,E,0,[[[\"self\"]],[R[0]]]]],\
             \"p\":[[3,R[0]]]};",
        );
        let report = report(&source);
        check!(report.is_clean(), "findings: {:?}", report.findings);
    }

    #[test]
    fn out_of_bounds_reference_is_an_error() {
        let source = wrap(
            "var R=[\"only\"];\
             searchIndex[\"demo\"]={\"doc\":R[3],\"i\":[],\"p\":[]};",
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.len() == 1);
        check!(errors[0].contains("R[3] is out of bounds"));
        check!(errors[0].contains("R has 1 entries"));
    }

    #[test]
    fn undeclared_array_is_an_error() {
        let source = wrap("searchIndex[\"demo\"]={\"doc\":R[0],\"i\":[],\"p\":[]};");
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("undeclared `R`")));
    }

    #[test]
    fn parent_out_of_bounds_is_an_error() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[\
             [11,\"f\",\"demo\",E,1,N]],\"p\":[[3,\"Word\"]]};",
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("references parent 1")));
        check!(report.error_count() == 1);
    }

    #[test]
    fn assignment_before_declaration_is_an_error() {
        let source = format!(
            "searchIndex[\"demo\"]={{\"doc\":\"\",\"i\":[],\"p\":[]}};{PROLOGUE}{EPILOGUE}"
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(
            errors
                .iter()
                .any(|m| m.contains("before it is declared"))
        );
    }

    #[rstest]
    #[case("", "missing initSearch")]
    #[case("initSearch(searchIndex);", "missing addSearchOptions")]
    fn missing_calls_are_errors(#[case] calls: &str, #[case] expected: &str) {
        let source =
            format!("{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[],\"p\":[]}};{calls}");
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains(expected)), "{errors:?}");
    }

    #[test]
    fn call_order_is_checked() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[],\"p\":[]}};\
             addSearchOptions(searchIndex);initSearch(searchIndex);"
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(
            errors
                .iter()
                .any(|m| m.contains("addSearchOptions is called before initSearch"))
        );
    }

    #[test]
    fn assignment_after_calls_is_an_error() {
        let source = format!(
            "{PROLOGUE}initSearch(searchIndex);addSearchOptions(searchIndex);\
             searchIndex[\"late\"]={{\"doc\":E,\"i\":[],\"p\":[]}};"
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("after the initialization calls")));
    }

    #[test]
    fn call_argument_mismatch_is_an_error() {
        let source = format!(
            "{PROLOGUE}var other={{}};searchIndex[\"demo\"]={{\"doc\":E,\"i\":[],\"p\":[]}};\
             initSearch(other);addSearchOptions(searchIndex);"
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("initSearch is called with `other`")));
    }

    #[test]
    fn unknown_kind_code_is_an_error() {
        let source = wrap("searchIndex[\"demo\"]={\"doc\":E,\"i\":[[26,\"x\",\"demo\",E,N,N]],\"p\":[]};");
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("unknown kind code 26")));
    }

    #[test]
    fn short_row_is_a_warning() {
        let source = wrap("searchIndex[\"demo\"]={\"doc\":E,\"i\":[[5,\"f\",\"demo\",E]],\"p\":[]};");
        let report = report(&source);
        check!(report.error_count() == 0);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("has 4 slots")));
    }

    #[test]
    fn oversized_row_is_an_error() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[[5,\"f\",\"demo\",E,N,N,N]],\"p\":[]};",
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("has 7 slots")));
    }

    #[test]
    fn leading_empty_path_is_a_warning() {
        let source = wrap("searchIndex[\"demo\"]={\"doc\":E,\"i\":[[5,\"f\",E,E,N,N]],\"p\":[]};");
        let report = report(&source);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("empty path")));
    }

    #[test]
    fn duplicate_crate_is_a_warning() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[],\"p\":[]};\
             searchIndex[\"demo\"]={\"doc\":E,\"i\":[],\"p\":[]};",
        );
        let report = report(&source);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("assigned more than once")));
    }

    #[test]
    fn unknown_record_key_is_a_warning() {
        let source =
            wrap("searchIndex[\"demo\"]={\"doc\":E,\"i\":[],\"p\":[],\"extra\":1};");
        let report = report(&source);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("unknown key `extra`")));
    }

    #[test]
    fn fn_parent_is_a_warning() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[\
             [11,\"m\",\"demo\",E,0,N]],\"p\":[[5,\"free\"]]};",
        );
        let report = report(&source);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("kind `fn`, which cannot own members")));
    }

    #[test]
    fn unreferenced_intern_entry_is_a_warning() {
        let source = wrap(
            "var R=[\"used string here\",\"never referenced\"];\
             searchIndex[\"demo\"]={\"doc\":R[0],\"i\":[],\"p\":[]};",
        );
        let report = report(&source);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("1 of 2 entries are never referenced")));
    }

    #[test]
    fn missing_record_keys_are_errors() {
        let source = wrap("searchIndex[\"demo\"]={\"doc\":E};");
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("missing the `i` key")));
        check!(errors.iter().any(|m| m.contains("missing the `p` key")));
    }

    #[test]
    fn empty_artifact_warns_about_missing_crates() {
        let source = format!("{PROLOGUE}{EPILOGUE}");
        let report = report(&source);
        check!(report.error_count() == 0);
        let warnings = messages(&report, Severity::Warning);
        check!(warnings.iter().any(|m| m.contains("assigns no crates")));
    }

    #[test]
    fn findings_are_sorted_by_offset() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[[26,\"x\",\"demo\",E,N,N]],\"p\":[],\"zz\":1};",
        );
        let report = report(&source);
        let offsets: Vec<usize> = report.findings.iter().map(|f| f.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        check!(offsets == sorted);
        check!(report.has_errors());
    }

    #[test]
    fn signature_shape_problems_are_errors() {
        let source = wrap(
            "searchIndex[\"demo\"]={\"doc\":E,\"i\":[\
             [5,\"f\",\"demo\",E,N,[1]]],\"p\":[]};",
        );
        let report = report(&source);
        let errors = messages(&report, Severity::Error);
        check!(errors.iter().any(|m| m.contains("non-array signature inputs")));
    }
}
