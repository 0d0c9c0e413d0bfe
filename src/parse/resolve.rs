//! Resolution of a raw artifact into the typed model.
//!
//! Walks the statement list in program order, the way a JavaScript engine
//! would have: `var` bindings build up a constant environment (`N`, `E`,
//! `T`, `U`, the interning array `R`), and each `searchIndex["crate"]=...`
//! assignment is flattened into [`CrateEntries`] with interning references
//! chased, path deltas applied and parent indices bounds-checked. Resolution
//! stops at the first problem; [`validate`](crate::validate::validate) is the
//! lenient counterpart that keeps going.

use std::collections::{HashMap, HashSet};

use crate::error::ResolveError;
use crate::index::{CrateEntries, FunctionSignature, IndexEntry, Parent, SearchIndex, TypeName};
use crate::item_type::ItemType;
use crate::parse::{RawArtifact, RawBinding, RawStmt, RawValue, RawValueKind};

/// Resolve a parsed artifact into a [`SearchIndex`].
///
/// Later assignments to the same crate name replace earlier ones. An
/// artifact with no assignments at all resolves to
/// [`ResolveError::NoCrates`]; the generator always wrote at least one.
pub fn resolve(artifact: &RawArtifact) -> Result<SearchIndex, ResolveError> {
    let mut resolver = Resolver::default();
    let mut index = SearchIndex::new();
    let mut resolved_any = false;

    for stmt in &artifact.stmts {
        match stmt {
            RawStmt::VarDecl { bindings, .. } => resolver.declare(bindings),
            RawStmt::Assign {
                target, key, value, ..
            } => {
                if !resolver.declared.contains(target.as_str()) {
                    return Err(ResolveError::UnknownConstant(target.clone()));
                }
                let entries = resolver.crate_entries(key, value)?;
                index.insert_crate(key.clone(), entries);
                resolved_any = true;
            }
            RawStmt::Call { .. } => {}
        }
    }

    if !resolved_any {
        return Err(ResolveError::NoCrates);
    }
    Ok(index)
}

#[derive(Default)]
struct Resolver<'a> {
    /// Bindings with a value, in declaration order (later wins).
    env: HashMap<&'a str, &'a RawValue>,
    /// Every declared name, including valueless `var x;` bindings.
    declared: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn declare(&mut self, bindings: &'a [RawBinding]) {
        for binding in bindings {
            self.declared.insert(&binding.name);
            if let Some(value) = &binding.value {
                self.env.insert(&binding.name, value);
            }
        }
    }

    /// A value's string content, following one constant hop and interning
    /// references. `Ok(None)` means the value is not string-shaped; the
    /// caller owns that diagnostic.
    fn try_string(&self, value: &'a RawValue) -> Result<Option<&'a str>, ResolveError> {
        match &value.kind {
            RawValueKind::Str(s) => Ok(Some(s)),
            RawValueKind::Ident(name) => {
                let bound = self.lookup(name)?;
                match &bound.kind {
                    RawValueKind::Str(s) => Ok(Some(s)),
                    _ => Ok(None),
                }
            }
            RawValueKind::InternRef { array, index } => self.intern_lookup(array, *index).map(Some),
            _ => Ok(None),
        }
    }

    fn lookup(&self, name: &str) -> Result<&'a RawValue, ResolveError> {
        self.env
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownConstant(name.to_string()))
    }

    fn intern_lookup(&self, array: &str, index: u64) -> Result<&'a str, ResolveError> {
        let bound = self.lookup(array)?;
        let entries = bound.as_array().ok_or_else(|| ResolveError::NotAnArray {
            array: array.to_string(),
        })?;
        let entry = usize::try_from(index)
            .ok()
            .and_then(|i| entries.get(i))
            .ok_or_else(|| ResolveError::InternOutOfBounds {
                array: array.to_string(),
                index,
                len: entries.len(),
            })?;
        match &entry.kind {
            RawValueKind::Str(s) => Ok(s),
            _ => Err(ResolveError::BadInternEntry {
                array: array.to_string(),
                index,
            }),
        }
    }

    fn is_null(&self, value: &RawValue) -> bool {
        match &value.kind {
            RawValueKind::Null => true,
            RawValueKind::Ident(name) => self
                .env
                .get(name.as_str())
                .is_some_and(|bound| matches!(bound.kind, RawValueKind::Null)),
            _ => false,
        }
    }

    fn number(&self, value: &RawValue) -> Option<u64> {
        match &value.kind {
            RawValueKind::Number(n) => Some(*n),
            RawValueKind::Ident(name) => match self.env.get(name.as_str()) {
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
            RawValueKind::Ident(name) => self.env.get(name.as_str()).and_then(|v| v.as_array()),
            _ => None,
        }
    }

    fn crate_entries(&self, krate: &str, value: &'a RawValue) -> Result<CrateEntries, ResolveError> {
        if !matches!(value.kind, RawValueKind::Object(_)) {
            return Err(shape(krate, "the record", "an object"));
        }

        let doc_value = value.entry("doc").ok_or_else(|| ResolveError::MissingKey {
            krate: krate.to_string(),
            key: "doc",
        })?;
        let doc = self
            .try_string(doc_value)?
            .ok_or_else(|| shape(krate, "`doc`", "a string"))?
            .to_string();

        // Parents come first so entry rows can be bounds-checked inline.
        let parents_value = value.entry("p").ok_or_else(|| ResolveError::MissingKey {
            krate: krate.to_string(),
            key: "p",
        })?;
        let parents = self.parents(krate, parents_value)?;

        let rows_value = value.entry("i").ok_or_else(|| ResolveError::MissingKey {
            krate: krate.to_string(),
            key: "i",
        })?;
        let rows = self
            .array_of(rows_value)
            .ok_or_else(|| shape(krate, "`i`", "an array"))?;

        let mut entries = Vec::with_capacity(rows.len());
        let mut last_path = String::new();
        for (row_idx, row) in rows.iter().enumerate() {
            entries.push(self.entry_row(krate, row_idx, row, parents.len(), &mut last_path)?);
        }

        Ok(CrateEntries {
            doc,
            entries,
            parents,
        })
    }

    fn parents(&self, krate: &str, value: &'a RawValue) -> Result<Vec<Parent>, ResolveError> {
        let rows = self
            .array_of(value)
            .ok_or_else(|| shape(krate, "`p`", "an array"))?;

        let mut parents = Vec::with_capacity(rows.len());
        for (idx, pair) in rows.iter().enumerate() {
            let slots = self
                .array_of(pair)
                .filter(|slots| slots.len() == 2)
                .ok_or_else(|| {
                    shape(krate, format!("parent {idx}"), "a [kind, name] pair")
                })?;
            let kind = self.item_kind(krate, &slots[0], || format!("parent {idx} kind"))?;
            let name = self
                .try_string(&slots[1])?
                .ok_or_else(|| shape(krate, format!("parent {idx} name"), "a string"))?;
            parents.push(Parent::new(kind, name));
        }
        Ok(parents)
    }

    fn entry_row(
        &self,
        krate: &str,
        row_idx: usize,
        row: &'a RawValue,
        parents_len: usize,
        last_path: &mut String,
    ) -> Result<IndexEntry, ResolveError> {
        let slots = self
            .array_of(row)
            .ok_or_else(|| shape(krate, format!("entry {row_idx}"), "an array"))?;
        if !(4..=6).contains(&slots.len()) {
            return Err(ResolveError::RowArity {
                krate: krate.to_string(),
                row: row_idx,
                len: slots.len(),
            });
        }

        let kind = self.item_kind(krate, &slots[0], || format!("entry {row_idx} kind"))?;
        let name = self
            .try_string(&slots[1])?
            .ok_or_else(|| shape(krate, format!("entry {row_idx} name"), "a string"))?
            .to_string();

        // An empty path inherits the previous row's; the first row of a
        // well-formed artifact always carries its path in full.
        let raw_path = self
            .try_string(&slots[2])?
            .ok_or_else(|| shape(krate, format!("entry {row_idx} path"), "a string"))?;
        if !raw_path.is_empty() {
            last_path.clear();
            last_path.push_str(raw_path);
        }
        let path = last_path.clone();

        let desc = self
            .try_string(&slots[3])?
            .ok_or_else(|| shape(krate, format!("entry {row_idx} desc"), "a string"))?
            .to_string();

        let parent = match slots.get(4) {
            None => None,
            Some(v) if self.is_null(v) => None,
            Some(v) => {
                let raw_idx = self.number(v).ok_or_else(|| {
                    shape(krate, format!("entry {row_idx} parent"), "a number or null")
                })?;
                let idx = u32::try_from(raw_idx)
                    .ok()
                    .filter(|&i| (i as usize) < parents_len)
                    .ok_or_else(|| ResolveError::ParentOutOfBounds {
                        krate: krate.to_string(),
                        row: row_idx,
                        index: raw_idx,
                        len: parents_len,
                    })?;
                Some(idx)
            }
        };

        let signature = match slots.get(5) {
            None => None,
            Some(v) if self.is_null(v) => None,
            Some(v) => Some(self.signature(krate, row_idx, v)?),
        };

        Ok(IndexEntry {
            kind,
            name,
            path,
            desc,
            parent,
            signature,
        })
    }

    /// `[inputs]` or `[inputs, output]`, where a lone output type is written
    /// bare instead of as a one-element list.
    fn signature(
        &self,
        krate: &str,
        row_idx: usize,
        value: &'a RawValue,
    ) -> Result<FunctionSignature, ResolveError> {
        let parts = self.array_of(value).ok_or_else(|| {
            shape(krate, format!("entry {row_idx} signature"), "an array or null")
        })?;
        let (inputs_value, output_value) = match parts {
            [inputs] => (inputs, None),
            [inputs, output] => (inputs, Some(output)),
            _ => {
                return Err(shape(
                    krate,
                    format!("entry {row_idx} signature"),
                    "one or two elements",
                ));
            }
        };

        let inputs = self
            .array_of(inputs_value)
            .ok_or_else(|| {
                shape(krate, format!("entry {row_idx} signature inputs"), "an array")
            })?
            .iter()
            .map(|ty| self.type_name(krate, row_idx, ty))
            .collect::<Result<Vec<_>, _>>()?;

        let output = match output_value {
            None => Vec::new(),
            Some(out) => {
                let elems = self.array_of(out).ok_or_else(|| {
                    shape(krate, format!("entry {row_idx} signature output"), "an array")
                })?;
                match elems.first() {
                    None => Vec::new(),
                    // A list of types starts with a nested array; a bare
                    // type name starts with its head string.
                    Some(first) if matches!(first.kind, RawValueKind::Array(_)) => elems
                        .iter()
                        .map(|ty| self.type_name(krate, row_idx, ty))
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(_) => vec![self.type_name_slots(krate, row_idx, elems)?],
                }
            }
        };

        Ok(FunctionSignature { inputs, output })
    }

    fn type_name(
        &self,
        krate: &str,
        row_idx: usize,
        value: &'a RawValue,
    ) -> Result<TypeName, ResolveError> {
        let slots = self.array_of(value).ok_or_else(|| {
            shape(krate, format!("entry {row_idx} signature type"), "an array")
        })?;
        self.type_name_slots(krate, row_idx, slots)
    }

    fn type_name_slots(
        &self,
        krate: &str,
        row_idx: usize,
        slots: &'a [RawValue],
    ) -> Result<TypeName, ResolveError> {
        let bad_shape = || {
            shape(
                krate,
                format!("entry {row_idx} signature type"),
                "[name] or [name, [generics]]",
            )
        };
        match slots {
            [name] => {
                let name = self.try_string(name)?.ok_or_else(bad_shape)?;
                Ok(TypeName::new(name))
            }
            [name, generics] => {
                let name = self.try_string(name)?.ok_or_else(bad_shape)?;
                let generics = self
                    .array_of(generics)
                    .ok_or_else(bad_shape)?
                    .iter()
                    .map(|g| {
                        self.try_string(g)
                            .and_then(|s| s.ok_or_else(bad_shape))
                            .map(str::to_string)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeName::with_generics(name, generics))
            }
            _ => Err(bad_shape()),
        }
    }

    fn item_kind(
        &self,
        krate: &str,
        value: &RawValue,
        place: impl FnOnce() -> String,
    ) -> Result<ItemType, ResolveError> {
        let code = self
            .number(value)
            .ok_or_else(|| shape(krate, place(), "a kind code"))?;
        u32::try_from(code)
            .ok()
            .and_then(ItemType::from_code)
            .ok_or(ResolveError::UnknownKind {
                krate: krate.to_string(),
                code,
            })
    }
}

fn shape(krate: &str, place: impl Into<String>, expected: &'static str) -> ResolveError {
    ResolveError::Shape {
        krate: krate.to_string(),
        place: place.into(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_artifact;
    use assert2::{check, let_assert};

    fn resolve_str(source: &str) -> Result<SearchIndex, ResolveError> {
        resolve(&parse_artifact(source).unwrap())
    }

    const PROLOGUE: &str = r#"var N=null,E="",T="t",U="u",searchIndex={};"#;

    #[test]
    fn minimal_artifact_resolves() {
        let source = format!(
            "{PROLOGUE}var R=[\"word\",\"into_words\"];\
             searchIndex[\"demo\"]={{\"doc\":\"Word splitting.\",\"i\":[\
             [3,R[0],\"demo\",E,N,N],\
             [11,R[1],E,E,0,[[[\"self\"]],[[R[0]],[U]]]],\
             [5,\"free\",\"demo::util\",\"A free function.\",N,[[[T]],[\"bool\"]]]],\
             \"p\":[[3,R[0]]]}};\
             initSearch(searchIndex);addSearchOptions(searchIndex);"
        );
        let index = resolve_str(&source).unwrap();
        check!(index.len() == 1);

        let demo = index.get("demo").unwrap();
        check!(demo.doc == "Word splitting.");
        check!(demo.parents == vec![Parent::new(ItemType::Struct, "word")]);

        let rows = &demo.entries;
        check!(rows.len() == 3);
        check!(rows[0].kind == ItemType::Struct);
        check!(rows[0].name == "word");
        check!(rows[0].path == "demo");
        check!(rows[0].parent.is_none());
        check!(rows[0].signature.is_none());

        // Empty path inherits, constants resolve, outputs stay a list.
        check!(rows[1].path == "demo");
        check!(rows[1].parent == Some(0));
        let_assert!(Some(sig) = &rows[1].signature);
        check!(sig.inputs == vec![TypeName::new("self")]);
        check!(sig.output == vec![TypeName::new("word"), TypeName::new("u")]);

        // A fresh path resets the delta, bare outputs become singletons.
        check!(rows[2].path == "demo::util");
        check!(rows[2].desc == "A free function.");
        let_assert!(Some(sig) = &rows[2].signature);
        check!(sig.inputs == vec![TypeName::new("t")]);
        check!(sig.output == vec![TypeName::new("bool")]);
    }

    #[test]
    fn leading_empty_path_resolves_to_empty() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[[5,\"f\",E,E]],\"p\":[]}};\
             initSearch(searchIndex);"
        );
        let index = resolve_str(&source).unwrap();
        check!(index.get("demo").unwrap().entries[0].path.is_empty());
    }

    #[test]
    fn short_rows_read_missing_slots_as_null() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[\
             [0,\"m\",\"demo\",E],[5,\"f\",E,E,N]],\"p\":[]}};"
        );
        let index = resolve_str(&source).unwrap();
        let demo = index.get("demo").unwrap();
        check!(demo.entries[0].parent.is_none());
        check!(demo.entries[0].signature.is_none());
        check!(demo.entries[1].signature.is_none());
    }

    #[test]
    fn later_assignment_wins() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":\"first\",\"i\":[],\"p\":[]}};\
             searchIndex[\"demo\"]={{\"doc\":\"second\",\"i\":[],\"p\":[]}};"
        );
        let index = resolve_str(&source).unwrap();
        check!(index.len() == 1);
        check!(index.get("demo").unwrap().doc == "second");
    }

    #[test]
    fn intern_reference_out_of_bounds() {
        let source = format!(
            "{PROLOGUE}var R=[\"only\"];\
             searchIndex[\"demo\"]={{\"doc\":R[1],\"i\":[],\"p\":[]}};"
        );
        let_assert!(Err(ResolveError::InternOutOfBounds { array, index, len }) =
            resolve_str(&source));
        check!(array == "R");
        check!(index == 1);
        check!(len == 1);
    }

    #[test]
    fn reference_to_undeclared_array() {
        let source =
            format!("{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":R[0],\"i\":[],\"p\":[]}};");
        let_assert!(Err(ResolveError::UnknownConstant(name)) = resolve_str(&source));
        check!(name == "R");
    }

    #[test]
    fn parent_index_out_of_bounds() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[\
             [11,\"f\",\"demo\",E,2,N]],\"p\":[[3,\"Word\"]]}};"
        );
        let_assert!(Err(ResolveError::ParentOutOfBounds { row, index, len, .. }) =
            resolve_str(&source));
        check!(row == 0);
        check!(index == 2);
        check!(len == 1);
    }

    #[test]
    fn unknown_kind_code() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[[26,\"x\",\"demo\",E]],\"p\":[]}};"
        );
        let_assert!(Err(ResolveError::UnknownKind { code, .. }) = resolve_str(&source));
        check!(code == 26);
    }

    #[test]
    fn row_arity_out_of_range() {
        let source = format!(
            "{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[[5,\"f\",\"demo\"]],\"p\":[]}};"
        );
        let_assert!(Err(ResolveError::RowArity { row: 0, len: 3, .. }) = resolve_str(&source));
    }

    #[test]
    fn missing_record_key() {
        let source = format!("{PROLOGUE}searchIndex[\"demo\"]={{\"doc\":E,\"i\":[]}};");
        let_assert!(Err(ResolveError::MissingKey { krate, key: "p" }) = resolve_str(&source));
        check!(krate == "demo");
    }

    #[test]
    fn assignment_to_undeclared_target() {
        let source = r#"searchIndex["demo"]={"doc":"","i":[],"p":[]};"#;
        let_assert!(Err(ResolveError::UnknownConstant(name)) = resolve_str(source));
        check!(name == "searchIndex");
    }

    #[test]
    fn artifact_without_assignments() {
        let_assert!(Err(ResolveError::NoCrates) = resolve_str(PROLOGUE));
    }

    #[test]
    fn sample_shaped_parent_and_variant_rows() {
        // Mirrors the enum + variants layout real artifacts used: variants
        // reference their enum through the parent table.
        let source = format!(
            "{PROLOGUE}var R=[\"GraphemeIncomplete\"];\
             searchIndex[\"seg\"]={{\"doc\":E,\"i\":[\
             [4,R[0],\"seg\",\"An error.\",N,N],\
             [13,\"PreContext\",E,E,0,N],\
             [13,\"NextChunk\",E,E,0,N]],\
             \"p\":[[4,R[0]]]}};"
        );
        let index = resolve_str(&source).unwrap();
        let seg = index.get("seg").unwrap();
        check!(seg.entries[1].kind == ItemType::Variant);
        check!(seg.parent_of(&seg.entries[1]) == Some(&Parent::new(ItemType::Enum, "GraphemeIncomplete")));
        check!(seg.display_path(&seg.entries[2]) == "seg::GraphemeIncomplete::NextChunk");
    }
}
