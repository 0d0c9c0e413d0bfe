//! Compact searchable signatures for function-like entries.
//!
//! The generator reduced each `fn` to the lowercased names of its input and
//! output types so the widget could answer `usize -> self` style queries
//! without shipping real type information. Generic arguments are flattened to
//! bare names one level deep; anything the generator could not name caused
//! the whole signature to be dropped (`null` in the row).

/// A type reference inside a signature: a lowercased head name plus the
/// lowercased names of its generic arguments, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub generics: Vec<String>,
}

impl TypeName {
    /// A plain type with no generic arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    /// A type with generic arguments, e.g. `result<bool, graphemeincomplete>`.
    pub fn with_generics<I, S>(name: impl Into<String>, generics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            generics: generics.into_iter().map(Into::into).collect(),
        }
    }

    /// True when `needle` names this type or one of its generic arguments.
    pub fn mentions(&self, needle: &str) -> bool {
        self.name == needle || self.generics.iter().any(|g| g == needle)
    }
}

/// The `[inputs, output]` pair attached to function-like rows.
///
/// An empty `output` models the "no output written" case; the wire format
/// additionally flattens a single output type (written bare rather than as a
/// one-element list), which the parser and emitter handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionSignature {
    pub inputs: Vec<TypeName>,
    pub output: Vec<TypeName>,
}

impl FunctionSignature {
    pub fn new(inputs: Vec<TypeName>, output: Vec<TypeName>) -> Self {
        Self { inputs, output }
    }

    /// True when some input type (or generic argument) is named `needle`.
    pub fn mentions_input(&self, needle: &str) -> bool {
        self.inputs.iter().any(|ty| ty.mentions(needle))
    }

    /// True when some output type (or generic argument) is named `needle`.
    pub fn mentions_output(&self, needle: &str) -> bool {
        self.output.iter().any(|ty| ty.mentions(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn mentions_checks_head_and_generics() {
        let ty = TypeName::with_generics("result", ["bool", "graphemeincomplete"]);
        check!(ty.mentions("result"));
        check!(ty.mentions("bool"));
        check!(ty.mentions("graphemeincomplete"));
        check!(!ty.mentions("usize"));
    }

    #[test]
    fn signature_lookup_spans_all_positions() {
        // fn is_boundary(&self, chunk: &str, chunk_start: usize)
        //     -> Result<bool, GraphemeIncomplete>
        let sig = FunctionSignature::new(
            vec![
                TypeName::new("self"),
                TypeName::new("str"),
                TypeName::new("usize"),
            ],
            vec![TypeName::with_generics(
                "result",
                ["bool", "graphemeincomplete"],
            )],
        );
        check!(sig.mentions_input("self"));
        check!(sig.mentions_input("usize"));
        check!(!sig.mentions_input("bool"));
        check!(sig.mentions_output("result"));
        check!(sig.mentions_output("graphemeincomplete"));
        check!(!sig.mentions_output("str"));
    }
}
