//! Artifact parsing.
//!
//! `search-index.js` is a restricted JavaScript program: `var` declarations
//! (the constant prologue and the interning array), one bracketed assignment
//! per crate, and the two trailing initialization calls. Parsing runs in two
//! stages. [`parse_artifact`] lexes and parses the text into a [`RawArtifact`]
//! that still carries interning references, constant identifiers and source
//! spans; [`resolve`] then flattens it into the typed
//! [`SearchIndex`](crate::index::SearchIndex). The split exists so
//! [`validate`](crate::validate::validate) can report every problem in a raw
//! artifact instead of stopping at the first unresolvable reference.

mod lexer;
mod parser;
mod resolve;

pub use resolve::resolve;

use crate::error::SyntaxError;

/// A byte range in artifact source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A parsed artifact, before constant and reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArtifact {
    pub stmts: Vec<RawStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawStmt {
    /// `var N=null,E="",...;`
    VarDecl { bindings: Vec<RawBinding>, span: Span },
    /// `searchIndex["crate"]={...};`
    Assign {
        target: String,
        key: String,
        key_span: Span,
        value: RawValue,
        span: Span,
    },
    /// `initSearch(searchIndex);`
    Call {
        callee: String,
        arg: String,
        span: Span,
    },
}

impl RawStmt {
    pub fn span(&self) -> Span {
        match self {
            Self::VarDecl { span, .. } | Self::Assign { span, .. } | Self::Call { span, .. } => {
                *span
            }
        }
    }
}

/// One `name` or `name=value` inside a `var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBinding {
    pub name: String,
    pub value: Option<RawValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawValue {
    pub kind: RawValueKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValueKind {
    Null,
    Number(u64),
    Str(String),
    /// A bare constant reference (`E`, `T`, `U`, ...).
    Ident(String),
    /// An interning reference, `R[17]`.
    InternRef { array: String, index: u64 },
    Array(Vec<RawValue>),
    Object(Vec<RawEntry>),
}

/// One `"key":value` pair of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub key: String,
    pub key_span: Span,
    pub value: RawValue,
}

impl RawValue {
    /// The values of an array, or `None` for any other shape.
    pub fn as_array(&self) -> Option<&[RawValue]> {
        match &self.kind {
            RawValueKind::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Looks up a key in an object literal. Later duplicates win, matching
    /// the assignment semantics a JavaScript consumer would see.
    pub fn entry(&self, key: &str) -> Option<&RawValue> {
        match &self.kind {
            RawValueKind::Object(entries) => entries
                .iter()
                .rev()
                .find(|entry| entry.key == key)
                .map(|entry| &entry.value),
            _ => None,
        }
    }
}

/// Lex and parse artifact source text into its raw statement list.
pub fn parse_artifact(source: &str) -> Result<RawArtifact, SyntaxError> {
    let tokens = lexer::tokenize(source)?;
    parser::Parser::new(source, tokens).parse()
}
