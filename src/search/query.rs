//! Query parsing: kind filters, path qualification, signature searches.
//!
//! The grammar follows the search widget the artifact was written for:
//!
//! - `fn:needle` restricts hits to one kind; the filter names are the legacy
//!   ones (`fn`, `struct`, `method`, `tymethod`, ...);
//! - `path::to::Item` requires the leading components to suffix-match the
//!   entry's path, with the final component as the name needle;
//! - `self, usize -> bool` matches signatures by input and output type
//!   names;
//! - anything else is a plain name-and-docs search.

use crate::error::QueryError;
use crate::item_type::ItemType;

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Restrict hits to entries of one kind.
    pub kind: Option<ItemType>,
    pub terms: QueryTerms,
}

/// What the query matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerms {
    /// Name search, optionally path-qualified.
    Name {
        /// Leading `::` components, lowercased; must suffix-match the
        /// entry's path segments.
        path: Vec<String>,
        /// The final component, lowercased.
        needle: String,
    },
    /// Signature search, all type names lowercased.
    Signature {
        inputs: Vec<String>,
        output: Option<String>,
    },
}

/// Parse a raw query string.
pub fn parse_query(raw: &str) -> Result<ParsedQuery, QueryError> {
    let mut rest = raw.trim();

    let kind = match kind_filter(rest)? {
        Some((kind, after)) => {
            rest = after;
            Some(kind)
        }
        None => None,
    };

    if let Some((inputs, output)) = rest.split_once("->") {
        return signature_query(kind, inputs, output);
    }

    let components: Vec<String> = rest
        .split("::")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    match components.split_last() {
        Some((needle, path)) => Ok(ParsedQuery {
            kind,
            terms: QueryTerms::Name {
                path: path.to_vec(),
                needle: needle.clone(),
            },
        }),
        None => Err(QueryError::Empty),
    }
}

/// A leading `name:` filter, if present. A `::` is path syntax, not a
/// filter; any other name before a colon must be one of the legacy filter
/// names.
fn kind_filter(query: &str) -> Result<Option<(ItemType, &str)>, QueryError> {
    let Some(colon) = query.find(':') else {
        return Ok(None);
    };
    if query[colon..].starts_with("::") {
        return Ok(None);
    }
    let name = query[..colon].trim();
    match ItemType::from_filter_name(name) {
        Some(kind) => Ok(Some((kind, &query[colon + 1..]))),
        None => Err(QueryError::UnknownKindFilter(name.to_string())),
    }
}

fn signature_query(
    kind: Option<ItemType>,
    inputs: &str,
    output: &str,
) -> Result<ParsedQuery, QueryError> {
    let inputs: Vec<String> = inputs
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect();

    let output = output.trim();
    let names = output
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .count();
    let output = if output.is_empty() {
        None
    } else if output.contains("->") || names > 1 {
        return Err(QueryError::MultipleReturns(output.to_string()));
    } else {
        Some(output.to_lowercase())
    };

    if inputs.is_empty() && output.is_none() {
        return Err(QueryError::Empty);
    }
    Ok(ParsedQuery {
        kind,
        terms: QueryTerms::Signature { inputs, output },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn plain_needle() {
        let_assert!(Ok(q) = parse_query("Graphemes"));
        check!(q.kind.is_none());
        check!(
            q.terms
                == QueryTerms::Name {
                    path: vec![],
                    needle: "graphemes".to_string(),
                }
        );
    }

    #[test]
    fn path_qualified() {
        let_assert!(Ok(q) = parse_query("unicode_segmentation::GraphemeCursor::next_boundary"));
        let_assert!(QueryTerms::Name { path, needle } = q.terms);
        check!(path == vec!["unicode_segmentation", "graphemecursor"]);
        check!(needle == "next_boundary");
    }

    #[rstest]
    #[case("fn:graphemes", ItemType::Function)]
    #[case("struct:Cursor", ItemType::Struct)]
    #[case("method: next ", ItemType::Method)]
    #[case("tymethod:next", ItemType::TyMethod)]
    fn kind_filters(#[case] raw: &str, #[case] kind: ItemType) {
        let_assert!(Ok(q) = parse_query(raw));
        check!(q.kind == Some(kind));
    }

    #[test]
    fn kind_filter_combines_with_path() {
        let_assert!(Ok(q) = parse_query("method:GraphemeCursor::next"));
        check!(q.kind == Some(ItemType::Method));
        let_assert!(QueryTerms::Name { path, needle } = q.terms);
        check!(path == vec!["graphemecursor"]);
        check!(needle == "next");
    }

    #[test]
    fn unknown_kind_filter_is_an_error() {
        let_assert!(Err(QueryError::UnknownKindFilter(name)) = parse_query("blorp:foo"));
        check!(name == "blorp");
    }

    #[test]
    fn signature_with_inputs_and_output() {
        let_assert!(Ok(q) = parse_query("Self, usize -> Bool"));
        let_assert!(QueryTerms::Signature { inputs, output } = q.terms);
        check!(inputs == vec!["self", "usize"]);
        check!(output == Some("bool".to_string()));
    }

    #[test]
    fn signature_output_only() {
        let_assert!(Ok(q) = parse_query("-> GraphemeCursor"));
        let_assert!(QueryTerms::Signature { inputs, output } = q.terms);
        check!(inputs.is_empty());
        check!(output == Some("graphemecursor".to_string()));
    }

    #[test]
    fn signature_inputs_only() {
        let_assert!(Ok(q) = parse_query("self usize ->"));
        let_assert!(QueryTerms::Signature { inputs, output } = q.terms);
        check!(inputs == vec!["self", "usize"]);
        check!(output.is_none());
    }

    #[test]
    fn two_return_types_are_rejected() {
        let_assert!(Err(QueryError::MultipleReturns(_)) = parse_query("self -> str usize"));
        let_assert!(Err(QueryError::MultipleReturns(_)) = parse_query("a -> b -> c"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("::")]
    #[case("fn:")]
    #[case("->")]
    fn empty_queries_are_rejected(#[case] raw: &str) {
        let_assert!(Err(QueryError::Empty) = parse_query(raw));
    }
}
