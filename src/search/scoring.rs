//! Relevance scoring for name and path matches.

/// Score how well a name matches the query needle.
///
/// - 100: exact match
/// - 50: name starts with the needle
/// - 10: name contains the needle
/// - None: no match
///
/// Both sides are expected lowercased by the caller.
pub(crate) fn calculate_relevance(name: &str, needle: &str) -> Option<u32> {
    if name == needle {
        Some(100)
    } else if name.starts_with(needle) {
        Some(50)
    } else if name.contains(needle) {
        Some(10)
    } else {
        None
    }
}

/// Score a `path::to::Item` query against an entry's path segments.
///
/// The query's leading components must be a suffix of the segments, so
/// `cursor::GraphemeCursor` finds `unicode_segmentation::cursor` items
/// without spelling out the crate. Exact-length matches outrank plain
/// suffix matches:
///
/// - 100: every segment spelled out (`segments.len() == components.len()`)
/// - 90: suffix match on a longer path
/// - None: no match, or nothing to match against
///
/// Both sides are expected lowercased by the caller.
pub(crate) fn calculate_path_relevance(segments: &[String], components: &[String]) -> Option<u32> {
    if components.is_empty() || segments.len() < components.len() {
        return None;
    }
    let suffix = &segments[segments.len() - components.len()..];
    if suffix == components {
        if segments.len() == components.len() {
            Some(100)
        } else {
            Some(90)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("graphemes", "graphemes", Some(100))]
    #[case("graphemes", "graph", Some(50))]
    #[case("unicode_words", "words", Some(10))]
    #[case("graphemes", "cursor", None)]
    #[case("", "", Some(100))]
    fn name_relevance(#[case] name: &str, #[case] needle: &str, #[case] expected: Option<u32>) {
        check!(calculate_relevance(name, needle) == expected);
    }

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[rstest]
    #[case(&["demo", "cursor"], &["demo", "cursor"], Some(100))]
    #[case(&["demo", "deep", "cursor"], &["deep", "cursor"], Some(90))]
    #[case(&["demo", "cursor"], &["cursor"], Some(90))]
    #[case(&["demo", "cursor"], &["demo"], None)]
    #[case(&["demo"], &["demo", "cursor"], None)]
    #[case(&["demo"], &[], None)]
    fn path_relevance(
        #[case] segments: &[&str],
        #[case] components: &[&str],
        #[case] expected: Option<u32>,
    ) {
        check!(calculate_path_relevance(&segs(segments), &segs(components)) == expected);
    }
}
