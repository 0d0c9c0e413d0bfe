//! Documentation snippet derivation.
//!
//! Desc slots hold a one-line summary of the item's documentation: the first
//! paragraph, joined onto a single line, lightly de-marked, and truncated to
//! roughly sixty characters with a trailing `…`. Snippets in shipped indexes
//! keep their backticks and unresolved reference brackets, so stripping is
//! limited to inline link targets and asterisk emphasis markers.

/// Character budget for a snippet before truncation kicks in.
const SNIPPET_CHARS: usize = 60;

/// Derive the desc snippet for an item from its full documentation text.
pub fn summarize(docs: &str) -> String {
    shorten(&strip_markup(&first_paragraph(docs)))
}

/// The first non-empty run of lines, joined with single spaces.
fn first_paragraph(docs: &str) -> String {
    docs.lines()
        .map(str::trim_end)
        .skip_while(|line| line.chars().all(char::is_whitespace))
        .take_while(|line| !line.chars().all(char::is_whitespace))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop inline link targets and asterisk emphasis markers.
///
/// Code spans are copied verbatim, so `a * b` inside backticks keeps its
/// star, and reference-style links without an inline target stay literal,
/// brackets included.
fn strip_markup(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '`' => {
                out.push('`');
                i += 1;
                while i < chars.len() {
                    let c = chars[i];
                    out.push(c);
                    i += 1;
                    if c == '`' {
                        break;
                    }
                }
            }
            '[' => {
                if let Some((text_end, target_end)) = inline_link(&chars, i) {
                    out.extend(&chars[i + 1..text_end]);
                    i = target_end + 1;
                } else {
                    out.push('[');
                    i += 1;
                }
            }
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                let spaced_before = start == 0 || chars[start - 1].is_whitespace();
                let spaced_after = i >= chars.len() || chars[i].is_whitespace();
                // A star run with whitespace on both sides is plain text, not
                // an emphasis delimiter.
                if spaced_before && spaced_after {
                    out.extend(std::iter::repeat_n('*', i - start));
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// For `[text](target)` starting at `open`, the indices of `]` and `)`.
fn inline_link(chars: &[char], open: usize) -> Option<(usize, usize)> {
    let text_end = open + chars[open..].iter().position(|&c| c == ']')?;
    if chars.get(text_end + 1) != Some(&'(') {
        return None;
    }
    let target_end = text_end + chars[text_end..].iter().position(|&c| c == ')')?;
    Some((text_end, target_end))
}

/// Truncate to the snippet budget at a word boundary, appending `…`.
///
/// Words are accumulated while the running length (each word plus one for
/// its separator) stays under the budget; a single overlong word therefore
/// produces a bare `…`. Strings within budget come back unchanged.
pub fn shorten(s: &str) -> String {
    if s.chars().count() > SNIPPET_CHARS {
        let mut len = 0;
        let mut ret = s
            .split_whitespace()
            .take_while(|word| {
                len += word.chars().count() + 1;
                len < SNIPPET_CHARS
            })
            .collect::<Vec<_>>()
            .join(" ");
        ret.push('…');
        ret
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    // Expectations lifted from snippets in a shipped index.
    #[rstest]
    #[case(
        "An iterator over the substrings of a string which, after splitting the string on grapheme cluster boundaries, contains no whitespace.",
        "An iterator over the substrings of a string which, after…"
    )]
    #[case(
        "More pre-context is needed. The caller should call `provide_context` with the given chunk.",
        "More pre-context is needed. The caller should call…"
    )]
    fn shorten_matches_shipped_snippets(#[case] input: &str, #[case] expected: &str) {
        check!(shorten(input) == expected);
    }

    #[test]
    fn short_strings_pass_through() {
        let s = "External iterator for a string's grapheme clusters.";
        check!(shorten(s) == s);
        check!(shorten("") == "");
    }

    #[test]
    fn exactly_sixty_chars_passes_through() {
        let s = "a".repeat(SNIPPET_CHARS);
        check!(shorten(&s) == s);
        let over = "a ".repeat(31);
        check!(shorten(over.trim_end()) != over.trim_end());
    }

    #[test]
    fn overlong_first_word_yields_bare_ellipsis() {
        let s = "x".repeat(80);
        check!(shorten(&s) == "…");
    }

    #[test]
    fn summary_takes_first_paragraph_only() {
        let docs = "Iterators which split strings on boundaries.\n\
                    \n\
                    According to standard annex #29, these rules are long.";
        check!(summarize(docs) == "Iterators which split strings on boundaries.");
    }

    #[test]
    fn summary_joins_wrapped_lines() {
        let docs = "Returns an iterator over\nsubstrings of `self`.";
        check!(summarize(docs) == "Returns an iterator over substrings of `self`.");
    }

    #[test]
    fn summary_skips_leading_blank_lines() {
        let docs = "\n\n  \nThe version of the standard that this crate tracks.";
        check!(summarize(docs) == "The version of the standard that this crate tracks.");
    }

    #[rstest]
    #[case(
        "See [the docs](https://example.com) for more.",
        "See the docs for more."
    )]
    #[case(
        "Wrapper around [`Graphemes`](crate::Graphemes).",
        "Wrapper around `Graphemes`."
    )]
    #[case("A *very* fast splitter.", "A very fast splitter.")]
    #[case("Splits on **word** boundaries.", "Splits on word boundaries.")]
    fn inline_markup_is_dropped(#[case] input: &str, #[case] expected: &str) {
        check!(summarize(input) == expected);
    }

    #[rstest]
    #[case("Returns the [grapheme clusters][graphemes] of `self`.")]
    #[case("Uses extended [grapheme cluster] rules.")]
    #[case("Computes `a * b` in place.")]
    #[case("Multiplies by 2 * 3.")]
    fn literal_text_survives(#[case] input: &str) {
        check!(summarize(input) == input);
    }

    #[test]
    fn empty_docs_produce_empty_snippet() {
        check!(summarize("") == "");
        check!(summarize("\n \n") == "");
    }
}
