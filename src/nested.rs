//! Nested regex extraction with absolute position tracking.
//!
//! The first pattern finds candidate spans in the whole text. Every following
//! pattern only searches inside the capture produced by the previous one, and
//! offsets compound so each reported match points into the original text.

use regex::{Captures, Match, Regex};

/// A class string extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    /// The captured text
    pub text: String,
    /// Byte offset of `text` in the original document
    pub byte_start: usize,
}

impl TextMatch {
    /// Byte offset one past the end of the capture.
    pub fn byte_end(&self) -> usize {
        self.byte_start + self.text.len()
    }
}

/// Run `patterns` as successive narrowing steps over `text`, calling
/// `on_match` with each innermost capture and its offset.
///
/// `base_offset` is the position of `text` within the original document.
/// An empty pattern list reports nothing. A match whose capture groups are all
/// empty or unset is skipped.
pub fn for_each_nested_match<F>(
    patterns: &[Regex],
    text: &str,
    base_offset: usize,
    on_match: &mut F,
) where
    F: FnMut(&str, usize),
{
    let Some((pattern, rest)) = patterns.split_first() else {
        return;
    };

    // `captures_iter` keeps its cursor local to this call, so recursion and
    // concurrent callers never share search state.
    for captures in pattern.captures_iter(text) {
        let Some(value) = first_value_group(&captures) else {
            continue;
        };

        let offset = base_offset + value.start();
        if rest.is_empty() {
            on_match(value.as_str(), offset);
        } else {
            for_each_nested_match(rest, value.as_str(), offset, on_match);
        }
    }
}

/// Collect every innermost capture of `patterns` in `text`, in discovery order.
pub fn find_nested(patterns: &[Regex], text: &str) -> Vec<TextMatch> {
    let mut matches = Vec::new();
    for_each_nested_match(patterns, text, 0, &mut |value, byte_start| {
        matches.push(TextMatch {
            text: value.to_string(),
            byte_start,
        });
    });
    matches
}

/// First capture group after group 0 that participated with non-empty text.
///
/// Alternations like `class="(...)"|className=\{(...)\}` populate exactly one
/// group; when several groups are set the lowest-numbered one wins.
fn first_value_group<'t>(captures: &Captures<'t>) -> Option<Match<'t>> {
    captures
        .iter()
        .skip(1)
        .flatten()
        .find(|group| !group.as_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_extracts_single_match_with_position() {
        let text = r#"<div class="flex container">Hello</div>"#;
        let matches = find_nested(&[re(r#"class="([^"]*)""#)], text);

        assert_eq!(
            matches,
            vec![TextMatch {
                text: "flex container".to_string(),
                byte_start: 12,
            }]
        );
    }

    #[test]
    fn test_extracts_multiple_matches() {
        let text = r#"<div class="flex">A</div><div class="container">B</div>"#;
        let matches = find_nested(&[re(r#"class="([^"]*)""#)], text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text, "flex");
        assert_eq!(matches[0].byte_start, 12);
        assert_eq!(matches[1].text, "container");
        assert_eq!(matches[1].byte_start, 37);
    }

    #[test]
    fn test_nested_patterns_narrow_the_search() {
        let text = r#"<div><div class="flex container"></div></div>"#;
        let patterns = [re(r"<div[^>]*>(.*?)</div>"), re(r#"class="([^"]*)""#)];
        let matches = find_nested(&patterns, text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "flex container");
        assert_eq!(
            &text[matches[0].byte_start..matches[0].byte_end()],
            "flex container"
        );
    }

    #[test]
    fn test_no_matches_never_calls_back() {
        let mut calls = 0;
        for_each_nested_match(
            &[re(r#"class="([^"]*)""#)],
            "<div>No classes here</div>",
            0,
            &mut |_, _| calls += 1,
        );
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_offset_accounts_for_prefix() {
        let text = r#"prefix <div class="flex">content</div>"#;
        let matches = find_nested(&[re(r#"class="([^"]*)""#)], text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].byte_start, 19);
    }

    #[test]
    fn test_base_offset_is_added() {
        let mut seen = Vec::new();
        for_each_nested_match(&[re(r"x(y)")], "axy", 100, &mut |value, offset| {
            seen.push((value.to_string(), offset));
        });
        assert_eq!(seen, vec![("y".to_string(), 102)]);
    }

    #[test]
    fn test_empty_pattern_list_reports_nothing() {
        let matches = find_nested(&[], r#"<div class="flex">content</div>"#);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_alternation_uses_first_populated_group() {
        let text = "<div className={flex container}>content</div>";
        let matches = find_nested(&[re(r#"class="([^"]*)"|className=\{([^\}]*)\}"#)], text);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "flex container");
        assert_eq!(matches[0].byte_start, 16);
    }

    #[test]
    fn test_several_populated_groups_pick_the_lowest() {
        let matches = find_nested(&[re(r"(a+)(b+)")], "xaabb");
        assert_eq!(matches[0].text, "aa");
        assert_eq!(matches[0].byte_start, 1);
    }

    #[test]
    fn test_nested_extraction_positions_slice_the_original() {
        let text = r#"directive: ["flex items-center", "p-4 justify-between"]"#;
        let patterns = [re(r"directive\s*:\s*\[([^\]]*)\]"), re(r#""([^"]*)""#)];
        let matches = find_nested(&patterns, text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text, "flex items-center");
        assert_eq!(matches[0].byte_start, 13);
        assert_eq!(matches[1].text, "p-4 justify-between");
        assert_eq!(matches[1].byte_start, 34);
        for m in &matches {
            assert_eq!(&text[m.byte_start..m.byte_end()], m.text);
        }
    }

    #[test]
    fn test_repeated_value_inside_match_uses_group_position() {
        // The captured text recurs later in the full match.
        let text = r#"class="flex" data="flex""#;
        let matches = find_nested(&[re(r#"class="(\w+)" data="\w+""#)], text);

        assert_eq!(matches[0].text, "flex");
        assert_eq!(matches[0].byte_start, 7);
    }

    #[test]
    fn test_empty_captures_are_skipped() {
        let matches = find_nested(&[re(r#"class="([^"]*)""#)], r#"<a class="">"#);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_pattern_without_capture_groups_reports_nothing() {
        let mut calls = 0;
        for_each_nested_match(
            &[re(r#"class="[^"]*""#)],
            r#"<div class="flex p-4">content</div>"#,
            0,
            &mut |_, _| calls += 1,
        );
        assert_eq!(calls, 0);

        let nested = [re(r"<div[^>]*>(.*?)</div>"), re(r"flex")];
        assert!(find_nested(&nested, "<div>flex</div>").is_empty());
    }

    #[test]
    fn test_multibyte_text_keeps_byte_offsets_on_boundaries() {
        let text = r#"<p title="héllo" class="flex p-4">"#;
        let matches = find_nested(&[re(r#"class="([^"]*)""#)], text);

        assert_eq!(
            &text[matches[0].byte_start..matches[0].byte_end()],
            "flex p-4"
        );
    }
}
