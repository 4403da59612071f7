//! Whole-document class rewriting.
//!
//! Every matcher runs over the full document, each surviving match is sorted,
//! and changed matches become [`ReplacementSpan`]s spliced back in from the
//! rightmost one down so pending offsets stay valid.

use crate::matcher::{build_matchers, LangConfig, Matcher, MatcherError};
use crate::nested::{for_each_nested_match, TextMatch};
use crate::order::OrderSource;
use crate::sorter::SortOptions;

/// Documents containing this are left untouched.
pub const IGNORE_ALL_MARKER: &str = "headwind-ignore-all";
/// Class strings containing this are left untouched.
pub const IGNORE_MARKER: &str = "headwind-ignore";

/// A replacement of `[byte_start, byte_end)` in the original document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSpan {
    pub byte_start: usize,
    pub byte_end: usize,
    /// Original text (for verification)
    pub original: String,
    pub replacement: String,
}

impl ReplacementSpan {
    fn from_match(found: &TextMatch, replacement: String) -> Self {
        Self {
            byte_start: found.byte_start,
            byte_end: found.byte_end(),
            original: found.text.clone(),
            replacement,
        }
    }
}

/// Splice `spans` into `document`.
///
/// Spans are applied bottom-to-top. A span overlapping one already applied,
/// or whose original text no longer matches the document, is skipped.
pub fn apply_spans(document: &str, mut spans: Vec<ReplacementSpan>) -> String {
    spans.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

    let mut result = document.to_string();
    let mut floor = document.len();

    for span in spans {
        let stale = document.get(span.byte_start..span.byte_end) != Some(span.original.as_str());
        if span.byte_end > floor || stale {
            log::debug!(
                "skipping overlapping or stale span [{}, {})",
                span.byte_start,
                span.byte_end
            );
            continue;
        }

        result.replace_range(span.byte_start..span.byte_end, &span.replacement);
        floor = span.byte_start;
    }

    result
}

/// Sorts class strings in documents of one language.
#[derive(Debug, Clone)]
pub struct Rewriter {
    matchers: Vec<Matcher>,
    order: OrderSource,
    options: SortOptions,
    ignore_all_marker: String,
    ignore_marker: String,
}

impl Rewriter {
    /// Build a rewriter for `config`. Fails only on invalid regex syntax.
    pub fn new(
        config: Option<&LangConfig>,
        order: OrderSource,
        options: SortOptions,
    ) -> Result<Self, MatcherError> {
        Ok(Self::from_matchers(build_matchers(config)?, order, options))
    }

    pub fn from_matchers(matchers: Vec<Matcher>, order: OrderSource, options: SortOptions) -> Self {
        Self {
            matchers,
            order,
            options,
            ignore_all_marker: IGNORE_ALL_MARKER.to_string(),
            ignore_marker: IGNORE_MARKER.to_string(),
        }
    }

    pub fn with_ignore_markers(
        mut self,
        ignore_all_marker: impl Into<String>,
        ignore_marker: impl Into<String>,
    ) -> Self {
        self.ignore_all_marker = ignore_all_marker.into();
        self.ignore_marker = ignore_marker.into();
        self
    }

    /// Class strings eligible for sorting, rightmost first, each with the
    /// index of the matcher that found it.
    pub fn find_matches(&self, document: &str) -> Vec<(usize, TextMatch)> {
        if document.contains(&self.ignore_all_marker) {
            return Vec::new();
        }

        let mut found = Vec::new();
        for (idx, matcher) in self.matchers.iter().enumerate() {
            for_each_nested_match(&matcher.patterns, document, 0, &mut |text, byte_start| {
                if !text.contains(&self.ignore_marker) {
                    found.push((
                        idx,
                        TextMatch {
                            text: text.to_string(),
                            byte_start,
                        },
                    ));
                }
            });
        }

        found.sort_by(|(_, a), (_, b)| b.byte_start.cmp(&a.byte_start));
        found
    }

    /// Replacements for every match whose sorted form differs.
    pub fn plan(&self, document: &str) -> Vec<ReplacementSpan> {
        let found = self.find_matches(document);
        if found.is_empty() {
            return Vec::new();
        }

        let per_matcher: Vec<SortOptions> = self
            .matchers
            .iter()
            .map(|m| {
                self.options
                    .with_overrides(m.separator.as_ref(), m.replacement.as_deref())
            })
            .collect();

        let spans: Vec<ReplacementSpan> = found
            .iter()
            .filter_map(|(idx, text_match)| {
                let sorted = self.order.sort(&text_match.text, &per_matcher[*idx]);
                (sorted != text_match.text).then(|| ReplacementSpan::from_match(text_match, sorted))
            })
            .collect();

        log::debug!("{} match(es), {} to rewrite", found.len(), spans.len());
        spans
    }

    /// Sort every class string in `document`.
    ///
    /// Returns the input unchanged, byte for byte, when nothing needs sorting.
    pub fn rewrite(&self, document: &str) -> String {
        let spans = self.plan(document);
        if spans.is_empty() {
            return document.to_string();
        }
        apply_spans(document, spans)
    }
}

/// One-shot rewrite of `document` against a literal sort order.
pub fn rewrite(
    document: &str,
    config: &LangConfig,
    sort_order: &[String],
    options: &SortOptions,
) -> Result<String, MatcherError> {
    let rewriter = Rewriter::new(
        Some(config),
        OrderSource::canonical(sort_order.iter().cloned()),
        options.clone(),
    )?;
    Ok(rewriter.rewrite(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(classes: &[&str]) -> Vec<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    fn html() -> LangConfig {
        LangConfig::pattern(r#"class="([^"]+)""#)
    }

    fn rewriter(config: LangConfig, classes: &[&str]) -> Rewriter {
        Rewriter::new(
            Some(&config),
            OrderSource::canonical(classes.iter().copied()),
            SortOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sorts_class_attribute() {
        let out = rewrite(
            r#"<div class="p-4 flex m-2">content</div>"#,
            &html(),
            &order(&["flex", "m-2", "p-4"]),
            &SortOptions::default(),
        )
        .unwrap();
        assert_eq!(out, r#"<div class="flex m-2 p-4">content</div>"#);
    }

    #[test]
    fn test_ignore_marker_skips_match() {
        let input = r#"<div class="p-4 flex m-2 headwind-ignore">content</div>"#;
        let r = rewriter(html(), &["flex", "m-2", "p-4"]);
        assert_eq!(r.rewrite(input), input);
    }

    #[test]
    fn test_ignore_all_marker_skips_document() {
        let input = "<!-- headwind-ignore-all -->\n<div class=\"p-4 flex m-2\">content</div>";
        let r = rewriter(html(), &["flex", "m-2", "p-4"]);
        assert_eq!(r.rewrite(input), input);
    }

    #[test]
    fn test_custom_markers() {
        let r = rewriter(html(), &["a", "b"]).with_ignore_markers("sort-off-file", "sort-off");
        assert_eq!(
            r.rewrite(r#"<i class="b a sort-off">"#),
            r#"<i class="b a sort-off">"#
        );
        assert_eq!(
            r.rewrite(r#"<i class="b a headwind-ignore">"#),
            r#"<i class="a b headwind-ignore">"#
        );
        assert_eq!(
            r.rewrite("sort-off-file <i class=\"b a\">"),
            "sort-off-file <i class=\"b a\">"
        );
    }

    #[test]
    fn test_rewrites_multiple_matches_of_different_length() {
        let input = concat!(
            r#"<div class="p-4 flex m-2 flex">x</div>"#,
            r#"<span class="text-white bg-blue-500">y</span>"#
        );
        let r = rewriter(html(), &["flex", "m-2", "p-4", "bg-blue-500", "text-white"]);
        assert_eq!(
            r.rewrite(input),
            r#"<div class="flex m-2 p-4">x</div><span class="bg-blue-500 text-white">y</span>"#
        );
    }

    #[test]
    fn test_several_configs_each_apply() {
        let config = LangConfig::List(vec![
            LangConfig::pattern(r#"class="([^"]+)""#),
            LangConfig::Structured(crate::matcher::StructuredConfig {
                regex: Some(crate::matcher::Loose::Valid(crate::matcher::PatternField::One(
                    r"className=\{([^\}]+)\}".to_string(),
                ))),
                ..Default::default()
            }),
        ]);
        let input = "<div class=\"p-4 flex\" className={text-white bg-blue-500}>content</div>";
        let r = rewriter(config, &["flex", "p-4", "bg-blue-500", "text-white"]);
        assert_eq!(
            r.rewrite(input),
            "<div class=\"flex p-4\" className={bg-blue-500 text-white}>content</div>"
        );
    }

    #[test]
    fn test_matcher_separator_overrides_options() {
        let config: LangConfig = serde_json::from_str(
            r#"{"regex": "data-cls=\"([^\"]+)\"", "separator": ",", "replacement": ","}"#,
        )
        .unwrap();
        let r = rewriter(config, &["a", "b", "c"]);
        assert_eq!(
            r.rewrite(r#"<i data-cls="c,a,b">"#),
            r#"<i data-cls="a,b,c">"#
        );
    }

    #[test]
    fn test_empty_document() {
        let r = rewriter(html(), &["flex"]);
        assert_eq!(r.rewrite(""), "");
    }

    #[test]
    fn test_document_without_classes_is_unchanged() {
        let r = rewriter(html(), &["flex"]);
        assert_eq!(r.rewrite("<div>content</div>"), "<div>content</div>");
        assert!(r.plan("<div>content</div>").is_empty());
    }

    #[test]
    fn test_already_sorted_plans_nothing() {
        let r = rewriter(html(), &["flex", "p-4"]);
        assert!(r.plan(r#"<div class="flex p-4">"#).is_empty());
    }

    #[test]
    fn test_nested_matches_rewrite_in_place() {
        let config = LangConfig::patterns([r"directive\s*:\s*\[([^\]]*)\]", r#""([^"]*)""#]);
        let input = r#"directive: ["p-4 flex items-center", "justify-between p-4"]"#;
        let r = rewriter(config, &["flex", "items-center", "justify-between", "p-4"]);
        assert_eq!(
            r.rewrite(input),
            r#"directive: ["flex items-center p-4", "justify-between p-4"]"#
        );
    }

    #[test]
    fn test_find_matches_is_rightmost_first() {
        let r = rewriter(html(), &[]);
        let found = r.find_matches(r#"<a class="x"><b class="y">"#);
        let starts: Vec<usize> = found.iter().map(|(_, m)| m.byte_start).collect();
        assert_eq!(starts, vec![23, 10]);
    }

    #[test]
    fn test_no_matchers_is_a_no_op() {
        let r = Rewriter::new(None, OrderSource::canonical(["a"]), SortOptions::default()).unwrap();
        assert_eq!(r.rewrite(r#"<i class="b a">"#), r#"<i class="b a">"#);
    }

    #[test]
    fn test_apply_spans_in_any_order() {
        let doc = "aa bb cc";
        let spans = vec![
            ReplacementSpan {
                byte_start: 0,
                byte_end: 2,
                original: "aa".to_string(),
                replacement: "A".to_string(),
            },
            ReplacementSpan {
                byte_start: 6,
                byte_end: 8,
                original: "cc".to_string(),
                replacement: "CCCC".to_string(),
            },
        ];
        assert_eq!(apply_spans(doc, spans), "A bb CCCC");
    }

    #[test]
    fn test_apply_spans_skips_overlap() {
        let doc = "abcdef";
        let spans = vec![
            ReplacementSpan {
                byte_start: 2,
                byte_end: 5,
                original: "cde".to_string(),
                replacement: "X".to_string(),
            },
            ReplacementSpan {
                byte_start: 1,
                byte_end: 3,
                original: "bc".to_string(),
                replacement: "Y".to_string(),
            },
        ];
        assert_eq!(apply_spans(doc, spans), "abXf");
    }

    #[test]
    fn test_duplicate_matchers_rewrite_once() {
        let config = LangConfig::List(vec![
            LangConfig::Structured(Default::default()),
            LangConfig::pattern(r#"class="([^"]+)""#),
            LangConfig::pattern(r#"class="([^"]+)""#),
        ]);
        let r = rewriter(config, &["a", "b"]);
        assert_eq!(r.rewrite(r#"<i class="b a">"#), r#"<i class="a b">"#);
    }
}
