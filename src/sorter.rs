//! Class string sorting.
//!
//! Tokens found in the canonical order are sorted by their position in it.
//! Everything else is a custom class: kept verbatim, in its original relative
//! order, either before or after the sorted block.

use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Options controlling how a class string is split, filtered and joined.
#[derive(Debug, Clone)]
pub struct SortOptions {
    /// Collapse repeated classes to their first occurrence
    pub remove_duplicates: bool,
    /// Place custom classes before the sorted ones instead of after
    pub prepend_custom_classes: bool,
    /// Prefix applied to every canonical order entry (e.g. `tw-`)
    pub custom_prefix: String,
    /// Splits the class string; inferred when unset
    pub separator: Option<Regex>,
    /// Joins the sorted classes; inferred when unset
    pub replacement: Option<String>,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            prepend_custom_classes: false,
            custom_prefix: String::new(),
            separator: None,
            replacement: None,
        }
    }
}

impl SortOptions {
    /// Copy of these options with a matcher's separator/replacement applied.
    pub fn with_overrides(&self, separator: Option<&Regex>, replacement: Option<&str>) -> Self {
        Self {
            separator: separator.cloned().or_else(|| self.separator.clone()),
            replacement: replacement
                .map(str::to_string)
                .or_else(|| self.replacement.clone()),
            ..self.clone()
        }
    }
}

/// A class string split into tokens, remembering how to put it back together.
#[derive(Debug, Clone)]
pub(crate) struct ClassList<'a> {
    tokens: Vec<&'a str>,
    joiner: String,
    leading_dot: bool,
}

impl<'a> ClassList<'a> {
    /// Split `raw`, drop empty tokens and, if requested, duplicates.
    pub(crate) fn parse(raw: &'a str, options: &SortOptions) -> Self {
        let dot_notation = !raw.chars().any(char::is_whitespace);
        let default_joiner = if dot_notation { "." } else { " " };

        let pieces: Vec<&'a str> = match (&options.separator, dot_notation) {
            (Some(separator), _) => separator.split(raw).collect(),
            (None, true) => raw.split('.').collect(),
            (None, false) => raw.split_whitespace().collect(),
        };

        let mut tokens: Vec<&'a str> = pieces.into_iter().filter(|t| !t.is_empty()).collect();
        if options.remove_duplicates {
            let mut seen = HashSet::new();
            tokens.retain(|token| seen.insert(*token));
        }

        Self {
            tokens,
            joiner: options
                .replacement
                .clone()
                .unwrap_or_else(|| default_joiner.to_string()),
            leading_dot: dot_notation && raw.starts_with('.'),
        }
    }

    pub(crate) fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// Join `tokens` the way the original string was written.
    pub(crate) fn render<I, S>(&self, tokens: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for (idx, token) in tokens.into_iter().enumerate() {
            if idx > 0 {
                joined.push_str(&self.joiner);
            }
            joined.push_str(token.as_ref());
        }

        let trimmed = joined.trim();
        if self.leading_dot {
            format!(".{trimmed}")
        } else {
            trimmed.to_string()
        }
    }
}

/// Sort a class string against a canonical order.
///
/// # Example
///
/// ```
/// use tailwind_class_sorter::{sort_class_string, SortOptions};
///
/// let order: Vec<String> = ["container", "flex", "text-white"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let sorted = sort_class_string(
///     "flex container flex text-white container",
///     &order,
///     &SortOptions::default(),
/// );
/// assert_eq!(sorted, "container flex text-white");
/// ```
pub fn sort_class_string(raw: &str, sort_order: &[String], options: &SortOptions) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let list = ClassList::parse(raw, options);

    // First occurrence wins, matching a linear index lookup.
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(sort_order.len());
    for (idx, class) in sort_order.iter().enumerate() {
        positions
            .entry(format!("{}{}", options.custom_prefix, class))
            .or_insert(idx);
    }

    let (mut known, custom): (Vec<&str>, Vec<&str>) = list
        .tokens()
        .iter()
        .copied()
        .partition(|token| positions.contains_key(*token));
    known.sort_by_key(|token| positions[*token]);

    if options.prepend_custom_classes {
        list.render(custom.into_iter().chain(known))
    } else {
        list.render(known.into_iter().chain(custom))
    }
}
