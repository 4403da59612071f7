//! Language configuration normalization.
//!
//! A language configuration describes where class attributes live in a file
//! type. It can be written in several shapes, all of which normalize into a
//! list of [`Matcher`]s:
//!
//! - a single pattern: `'class="([^"]+)"'`
//! - a list of patterns, applied as nested narrowing steps of one matcher
//! - a structured entry: `{ regex, separator, replacement }`
//! - a list of structured entries (or a mix of entries and patterns)
//!
//! Malformed shapes never fail; they degrade to matchers without patterns.
//! The only error is invalid regex syntax, reported at build time.

use regex::{Regex, RegexBuilder};
use serde::de::IgnoredAny;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid separator '{separator}': {message}")]
    InvalidSeparator { separator: String, message: String },
}

/// Raw language configuration as written by the user.
///
/// Variant order matters for deserialization: an all-string list is a
/// [`LangConfig::Patterns`], any other list is a [`LangConfig::List`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LangConfig {
    Pattern(String),
    Patterns(Vec<String>),
    List(Vec<LangConfig>),
    Structured(StructuredConfig),
    Unrecognized(IgnoredAny),
}

impl LangConfig {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        LangConfig::Pattern(pattern.into())
    }

    pub fn patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LangConfig::Patterns(patterns.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for LangConfig {
    fn from(pattern: &str) -> Self {
        LangConfig::Pattern(pattern.to_string())
    }
}

/// `{ regex, separator, replacement }` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredConfig {
    #[serde(default)]
    pub regex: Option<Loose<PatternField>>,
    #[serde(default)]
    pub separator: Option<Loose<String>>,
    #[serde(default)]
    pub replacement: Option<Loose<String>>,
}

/// The `regex` field of a structured entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternField {
    One(String),
    Many(Vec<String>),
}

/// A field that accepts anything, keeping the value only when it has the
/// expected shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Loose<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Loose<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Loose::Valid(value) => Some(value),
            Loose::Invalid(_) => None,
        }
    }
}

/// A compiled extraction rule.
///
/// `patterns[i + 1]` only searches inside the capture produced by
/// `patterns[i]`.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    pub patterns: Vec<Regex>,
    pub separator: Option<Regex>,
    pub replacement: Option<String>,
}

impl Matcher {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source text of each pattern, in narrowing order.
    pub fn pattern_sources(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }
}

/// Normalize a language configuration into matchers.
///
/// `None`, an empty list and unrecognized values yield no matchers.
pub fn build_matchers(config: Option<&LangConfig>) -> Result<Vec<Matcher>, MatcherError> {
    let Some(config) = config else {
        return Ok(Vec::new());
    };

    let matchers = match config {
        LangConfig::Patterns(patterns) if patterns.is_empty() => Vec::new(),
        LangConfig::List(items) if items.is_empty() => Vec::new(),
        LangConfig::List(items) if items.iter().all(|i| matches!(i, LangConfig::Pattern(_))) => {
            let patterns = items
                .iter()
                .filter_map(|item| match item {
                    LangConfig::Pattern(p) => Some(p.as_str()),
                    _ => None,
                })
                .map(compile_pattern)
                .collect::<Result<Vec<_>, _>>()?;
            vec![Matcher {
                patterns,
                ..Matcher::default()
            }]
        }
        LangConfig::List(items) => items
            .iter()
            .map(build_matcher)
            .collect::<Result<Vec<_>, _>>()?,
        LangConfig::Unrecognized(_) => Vec::new(),
        other => vec![build_matcher(other)?],
    };

    log::debug!("built {} matcher(s)", matchers.len());
    Ok(matchers)
}

fn build_matcher(config: &LangConfig) -> Result<Matcher, MatcherError> {
    match config {
        LangConfig::Pattern(pattern) => Ok(Matcher {
            patterns: vec![compile_pattern(pattern)?],
            ..Matcher::default()
        }),
        LangConfig::Patterns(patterns) => Ok(Matcher {
            patterns: patterns
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<_, _>>()?,
            ..Matcher::default()
        }),
        LangConfig::Structured(structured) => build_structured(structured),
        // Nested lists and foreign values have no `regex` field to read.
        LangConfig::List(_) | LangConfig::Unrecognized(_) => Ok(Matcher::default()),
    }
}

fn build_structured(config: &StructuredConfig) -> Result<Matcher, MatcherError> {
    let patterns = match config.regex.as_ref().and_then(Loose::valid) {
        Some(PatternField::One(pattern)) => vec![compile_pattern(pattern)?],
        Some(PatternField::Many(patterns)) => patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    let raw_separator = config.separator.as_ref().and_then(Loose::valid);
    let separator = raw_separator
        .map(|sep| {
            Regex::new(sep).map_err(|e| MatcherError::InvalidSeparator {
                separator: sep.clone(),
                message: e.to_string(),
            })
        })
        .transpose()?;

    // An empty replacement falls back to the raw separator text.
    let replacement = config
        .replacement
        .as_ref()
        .and_then(Loose::valid)
        .filter(|r| !r.is_empty())
        .or(raw_separator)
        .cloned();

    Ok(Matcher {
        patterns,
        separator,
        replacement,
    })
}

fn compile_pattern(pattern: &str) -> Result<Regex, MatcherError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| MatcherError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}
