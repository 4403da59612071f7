//! Tailwind Class Sorter: sorts class attributes in markup, templates and
//! components.
//!
//! # Architecture
//!
//! Language configurations normalize into [`Matcher`]s, each an ordered list
//! of regexes. The first regex finds candidate spans in a document, later ones
//! narrow the search inside the previous capture, and every innermost capture
//! is reported with its byte offset in the original text. Each class string is
//! then sorted against an [`OrderSource`] and spliced back in, rightmost first,
//! so pending offsets stay valid.
//!
//! # Guarantees
//!
//! - Rewriting is idempotent
//! - A document that needs no changes comes back byte-identical
//! - Malformed configuration degrades to a no-op; only invalid regex syntax
//!   is an error, raised when matchers are built
//! - A failing external order provider leaves classes unsorted instead of
//!   failing the document
//!
//! # Example
//!
//! ```
//! use tailwind_class_sorter::{rewrite, LangConfig, SortOptions};
//!
//! let order: Vec<String> = ["flex", "m-2", "p-4"].iter().map(|s| s.to_string()).collect();
//! let out = rewrite(
//!     r#"<div class="p-4 flex m-2">content</div>"#,
//!     &LangConfig::pattern(r#"class="([^"]+)""#),
//!     &order,
//!     &SortOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(out, r#"<div class="flex m-2 p-4">content</div>"#);
//! ```

pub mod config;
pub mod file;
pub mod languages;
pub mod matcher;
pub mod nested;
pub mod order;
pub mod rewrite;
pub mod sorter;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, ConfigFormat, SorterConfig};
pub use file::{process_file, FileError, FileOutcome, WriteMode};
pub use languages::LanguageTable;
pub use matcher::{build_matchers, LangConfig, Matcher, MatcherError};
pub use nested::{find_nested, for_each_nested_match, TextMatch};
pub use order::{CommandOrderProvider, OrderError, OrderProvider, OrderSource};
pub use rewrite::{
    apply_spans, rewrite, ReplacementSpan, Rewriter, IGNORE_ALL_MARKER, IGNORE_MARKER,
};
pub use sorter::{sort_class_string, SortOptions};
