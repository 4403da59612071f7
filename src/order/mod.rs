//! Where the canonical class order comes from.
//!
//! Either a literal ordered list, sorted locally, or a delegated
//! [`OrderProvider`] that reorders a space-joined class string. A failing
//! provider never fails the rewrite: the filtered class list is returned
//! unsorted instead.

pub mod command;

pub use command::CommandOrderProvider;

use crate::sorter::{sort_class_string, ClassList, SortOptions};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_ORDER: &str = include_str!("default_order.txt");

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("failed to run sorter command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost contact with sorter command '{program}': {source}")]
    Pipe {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sorter command '{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("sorter output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("sorter changed the classes: sent [{expected}], got [{actual}]")]
    Mismatch { expected: String, actual: String },
}

/// An external capability that knows the authoritative class order.
pub trait OrderProvider: Send + Sync {
    /// Reorder a space-joined class string, returning a space-joined string.
    fn sort_classes(&self, classes: &str, keep_duplicates: bool) -> Result<String, OrderError>;
}

/// The source of ordering used by the rewriter.
#[derive(Clone)]
pub enum OrderSource {
    Canonical(Arc<[String]>),
    Provider(Arc<dyn OrderProvider>),
}

impl fmt::Debug for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSource::Canonical(order) => {
                f.debug_tuple("Canonical").field(&order.len()).finish()
            }
            OrderSource::Provider(_) => f.write_str("Provider"),
        }
    }
}

impl Default for OrderSource {
    fn default() -> Self {
        Self::default_tailwind()
    }
}

impl OrderSource {
    pub fn canonical<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OrderSource::Canonical(classes.into_iter().map(Into::into).collect())
    }

    pub fn provider(provider: impl OrderProvider + 'static) -> Self {
        OrderSource::Provider(Arc::new(provider))
    }

    /// The bundled Tailwind utility order.
    pub fn default_tailwind() -> Self {
        Self::canonical(default_order())
    }

    /// Sort one class string.
    pub fn sort(&self, raw: &str, options: &SortOptions) -> String {
        match self {
            OrderSource::Canonical(order) => sort_class_string(raw, order, options),
            OrderSource::Provider(provider) => sort_with_provider(provider.as_ref(), raw, options),
        }
    }
}

/// Entries of the bundled order, one class per line, `#` comments skipped.
pub fn default_order() -> impl Iterator<Item = &'static str> {
    DEFAULT_ORDER
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn sort_with_provider(provider: &dyn OrderProvider, raw: &str, options: &SortOptions) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let list = ClassList::parse(raw, options);
    let joined = list.tokens().join(" ");

    let result = provider
        .sort_classes(&joined, !options.remove_duplicates)
        .and_then(|sorted| verify_same_classes(list.tokens(), &sorted).map(|()| sorted));

    match result {
        Ok(sorted) => list.render(sorted.split_whitespace()),
        Err(err) => {
            log::warn!("class order provider failed, leaving classes unsorted: {err}");
            list.render(list.tokens())
        }
    }
}

/// The provider may only reorder, never add or drop classes.
fn verify_same_classes(expected: &[&str], sorted: &str) -> Result<(), OrderError> {
    let mut before: Vec<&str> = expected.to_vec();
    let mut after: Vec<&str> = sorted.split_whitespace().collect();
    before.sort_unstable();
    after.sort_unstable();

    if before == after {
        Ok(())
    } else {
        Err(OrderError::Mismatch {
            expected: expected.join(" "),
            actual: sorted.trim().to_string(),
        })
    }
}
