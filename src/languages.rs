//! Language configurations by file extension.

use crate::matcher::LangConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// `class="..."` attributes in markup and most templates.
pub const HTML_CLASS: &str = r#"class="([^"]+)""#;
/// `className="..."` props in JSX.
pub const JSX_CLASS_NAME: &str = r#"className="([^"]+)""#;
/// `.class.names` shorthand in HAML.
pub const HAML_SHORTHAND: &str = r"\.([\._a-zA-Z0-9\-]+)";
/// `@apply` directives in stylesheets.
pub const CSS_APPLY: &str = r"@apply ([_a-zA-Z0-9 \-:/]+);";

const BUILTIN: &[(&str, &str)] = &[
    ("html", HTML_CLASS),
    ("htm", HTML_CLASS),
    ("vue", HTML_CLASS),
    ("svelte", HTML_CLASS),
    ("astro", HTML_CLASS),
    ("erb", HTML_CLASS),
    ("php", HTML_CLASS),
    ("twig", HTML_CLASS),
    ("hbs", HTML_CLASS),
    ("jsx", JSX_CLASS_NAME),
    ("tsx", JSX_CLASS_NAME),
    ("haml", HAML_SHORTHAND),
    ("css", CSS_APPLY),
    ("scss", CSS_APPLY),
    ("pcss", CSS_APPLY),
];

/// Resolves the language configuration for a file.
///
/// Lookup order: an explicit entry for the extension, then the catch-all
/// configuration, then the built-in entry for the extension.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    by_extension: BTreeMap<String, LangConfig>,
    fallback: Option<LangConfig>,
    builtin: BTreeMap<String, LangConfig>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl LanguageTable {
    pub fn with_builtin() -> Self {
        let builtin = BUILTIN
            .iter()
            .map(|(ext, pattern)| (ext.to_string(), LangConfig::pattern(*pattern)))
            .collect();
        Self {
            by_extension: BTreeMap::new(),
            fallback: None,
            builtin,
        }
    }

    /// Override the configuration for one extension (leading `.` optional).
    pub fn insert(&mut self, extension: &str, config: LangConfig) {
        self.by_extension.insert(normalize(extension), config);
    }

    /// Configuration used for every extension without an explicit entry.
    pub fn set_fallback(&mut self, config: Option<LangConfig>) {
        self.fallback = config;
    }

    pub fn lookup_extension(&self, extension: &str) -> Option<&LangConfig> {
        let extension = normalize(extension);
        self.by_extension
            .get(&extension)
            .or(self.fallback.as_ref())
            .or_else(|| self.builtin.get(&extension))
    }

    pub fn lookup(&self, path: &Path) -> Option<&LangConfig> {
        let extension = path.extension()?.to_str()?;
        self.lookup_extension(extension)
    }

    /// Whether files with this path are picked up when walking directories.
    pub fn is_known(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let extension = normalize(extension);
        self.by_extension.contains_key(&extension) || self.builtin.contains_key(&extension)
    }

    /// Every extension with an explicit or built-in entry.
    pub fn extensions(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self
            .by_extension
            .keys()
            .chain(self.builtin.keys())
            .map(String::as_str)
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
