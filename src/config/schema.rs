use crate::languages::LanguageTable;
use crate::matcher::{build_matchers, LangConfig};
use crate::order::{CommandOrderProvider, OrderSource};
use crate::rewrite::{IGNORE_ALL_MARKER, IGNORE_MARKER};
use crate::sorter::SortOptions;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Sorter settings read from a config file.
///
/// Keys are snake_case; the camelCase spellings used by editor integrations
/// are accepted as aliases.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SorterConfig {
    /// Applies to every file type without an entry in `languages`
    #[serde(alias = "langConfig")]
    pub lang_config: Option<LangConfig>,
    /// Extension -> language configuration
    pub languages: BTreeMap<String, LangConfig>,
    /// Canonical order; the bundled Tailwind order when absent
    #[serde(alias = "sortOrder", alias = "defaultSortOrder")]
    pub sort_order: Option<Vec<String>>,
    #[serde(alias = "removeDuplicates")]
    pub remove_duplicates: bool,
    #[serde(alias = "prependCustomClasses")]
    pub prepend_custom_classes: bool,
    #[serde(alias = "customTailwindPrefix")]
    pub custom_prefix: String,
    #[serde(alias = "ignoreAllMarker")]
    pub ignore_all_marker: String,
    #[serde(alias = "ignoreMarker")]
    pub ignore_marker: String,
    /// External sorter argv; takes precedence over `sort_order`
    #[serde(alias = "sorterCommand")]
    pub sorter_command: Option<Vec<String>>,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            lang_config: None,
            languages: BTreeMap::new(),
            sort_order: None,
            remove_duplicates: true,
            prepend_custom_classes: false,
            custom_prefix: String::new(),
            ignore_all_marker: IGNORE_ALL_MARKER.to_string(),
            ignore_marker: IGNORE_MARKER.to_string(),
            sorter_command: None,
        }
    }
}

impl SorterConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.ignore_all_marker.is_empty() {
            issues.push(ValidationIssue::EmptyField {
                field: "ignore_all_marker",
            });
        }
        if self.ignore_marker.is_empty() {
            issues.push(ValidationIssue::EmptyField {
                field: "ignore_marker",
            });
        }

        if let Some(command) = &self.sorter_command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                issues.push(ValidationIssue::EmptyField {
                    field: "sorter_command",
                });
            }
        }

        if let Some(order) = &self.sort_order {
            let mut seen = HashSet::new();
            for class in order {
                if !seen.insert(class.as_str()) {
                    issues.push(ValidationIssue::DuplicateSortEntry {
                        class: class.clone(),
                    });
                }
            }
        }

        if let Err(e) = build_matchers(self.lang_config.as_ref()) {
            issues.push(ValidationIssue::InvalidLanguage {
                language: None,
                message: e.to_string(),
            });
        }
        for (extension, config) in &self.languages {
            if let Err(e) = build_matchers(Some(config)) {
                issues.push(ValidationIssue::InvalidLanguage {
                    language: Some(extension.clone()),
                    message: e.to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            remove_duplicates: self.remove_duplicates,
            prepend_custom_classes: self.prepend_custom_classes,
            custom_prefix: self.custom_prefix.clone(),
            separator: None,
            replacement: None,
        }
    }

    pub fn order_source(&self) -> OrderSource {
        if let Some(provider) = self
            .sorter_command
            .as_deref()
            .and_then(CommandOrderProvider::from_argv)
        {
            return OrderSource::provider(provider);
        }
        match &self.sort_order {
            Some(order) => OrderSource::canonical(order.iter().cloned()),
            None => OrderSource::default_tailwind(),
        }
    }

    pub fn language_table(&self) -> LanguageTable {
        let mut table = LanguageTable::with_builtin();
        table.set_fallback(self.lang_config.clone());
        for (extension, config) in &self.languages {
            table.insert(extension, config.clone());
        }
        table
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyField {
        field: &'static str,
    },
    DuplicateSortEntry {
        class: String,
    },
    InvalidLanguage {
        language: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyField { field } => write!(f, "field '{field}' must not be empty"),
            ValidationIssue::DuplicateSortEntry { class } => {
                write!(f, "sort order lists '{class}' more than once")
            }
            ValidationIssue::InvalidLanguage { language, message } => match language {
                Some(ext) => write!(f, "language '{ext}' has invalid configuration: {message}"),
                None => write!(f, "lang_config is invalid: {message}"),
            },
        }
    }
}
