//! Template store types

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid template document: {0}")]
    InvalidDocument(String),
}

impl TemplateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Lowercase language identifier such as `en` or `it`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LanguageCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LanguageCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LanguageCode {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Message key -> raw template for one language. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: HashMap<String, String>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A language file that could not be loaded
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub file: String,
    pub reason: String,
}

/// Outcome of scanning a language directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Languages installed by this scan
    pub loaded: Vec<LanguageCode>,
    /// Files skipped because they failed to read or parse
    pub failed: Vec<LoadFailure>,
    /// Whether the default language file was materialized from the bundle
    pub seeded: bool,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
