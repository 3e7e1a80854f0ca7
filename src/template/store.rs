//! Language-keyed template storage

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use crate::metrics::LanguageMetrics;

use super::loader::{ensure_language_dir, read_language_file, scan_language_dir, seed_language};
use super::types::{LanguageCode, LoadFailure, LoadReport, TemplateResult, TemplateSet};

/// Concurrent store of language -> template set.
///
/// Each language's set is immutable and replaced wholesale, so readers holding
/// an `Arc<TemplateSet>` never observe a half-loaded language.
pub struct TemplateStore {
    languages: DashMap<LanguageCode, Arc<TemplateSet>>,
    default_language: LanguageCode,
    active_language: RwLock<LanguageCode>,
}

impl TemplateStore {
    /// Create an empty store; the active language starts as the default
    pub fn new(default_language: impl Into<LanguageCode>) -> Self {
        let default_language = default_language.into();
        Self {
            languages: DashMap::new(),
            active_language: RwLock::new(default_language.clone()),
            default_language,
        }
    }

    pub fn default_language(&self) -> &LanguageCode {
        &self.default_language
    }

    /// Operator-selected language; may name a language that is not loaded
    pub fn active_language(&self) -> LanguageCode {
        self.active_language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switch the active language. Only succeeds for a loaded language.
    pub fn set_active(&self, language: &str) -> bool {
        let code = LanguageCode::new(language);
        if !self.languages.contains_key(&code) {
            return false;
        }
        *self
            .active_language
            .write()
            .unwrap_or_else(PoisonError::into_inner) = code;
        true
    }

    /// Pin the active language without checking it is loaded (startup config)
    pub(crate) fn preset_active(&self, language: &str) {
        *self
            .active_language
            .write()
            .unwrap_or_else(PoisonError::into_inner) = LanguageCode::new(language);
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Loaded languages, sorted
    pub fn languages(&self) -> Vec<LanguageCode> {
        let mut codes: Vec<_> = self.languages.iter().map(|e| e.key().clone()).collect();
        codes.sort();
        codes
    }

    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    /// Install or atomically replace the template set for a language
    pub fn install(&self, language: impl Into<LanguageCode>, templates: TemplateSet) {
        let code = language.into();
        tracing::debug!(language = %code, keys = templates.len(), "Installing template set");
        self.languages.insert(code, Arc::new(templates));
        LanguageMetrics::set_loaded(self.languages.len());
    }

    /// Snapshot of one language's templates
    pub fn template_set(&self, language: &str) -> Option<Arc<TemplateSet>> {
        self.languages.get(language).map(|entry| entry.value().clone())
    }

    /// Look up a raw template. `None` means the language or key is absent;
    /// an empty template is `Some("")`.
    pub fn lookup(&self, language: &str, key: &str) -> Option<String> {
        let set = self.template_set(language)?;
        set.get(key).map(str::to_string)
    }

    /// Scan `dir` for `lang_<code>.yml` files and install each one.
    ///
    /// The directory is created if missing. When `seed_default` is set, the
    /// bundled default language file is written first if absent. A file that
    /// fails to parse is recorded in the report and skipped; only
    /// directory-level failures return an error.
    #[tracing::instrument(name = "template_store.load_dir", skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path, seed_default: bool) -> TemplateResult<LoadReport> {
        let mut report = LoadReport::default();

        ensure_language_dir(dir)?;

        if seed_default {
            match seed_language(dir, &self.default_language) {
                Ok(seeded) => report.seeded = seeded,
                Err(e) => tracing::warn!(
                    language = %self.default_language,
                    error = %e,
                    "Failed to seed default language file"
                ),
            }
        }

        for (code, path) in scan_language_dir(dir)? {
            match read_language_file(&path) {
                Ok(templates) => {
                    self.install(code.clone(), templates);
                    report.loaded.push(code);
                }
                Err(e) => {
                    tracing::warn!(
                        language = %code,
                        path = %path.display(),
                        error = %e,
                        "Skipping language file that failed to load"
                    );
                    LanguageMetrics::record_load_failure();
                    report.failed.push(LoadFailure {
                        file: path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            total_languages = self.languages.len(),
            "Loaded languages"
        );

        Ok(report)
    }
}

/// Create an Arc-wrapped template store
pub fn create_template_store(default_language: impl Into<LanguageCode>) -> Arc<TemplateStore> {
    Arc::new(TemplateStore::new(default_language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn set(entries: &[(&str, &str)]) -> TemplateSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_install_and_lookup() {
        let store = TemplateStore::new("en");
        store.install("en", set(&[("greeting.hello", "Hello"), ("empty", "")]));

        assert_eq!(store.lookup("en", "greeting.hello").as_deref(), Some("Hello"));
        assert_eq!(store.lookup("en", "empty").as_deref(), Some(""));
        assert_eq!(store.lookup("en", "missing"), None);
        assert_eq!(store.lookup("fr", "greeting.hello"), None);
    }

    #[test]
    fn test_install_replaces_wholesale() {
        let store = TemplateStore::new("en");
        store.install("en", set(&[("a", "1"), ("b", "2")]));
        store.install("en", set(&[("a", "3")]));

        assert_eq!(store.lookup("en", "a").as_deref(), Some("3"));
        assert_eq!(store.lookup("en", "b"), None);
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let store = TemplateStore::new("en");
        store.install("en", set(&[("a", "old")]));
        let snapshot = store.template_set("en").unwrap();

        store.install("en", set(&[("a", "new")]));
        assert_eq!(snapshot.get("a"), Some("old"));
        assert_eq!(store.lookup("en", "a").as_deref(), Some("new"));
    }

    #[test]
    fn test_set_active_requires_loaded_language() {
        let store = TemplateStore::new("en");
        store.install("en", TemplateSet::new());
        store.install("it", TemplateSet::new());

        assert_eq!(store.active_language(), "en");
        assert!(!store.set_active("de"));
        assert_eq!(store.active_language(), "en");

        assert!(store.set_active("IT"));
        assert_eq!(store.active_language(), "it");
    }

    #[test]
    fn test_load_dir_isolates_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lang_it.yml"), "greeting:\n  hello: Ciao\n").unwrap();
        fs::write(dir.path().join("lang_fr.yml"), "greeting: [broken").unwrap();
        fs::write(dir.path().join("notes.yml"), "a: b\n").unwrap();

        let store = TemplateStore::new("en");
        let report = store.load_dir(dir.path(), false).unwrap();

        assert_eq!(report.loaded, vec![LanguageCode::new("it")]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].file.ends_with("lang_fr.yml"));
        assert_eq!(store.lookup("it", "greeting.hello").as_deref(), Some("Ciao"));
        assert!(!store.has_language("fr"));
        assert!(!store.has_language("en"));
    }

    #[test]
    fn test_load_dir_seeds_default_language() {
        let dir = tempfile::tempdir().unwrap();
        let languages = dir.path().join("languages");

        let store = TemplateStore::new("en");
        let report = store.load_dir(&languages, true).unwrap();

        assert!(report.seeded);
        assert!(languages.join("lang_en.yml").is_file());
        assert!(store.has_language("en"));
        assert!(store.lookup("en", "greeting.welcome").is_some());

        let again = store.load_dir(&languages, true).unwrap();
        assert!(!again.seeded);
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new("xx");
        let report = store.load_dir(dir.path(), true).unwrap();

        assert!(report.loaded.is_empty());
        assert_eq!(store.language_count(), 0);
    }
}
