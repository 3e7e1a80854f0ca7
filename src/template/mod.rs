//! Localized message templates.
//!
//! This module provides:
//! - Per-language template sets parsed from `lang_<code>.yml` files
//! - A concurrent store with atomic per-language replacement on reload
//! - First-run seeding of the default language from bundled resources
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::new("en");
//! let report = store.load_dir(Path::new("languages"), true)?;
//!
//! // Nested YAML keys are addressed with dots
//! let raw = store.lookup("en", "greeting.welcome");
//!
//! // Only loaded languages can become active
//! assert!(!store.set_active("de"));
//! ```

mod loader;
mod store;
mod types;

pub use loader::{
    bundled_language, bundled_languages, language_code_from_path, language_file_name,
    parse_template_document, seed_language, EXTENSIONS, FILE_PREFIX,
};
pub use store::{create_template_store, TemplateStore};
pub use types::{
    LanguageCode, LoadFailure, LoadReport, TemplateError, TemplateResult, TemplateSet,
};
