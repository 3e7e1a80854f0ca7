//! Recipient locale resolution.
//!
//! Resolution order, first loaded language wins:
//! 1. the recipient's own locale, reduced to its leading language subtag
//! 2. the store's active language
//! 3. the store's default language
//!
//! If none of them is loaded there is nothing to render with and the caller
//! gets `None`.

use crate::template::{LanguageCode, TemplateStore};

/// Reduce an IETF-like locale (`en_US`, `pt-BR`, `it.UTF-8`) to its language.
///
/// Takes everything before the first non-alphabetic character and lowercases
/// it. Returns `None` when nothing alphabetic leads the string.
pub fn normalize_locale(raw: &str) -> Option<LanguageCode> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !c.is_alphabetic())
        .unwrap_or(raw.len());
    let language = &raw[..end];
    if language.is_empty() {
        None
    } else {
        Some(LanguageCode::new(language))
    }
}

/// Pick the language to render a message in.
pub fn resolve_language(recipient_locale: Option<&str>, store: &TemplateStore) -> Option<LanguageCode> {
    if let Some(code) = recipient_locale.and_then(normalize_locale) {
        if store.has_language(code.as_str()) {
            return Some(code);
        }
        tracing::trace!(language = %code, "Recipient language not loaded, falling back");
    }

    let active = store.active_language();
    if store.has_language(active.as_str()) {
        return Some(active);
    }

    let default = store.default_language();
    if store.has_language(default.as_str()) {
        return Some(default.clone());
    }

    None
}
