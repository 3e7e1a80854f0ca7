//! Template lookup, substitution, legacy translation and parsing

use std::sync::Arc;
use std::time::Instant;

use crate::locale::resolve_language;
use crate::markup::{translate_legacy, FormattedMessage, RichTextParser, TagMarkupParser};
use crate::metrics::MessageMetrics;
use crate::template::{LanguageCode, TemplateStore};

use super::placeholders::Placeholders;
use super::types::{MessageError, MessageResult};

/// Prefix of the diagnostic sent in place of an unknown key
pub const MISSING_KEY_PREFIX: &str = "Missing key: ";

/// A message after substitution and legacy translation, before parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedMessage {
    Markup {
        language: LanguageCode,
        markup: String,
    },
    MissingKey {
        language: LanguageCode,
        key: String,
    },
}

#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub language: LanguageCode,
    pub message: FormattedMessage,
    pub missing_key: bool,
}

/// Turns (locale, key, placeholders) into a [`FormattedMessage`]
pub struct Formatter {
    store: Arc<TemplateStore>,
    parser: Arc<dyn RichTextParser>,
}

impl Formatter {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self::with_parser(store, Arc::new(TagMarkupParser::new()))
    }

    pub fn with_parser(store: Arc<TemplateStore>, parser: Arc<dyn RichTextParser>) -> Self {
        Self { store, parser }
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    /// Resolve the language, look up the template, substitute placeholders and
    /// translate legacy codes.
    pub fn prepare(
        &self,
        locale: Option<&str>,
        key: &str,
        placeholders: &Placeholders,
    ) -> MessageResult<PreparedMessage> {
        let language = resolve_language(locale, &self.store).ok_or_else(|| {
            MessageError::NoLanguageAvailable {
                key: key.to_string(),
            }
        })?;

        let Some(raw) = self.store.lookup(language.as_str(), key) else {
            return Ok(PreparedMessage::MissingKey {
                language,
                key: key.to_string(),
            });
        };

        let substituted = placeholders.apply(&raw);
        let markup = translate_legacy(&substituted).into_owned();

        Ok(PreparedMessage::Markup { language, markup })
    }

    /// Produce the final message. Unknown keys render as the plain
    /// `Missing key: <key>` diagnostic without going through markup.
    #[tracing::instrument(
        name = "formatter.render",
        skip(self, placeholders),
        fields(placeholders = placeholders.len())
    )]
    pub fn render(
        &self,
        locale: Option<&str>,
        key: &str,
        placeholders: &Placeholders,
    ) -> MessageResult<RenderedMessage> {
        let start = Instant::now();

        let prepared = self.prepare(locale, key, placeholders).inspect_err(|e| {
            MessageMetrics::record_failure(e.reason());
        })?;

        match prepared {
            PreparedMessage::MissingKey { language, key } => {
                tracing::debug!(language = %language, key = %key, "Missing message key");
                MessageMetrics::record_missing_key();
                Ok(RenderedMessage {
                    language,
                    message: FormattedMessage::plain(format!("{}{}", MISSING_KEY_PREFIX, key)),
                    missing_key: true,
                })
            }
            PreparedMessage::Markup { language, markup } => {
                let message = self.parser.parse(&markup).map_err(|source| {
                    let err = MessageError::Markup {
                        key: key.to_string(),
                        source,
                    };
                    MessageMetrics::record_failure(err.reason());
                    err
                })?;
                MessageMetrics::record_formatted(language.as_str(), start.elapsed());
                Ok(RenderedMessage {
                    language,
                    message,
                    missing_key: false,
                })
            }
        }
    }
}
