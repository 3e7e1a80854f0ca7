//! Messenger error and result types

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::markup::MarkupError;
use crate::template::{LanguageCode, TemplateError};

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Placeholders must be key/value pairs, got {count} values")]
    OddPlaceholderCount { count: usize },

    #[error("No language available to render '{key}'")]
    NoLanguageAvailable { key: String },

    #[error("Failed to parse markup for '{key}': {source}")]
    Markup {
        key: String,
        #[source]
        source: MarkupError,
    },

    #[error("Delivery dispatcher is closed")]
    DispatcherClosed,

    #[error("Formatting task failed: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl MessageError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::OddPlaceholderCount { .. } => "odd_placeholders",
            Self::NoLanguageAvailable { .. } => "no_language",
            Self::Markup { .. } => "markup",
            Self::DispatcherClosed => "dispatcher_closed",
            Self::TaskFailed(_) => "task_failed",
            Self::Template(_) => "template",
        }
    }
}

/// Result type for messenger operations
pub type MessageResult<T> = Result<T, MessageError>;

/// Confirmation that a message reached its recipient
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub id: Uuid,
    pub key: String,
    pub language: LanguageCode,
    /// The recipient got the missing-key diagnostic instead of a template
    pub missing_key: bool,
    pub delivered_at: DateTime<Utc>,
}
