//! Localized message formatting and delivery.
//!
//! A message goes through these steps:
//! 1. the recipient's locale is resolved to a loaded language
//! 2. the raw template is looked up (unknown keys become a diagnostic)
//! 3. placeholders are substituted
//! 4. legacy color codes are translated to tag markup and parsed
//! 5. the result is queued on the single delivery task
//!
//! Steps 1-4 run on Tokio workers. Delivery order per recipient follows the
//! order of the `send` calls.
//!
//! # Example
//!
//! ```ignore
//! let messenger = Messenger::start(settings.i18n).await;
//!
//! let task = messenger.send(
//!     recipient.clone(),
//!     "greeting.welcome",
//!     Placeholders::new().with("{player}", "Steve"),
//! )?;
//! let receipt = task.wait().await?;
//!
//! messenger.shutdown().await;
//! ```

mod dispatcher;
mod formatter;
mod placeholders;
mod recipient;
mod types;

use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use futures::future::join_all;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use crate::config::I18nConfig;
use crate::markup::RichTextParser;
use crate::template::{LoadReport, TemplateStore};

pub use dispatcher::{DeliveryDispatcher, DeliverySlot, DispatcherStats, DispatcherStatsSnapshot};
pub use formatter::{Formatter, PreparedMessage, RenderedMessage, MISSING_KEY_PREFIX};
pub use placeholders::{strip_delimiters, Placeholders};
pub use recipient::{BufferedRecipient, ConsoleRecipient, Recipient};
pub use types::{DeliveryReceipt, MessageError, MessageResult};

/// Completion handle for one submitted message
pub struct FormatTask {
    handle: JoinHandle<MessageResult<DeliveryReceipt>>,
}

impl FormatTask {
    /// Wait until the message has been delivered or has failed
    pub async fn wait(self) -> MessageResult<DeliveryReceipt> {
        self.handle
            .await
            .map_err(|e| MessageError::TaskFailed(e.to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for several tasks, keeping their order in the result
    pub async fn join_all<I>(tasks: I) -> Vec<MessageResult<DeliveryReceipt>>
    where
        I: IntoIterator<Item = FormatTask>,
    {
        join_all(tasks.into_iter().map(FormatTask::wait)).await
    }
}

/// Entry point tying the template store, formatter and delivery task together.
///
/// Must be created inside a Tokio runtime.
pub struct Messenger {
    config: I18nConfig,
    store: Arc<TemplateStore>,
    formatter: Arc<Formatter>,
    dispatcher: Mutex<Option<DeliveryDispatcher>>,
}

impl Messenger {
    /// Create a messenger with an empty store. Call [`reload`](Self::reload)
    /// to load languages.
    pub fn new(config: I18nConfig) -> Self {
        let store = Arc::new(TemplateStore::new(config.default_language.as_str()));
        let formatter = Arc::new(Formatter::new(store.clone()));
        Self::assemble(config, store, formatter)
    }

    /// Create a messenger that parses markup with a custom parser
    pub fn with_parser(config: I18nConfig, parser: Arc<dyn RichTextParser>) -> Self {
        let store = Arc::new(TemplateStore::new(config.default_language.as_str()));
        let formatter = Arc::new(Formatter::with_parser(store.clone(), parser));
        Self::assemble(config, store, formatter)
    }

    fn assemble(config: I18nConfig, store: Arc<TemplateStore>, formatter: Arc<Formatter>) -> Self {
        if let Some(active) = &config.active_language {
            store.preset_active(active);
        }

        Self {
            config,
            store,
            formatter,
            dispatcher: Mutex::new(Some(DeliveryDispatcher::spawn())),
        }
    }

    /// Create a messenger and load the language directory.
    ///
    /// A load failure is logged and leaves the store empty; formatting then
    /// fails per call with [`MessageError::NoLanguageAvailable`].
    pub async fn start(config: I18nConfig) -> Self {
        let messenger = Self::new(config);
        if messenger.reload().await.is_err() {
            tracing::warn!("Starting without loaded languages");
        }
        messenger
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    pub fn formatter(&self) -> &Arc<Formatter> {
        &self.formatter
    }

    /// Re-scan the language directory on a blocking thread
    pub async fn reload(&self) -> MessageResult<LoadReport> {
        let store = self.store.clone();
        let dir = self.config.language_dir.clone();
        let seed = self.config.seed_default;

        let result = tokio::task::spawn_blocking(move || store.load_dir(&dir, seed))
            .await
            .map_err(|e| load_task_failed(&self.config.language_dir, e))?;

        match result {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(
                    dir = %self.config.language_dir.display(),
                    error = %e,
                    "Failed to load languages"
                );
                Err(e.into())
            }
        }
    }

    /// Switch the operator-selected language; fails if it is not loaded
    pub fn set_active_language(&self, language: &str) -> bool {
        if self.store.set_active(language) {
            tracing::info!(language = %language, "Active language changed");
            return true;
        }

        tracing::warn!(
            attempted = %language,
            fallback = %self.store.active_language(),
            "Language is not loaded, keeping current active language"
        );
        false
    }

    /// Format `key` for `recipient` on a worker and deliver it.
    ///
    /// The delivery position is reserved before this returns, so calls made
    /// in order for one recipient are delivered in that order.
    pub fn send(
        &self,
        recipient: Arc<dyn Recipient>,
        key: &str,
        placeholders: Placeholders,
    ) -> MessageResult<FormatTask> {
        let slot = {
            let guard = self.dispatcher.lock().unwrap_or_else(PoisonError::into_inner);
            let dispatcher = guard.as_ref().ok_or(MessageError::DispatcherClosed)?;
            dispatcher.reserve(recipient.clone())?
        };

        let formatter = self.formatter.clone();
        let key = key.to_string();

        let handle = tokio::spawn(async move {
            let locale = recipient.locale();
            let rendered = match formatter.render(locale.as_deref(), &key, &placeholders) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::warn!(
                        recipient = %recipient.name(),
                        key = %key,
                        error = %e,
                        "Failed to format message"
                    );
                    return Err(e);
                }
            };

            slot.fill(rendered.message).await?;

            Ok(DeliveryReceipt {
                id: Uuid::new_v4(),
                key,
                language: rendered.language,
                missing_key: rendered.missing_key,
                delivered_at: Utc::now(),
            })
        });

        Ok(FormatTask { handle })
    }

    /// Like [`send`](Self::send) with placeholders given as an alternating
    /// `key, value, ...` list. An odd-length list is rejected before anything
    /// is queued.
    pub fn send_flat<I, T>(
        &self,
        recipient: Arc<dyn Recipient>,
        key: &str,
        args: I,
    ) -> MessageResult<FormatTask>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let placeholders = Placeholders::from_flat(args)?;
        self.send(recipient, key, placeholders)
    }

    /// Send the same key to several recipients, each in their own language
    pub fn broadcast<I>(
        &self,
        recipients: I,
        key: &str,
        placeholders: &Placeholders,
    ) -> MessageResult<Vec<FormatTask>>
    where
        I: IntoIterator<Item = Arc<dyn Recipient>>,
    {
        recipients
            .into_iter()
            .map(|recipient| self.send(recipient, key, placeholders.clone()))
            .collect()
    }

    pub fn dispatcher_stats(&self) -> Option<DispatcherStatsSnapshot> {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(DeliveryDispatcher::stats)
    }

    /// Drain pending deliveries and stop the delivery task.
    ///
    /// Only the first call does anything; later calls return `None`.
    pub async fn shutdown(&self) -> Option<DispatcherStatsSnapshot> {
        let dispatcher = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(dispatcher) = dispatcher else {
            tracing::debug!("Messenger already shut down");
            return None;
        };

        let stats = dispatcher.shutdown().await;
        tracing::info!(
            delivered = stats.total_delivered,
            skipped = stats.total_skipped,
            "Messenger shut down"
        );
        Some(stats)
    }
}

/// The blocking load task panicked or was cancelled
fn load_task_failed(dir: &Path, err: JoinError) -> MessageError {
    tracing::error!(
        dir = %dir.display(),
        error = %err,
        "Language load task failed"
    );
    MessageError::TaskFailed(err.to_string())
}
