//! Message recipients

use std::sync::{Mutex, PoisonError};

use crate::markup::FormattedMessage;

/// Anything that can receive a formatted message.
///
/// `deliver` is only ever called from the delivery context, one message at a
/// time, in the order the messages were submitted.
pub trait Recipient: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Raw locale such as `en_US`; `None` when unknown
    fn locale(&self) -> Option<String>;

    fn deliver(&self, message: FormattedMessage);
}

/// Writes messages to stdout
pub struct ConsoleRecipient {
    name: String,
    locale: Option<String>,
    ansi: bool,
}

impl ConsoleRecipient {
    pub fn new(name: impl Into<String>, locale: Option<String>) -> Self {
        Self {
            name: name.into(),
            locale,
            ansi: true,
        }
    }

    /// Print plain text instead of ANSI colors
    pub fn plain(mut self) -> Self {
        self.ansi = false;
        self
    }
}

impl Recipient for ConsoleRecipient {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }

    fn deliver(&self, message: FormattedMessage) {
        if self.ansi {
            println!("{}", message.to_ansi());
        } else {
            println!("{}", message.plain_text());
        }
    }
}

/// Keeps every delivered message in memory
pub struct BufferedRecipient {
    name: String,
    locale: Option<String>,
    received: Mutex<Vec<FormattedMessage>>,
}

impl BufferedRecipient {
    pub fn new(name: impl Into<String>, locale: Option<&str>) -> Self {
        Self {
            name: name.into(),
            locale: locale.map(str::to_string),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<FormattedMessage> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Plain text of every received message, in delivery order
    pub fn texts(&self) -> Vec<String> {
        self.messages().iter().map(FormattedMessage::plain_text).collect()
    }
}

impl Recipient for BufferedRecipient {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }

    fn deliver(&self, message: FormattedMessage) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}
