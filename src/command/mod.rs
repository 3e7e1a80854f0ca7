//! Operator commands.
//!
//! One command per line:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `lang <code>` | switch the active language (must be loaded) |
//! | `reload` | re-scan the language directory |
//! | `languages` | list loaded languages |
//! | `send <locale or -> <key> [name value]...` | format and deliver a message |
//! | `stats` | delivery statistics as JSON |
//! | `metrics` | Prometheus text exposition |
//! | `help` | list commands |
//! | `quit` | exit |

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::error::Result;
use crate::markup::{FormattedMessage, Style, TextSpan};
use crate::messenger::{Messenger, Placeholders, Recipient};
use crate::metrics::encode_metrics;
use crate::template::LanguageCode;

const HELP: &str = "commands: lang <code> | reload | languages | send <locale|-> <key> [name value]... | stats | metrics | help | quit";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    SetLanguage(String),
    Reload,
    Languages,
    Send {
        locale: Option<String>,
        key: String,
        args: Vec<String>,
    },
    Stats,
    Metrics,
    Help,
    Quit,
}

impl OperatorCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;

        let command = match name.to_ascii_lowercase().as_str() {
            "lang" | "language" => {
                let code = words.next().ok_or(CommandError::Usage("lang <code>"))?;
                Self::SetLanguage(code.to_string())
            }
            "reload" => Self::Reload,
            "languages" => Self::Languages,
            "send" => {
                const USAGE: &str = "send <locale|-> <key> [name value]...";
                let locale = words.next().ok_or(CommandError::Usage(USAGE))?;
                let key = words.next().ok_or(CommandError::Usage(USAGE))?;
                Self::Send {
                    locale: (locale != "-").then(|| locale.to_string()),
                    key: key.to_string(),
                    args: words.map(str::to_string).collect(),
                }
            }
            "stats" => Self::Stats,
            "metrics" => Self::Metrics,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    /// Reply rendered from the operator's language file
    Localized(FormattedMessage),
    Quit,
}

/// Render an operator reply in the active language
fn localized(
    messenger: &Messenger,
    key: &str,
    placeholders: &Placeholders,
) -> Result<FormattedMessage> {
    let rendered = messenger.formatter().render(None, key, placeholders)?;
    Ok(rendered.message)
}

#[derive(Serialize)]
struct LanguagesReply<'a> {
    loaded: &'a [LanguageCode],
    active: LanguageCode,
    default: &'a LanguageCode,
}

/// Run one command. `make_recipient` builds the recipient for `send`, given
/// the requested locale.
pub async fn execute<F>(
    messenger: &Messenger,
    command: OperatorCommand,
    make_recipient: F,
) -> Result<CommandOutcome>
where
    F: Fn(Option<String>) -> Arc<dyn Recipient>,
{
    let reply = match command {
        OperatorCommand::SetLanguage(code) => {
            let language = LanguageCode::new(&code);
            let message = if messenger.set_active_language(&code) {
                localized(
                    messenger,
                    "language.changed",
                    &Placeholders::new().with("language", &language),
                )?
            } else {
                localized(
                    messenger,
                    "language.unknown",
                    &Placeholders::new()
                        .with("language", &language)
                        .with("fallback", messenger.store().active_language()),
                )?
            };
            return Ok(CommandOutcome::Localized(message));
        }
        OperatorCommand::Reload => {
            let report = messenger.reload().await?;
            let message = localized(
                messenger,
                "language.reloaded",
                &Placeholders::new().with("count", report.loaded.len()),
            )?;

            let mut spans = message.spans().to_vec();
            spans.extend(report.failed.iter().map(|failure| TextSpan {
                text: format!("\n  failed {}: {}", failure.file, failure.reason),
                style: Style::default(),
            }));
            return Ok(CommandOutcome::Localized(FormattedMessage::new(spans)));
        }
        OperatorCommand::Languages => {
            let store = messenger.store();
            let loaded = store.languages();
            serde_json::to_string(&LanguagesReply {
                loaded: &loaded,
                active: store.active_language(),
                default: store.default_language(),
            })?
        }
        OperatorCommand::Send { locale, key, args } => {
            let recipient = make_recipient(locale);
            let receipt = messenger.send_flat(recipient, &key, args)?.wait().await?;
            if receipt.missing_key {
                format!("Key {} is missing in {}", receipt.key, receipt.language)
            } else {
                format!("Delivered {} in {}", receipt.key, receipt.language)
            }
        }
        OperatorCommand::Stats => match messenger.dispatcher_stats() {
            Some(stats) => serde_json::to_string(&stats)?,
            None => "Dispatcher is shut down".to_string(),
        },
        OperatorCommand::Metrics => encode_metrics()?,
        OperatorCommand::Help => HELP.to_string(),
        OperatorCommand::Quit => return Ok(CommandOutcome::Quit),
    };

    Ok(CommandOutcome::Reply(reply))
}
