use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use locale_messenger::command::{execute, CommandOutcome, OperatorCommand};
use locale_messenger::config::Settings;
use locale_messenger::messenger::{ConsoleRecipient, Messenger, Recipient};
use locale_messenger::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.logging)?;
    tracing::info!("Configuration loaded");

    let messenger = Messenger::start(settings.i18n.clone()).await;
    tracing::info!(
        languages = ?messenger.store().languages(),
        active = %messenger.store().active_language(),
        "Messenger ready"
    );

    let make_recipient =
        |locale: Option<String>| Arc::new(ConsoleRecipient::new("console", locale)) as Arc<dyn Recipient>;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        };

        // stdin closed
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let command = match OperatorCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match execute(&messenger, command, make_recipient).await {
            Ok(CommandOutcome::Reply(reply)) => println!("{}", reply),
            Ok(CommandOutcome::Localized(message)) => println!("{}", message.to_ansi()),
            Ok(CommandOutcome::Quit) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    messenger.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
