//! Logging setup.
//!
//! Installs a `tracing` subscriber with:
//! - an `EnvFilter` (`RUST_LOG` wins over the configured level)
//! - human-readable or JSON output, depending on `logging.format`
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RUST_LOG` | Log filter directives | configured `logging.level` |
//! | `LOCALE_MESSENGER__LOGGING__LEVEL` | Fallback filter | `info` |
//! | `LOCALE_MESSENGER__LOGGING__FORMAT` | `pretty` or `json` | `pretty` |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Telemetry-specific error type
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Build the filter: `RUST_LOG` if set, otherwise the configured level
pub fn build_filter(config: &LoggingConfig) -> TelemetryResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> TelemetryResult<()> {
    let env_filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };
    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::info!(format = ?config.format, "Tracing initialized");
    Ok(())
}
