use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct I18nConfig {
    /// Directory scanned for `lang_<code>.yml` files
    #[serde(default = "default_language_dir")]
    pub language_dir: PathBuf,
    /// Last-resort language; fixed for the life of the process
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Language pinned at startup; may name a language that is not loaded yet
    #[serde(default)]
    pub active_language: Option<String>,
    /// Write the bundled default language file when it is missing on disk
    #[serde(default = "default_seed")]
    pub seed_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_language_dir() -> PathBuf {
    PathBuf::from("languages")
}

fn default_language() -> String {
    "en".to_string()
}

fn default_seed() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("i18n.language_dir", "languages")?
            .set_default("i18n.default_language", "en")?
            .set_default("i18n.seed_default", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // LOCALE_MESSENGER__I18N__DEFAULT_LANGUAGE, LOCALE_MESSENGER__LOGGING__LEVEL, etc.
            .add_source(
                Environment::with_prefix("LOCALE_MESSENGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            language_dir: default_language_dir(),
            default_language: default_language(),
            active_language: None,
            seed_default: default_seed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
