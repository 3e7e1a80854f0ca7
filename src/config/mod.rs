mod settings;

pub use settings::{I18nConfig, LogFormat, LoggingConfig, Settings};
