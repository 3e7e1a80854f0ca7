// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Core engine
pub mod locale;
pub mod markup;
pub mod messenger;
pub mod template;

// Operator surface
pub mod command;
