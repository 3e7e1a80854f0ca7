//! Prometheus metrics for the message engine.
//!
//! - Language metrics (languages loaded, load failures)
//! - Formatting metrics (rendered by language, missing keys, failures, latency)
//! - Delivery metrics (delivered, skipped)

mod helpers;

pub use helpers::{encode_metrics, DeliveryMetrics, LanguageMetrics, MessageMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "locale_messenger";

lazy_static! {
    // ============================================================================
    // Language Metrics
    // ============================================================================

    /// Number of languages currently installed in the template store
    pub static ref LANGUAGES_LOADED: IntGauge = register_int_gauge!(
        format!("{}_languages_loaded", METRIC_PREFIX),
        "Number of languages currently loaded"
    ).unwrap();

    /// Language files that failed to read or parse
    pub static ref LANGUAGE_LOAD_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_language_load_failures_total", METRIC_PREFIX),
        "Total language files that failed to load"
    ).unwrap();

    // ============================================================================
    // Formatting Metrics
    // ============================================================================

    /// Messages rendered, by resolved language
    pub static ref MESSAGES_FORMATTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_formatted_total", METRIC_PREFIX),
        "Total messages formatted",
        &["language"]
    ).unwrap();

    /// Lookups that fell back to the missing-key diagnostic
    pub static ref MISSING_KEYS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_missing_keys_total", METRIC_PREFIX),
        "Total lookups for keys absent from the resolved language"
    ).unwrap();

    /// Formatting failures by reason
    pub static ref FORMAT_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_format_failures_total", METRIC_PREFIX),
        "Total formatting failures",
        &["reason"]
    ).unwrap();

    /// Time spent resolving, substituting, translating and parsing one message
    pub static ref FORMAT_DURATION: Histogram = register_histogram!(
        format!("{}_format_duration_seconds", METRIC_PREFIX),
        "Message formatting latency in seconds",
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]
    ).unwrap();

    // ============================================================================
    // Delivery Metrics
    // ============================================================================

    /// Messages handed to recipients by the delivery context
    pub static ref MESSAGES_DELIVERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_delivered_total", METRIC_PREFIX),
        "Total messages delivered to recipients"
    ).unwrap();

    /// Reserved delivery slots that were abandoned because formatting failed
    pub static ref DELIVERIES_SKIPPED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_deliveries_skipped_total", METRIC_PREFIX),
        "Total delivery slots skipped after a formatting failure"
    ).unwrap();
}
