//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DELIVERIES_SKIPPED_TOTAL, FORMAT_DURATION, FORMAT_FAILURES_TOTAL, LANGUAGES_LOADED,
    LANGUAGE_LOAD_FAILURES_TOTAL, MESSAGES_DELIVERED_TOTAL, MESSAGES_FORMATTED_TOTAL,
    MISSING_KEYS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording language store metrics
pub struct LanguageMetrics;

impl LanguageMetrics {
    /// Set the number of installed languages
    pub fn set_loaded(count: usize) {
        LANGUAGES_LOADED.set(count as i64);
    }

    /// Record a language file that failed to load
    pub fn record_load_failure() {
        LANGUAGE_LOAD_FAILURES_TOTAL.inc();
    }
}

/// Helper struct for recording formatting metrics
pub struct MessageMetrics;

impl MessageMetrics {
    /// Record a successfully formatted message
    pub fn record_formatted(language: &str, elapsed: Duration) {
        MESSAGES_FORMATTED_TOTAL.with_label_values(&[language]).inc();
        FORMAT_DURATION.observe(elapsed.as_secs_f64());
    }

    /// Record a missing-key diagnostic
    pub fn record_missing_key() {
        MISSING_KEYS_TOTAL.inc();
    }

    /// Record a formatting failure
    pub fn record_failure(reason: &str) {
        FORMAT_FAILURES_TOTAL.with_label_values(&[reason]).inc();
    }
}

/// Helper struct for recording delivery metrics
pub struct DeliveryMetrics;

impl DeliveryMetrics {
    pub fn record_delivered() {
        MESSAGES_DELIVERED_TOTAL.inc();
    }

    pub fn record_skipped() {
        DELIVERIES_SKIPPED_TOTAL.inc();
    }
}
