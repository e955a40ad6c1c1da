//! Prometheus metrics for craftbook.
//!
//! Covers:
//! - Cost resolutions by outcome and latency
//! - Market price lookups, cache hits and HTTP retries
//! - Market analyses by average-price tier
//! - Hot-item screening
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

/// Total cost resolutions.
/// Labels: status (success/no_recipe/api_error/error)
pub static RESOLUTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "craftbook_resolutions_total",
        "Total cost resolutions by outcome",
        &["status"]
    )
    .unwrap()
});

/// Wall time of a cost resolution in milliseconds.
pub static RESOLUTION_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "craftbook_resolution_duration_ms",
        "Cost resolution wall time in milliseconds",
        &["status"],
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap()
});

/// Market price requests (one per chunk).
/// Labels: outcome (ok/http_error/transport_error/parse_error)
pub static PRICE_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "craftbook_price_requests_total",
        "Market price requests by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Snapshot cache lookups.
/// Labels: result (hit/miss)
pub static PRICE_CACHE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "craftbook_price_cache_total",
        "Snapshot cache lookups by result",
        &["result"]
    )
    .unwrap()
});

/// HTTP retries.
/// Labels: reason (status code or "transport")
pub static HTTP_RETRIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "craftbook_http_retries_total",
        "HTTP request retries",
        &["reason"]
    )
    .unwrap()
});

/// Market analyses.
/// Labels: average_price_type (normal/old/estimated/none)
pub static ANALYSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "craftbook_analyses_total",
        "Market analyses by average price tier",
        &["average_price_type"]
    )
    .unwrap()
});

/// Items that passed the last hot-item screen.
pub static HOT_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "craftbook_hot_items",
        "Items that passed the last hot-item screen"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a finished resolution.
    pub fn resolution(status: &str, duration_ms: f64) {
        RESOLUTIONS_TOTAL.with_label_values(&[status]).inc();
        RESOLUTION_DURATION_MS
            .with_label_values(&[status])
            .observe(duration_ms);
    }

    /// Record one price request outcome.
    pub fn price_request(outcome: &str) {
        PRICE_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn price_cache_hit() {
        PRICE_CACHE_TOTAL.with_label_values(&["hit"]).inc();
    }

    pub fn price_cache_miss() {
        PRICE_CACHE_TOTAL.with_label_values(&["miss"]).inc();
    }

    /// Record an HTTP retry.
    pub fn http_retry(reason: &str) {
        HTTP_RETRIES_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record an analysis and the average-price tier it used.
    pub fn analysis(average_price_type: &str) {
        ANALYSES_TOTAL
            .with_label_values(&[average_price_type])
            .inc();
    }

    pub fn hot_items(count: usize) {
        HOT_ITEMS.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_text_includes_recorded_metrics() {
        Metrics::resolution("success", 12.0);
        Metrics::price_cache_hit();
        Metrics::analysis("normal");
        Metrics::hot_items(3);

        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("craftbook_resolutions_total{status=\"success\"}"));
        assert!(text.contains("craftbook_price_cache_total{result=\"hit\"}"));
        assert!(text.contains("craftbook_analyses_total{average_price_type=\"normal\"}"));
        assert!(text.contains("craftbook_hot_items 3"));
    }

    #[test]
    fn test_counter_increments() {
        let before = PRICE_REQUESTS_TOTAL.with_label_values(&["ok"]).get();
        Metrics::price_request("ok");
        Metrics::price_request("ok");
        let after = PRICE_REQUESTS_TOTAL.with_label_values(&["ok"]).get();
        assert_eq!(after - before, 2.0);
    }
}
