//! Prometheus metrics for the analytics engine.
//!
//! Metric calls go through the `metrics` facade and are no-ops until a
//! recorder is installed with [`init_metrics`].
//!
//! # Example
//!
//! ```ignore
//! use analytics_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig { enabled: true, ..MetricsConfig::default() };
//! init_metrics(&config).expect("Failed to initialize metrics");
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::domain::portfolio::GreeksSource;

/// Recomputes completed.
pub const RECOMPUTE_TOTAL: &str = "analytics_recompute_total";
/// Recompute wall time in seconds.
pub const RECOMPUTE_SECONDS: &str = "analytics_recompute_seconds";
/// Legs dropped during validation.
pub const REJECTED_LEGS_TOTAL: &str = "analytics_rejected_legs_total";
/// Underlyings without a usable quote.
pub const MISSING_QUOTES_TOTAL: &str = "analytics_missing_quotes_total";
/// Enriched legs by greeks source.
pub const GREEKS_SOURCE_TOTAL: &str = "analytics_greeks_source_total";
/// Position groups in the last recompute.
pub const POSITION_GROUPS: &str = "analytics_position_groups";

/// Configuration for the metrics exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Start the Prometheus exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for recompute latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // 100us to 1s
            latency_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ],
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`. Must be
/// called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Recompute Metrics
// ============================================================================

/// Record a completed recompute.
///
/// # Arguments
///
/// * `groups` - Position groups in the report
/// * `duration_seconds` - Wall time of the recompute
pub fn record_recompute(groups: usize, duration_seconds: f64) {
    counter!(RECOMPUTE_TOTAL).increment(1);
    histogram!(RECOMPUTE_SECONDS).record(duration_seconds);
    gauge!(POSITION_GROUPS).set(groups as f64);
}

/// Record legs dropped during validation.
pub fn record_rejected_legs(count: usize) {
    if count > 0 {
        counter!(REJECTED_LEGS_TOTAL).increment(count as u64);
    }
}

/// Record underlyings that had no usable quote.
pub fn record_missing_quotes(count: usize) {
    if count > 0 {
        counter!(MISSING_QUOTES_TOTAL).increment(count as u64);
    }
}

/// Record one enriched leg by the source of its greeks.
pub fn record_greeks_source(source: GreeksSource) {
    counter!(GREEKS_SOURCE_TOTAL, "source" => source.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        // Actual metric recording requires an installed recorder
        record_recompute(3, 0.002);
        record_rejected_legs(0);
        record_rejected_legs(2);
        record_missing_quotes(1);
        record_greeks_source(GreeksSource::Broker);
    }

    #[test]
    fn default_config_is_disabled() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.listen_addr.port(), 9090);
    }

    #[test]
    fn config_deserializes_listen_addr() {
        let config: MetricsConfig =
            serde_yaml_bw::from_str("enabled: true\nlisten_addr: \"127.0.0.1:9100\"\n").unwrap();
        assert!(config.enabled);
        assert_eq!(config.listen_addr, SocketAddr::from(([127, 0, 0, 1], 9100)));
        assert_eq!(config.latency_buckets.len(), 11);
    }
}
