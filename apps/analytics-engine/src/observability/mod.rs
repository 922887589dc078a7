//! Observability module for metrics and logging.
//!
//! Structured `tracing` logs and an optional Prometheus exporter for
//! recompute counters and latencies.

mod logging;
mod metrics;

pub use logging::{LoggingError, env_filter, init_tracing};
pub use metrics::{
    GREEKS_SOURCE_TOTAL, MISSING_QUOTES_TOTAL, MetricsConfig, MetricsError, POSITION_GROUPS,
    RECOMPUTE_SECONDS, RECOMPUTE_TOTAL, REJECTED_LEGS_TOTAL, init_metrics, record_greeks_source,
    record_missing_quotes, record_recompute, record_rejected_legs,
};
