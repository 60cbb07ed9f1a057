//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec, Encoder,
    HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records a session operation (`save`, `update`, `load`, `delete`) with its outcome.
    fn record_session_operation(&self, operation: &str, result: &str);

    /// Records how long a store call took.
    fn record_store_duration(&self, operation: &str, store: &str, duration_secs: f64);

    /// Records the outcome of an authentication middleware pass.
    fn record_auth_attempt(&self, result: &str);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Session metrics
    session_operations_total: CounterVec,
    store_duration_seconds: HistogramVec,

    // Authentication metrics
    auth_requests_total: CounterVec,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let session_operations_total = register_counter_vec_with_registry!(
            Opts::new(
                "session_operations_total",
                "Total number of session operations"
            ),
            &["operation", "result"],
            registry.clone()
        )
        .expect("Failed to register session_operations_total");

        let store_duration_seconds = register_histogram_vec_with_registry!(
            "session_store_duration_seconds",
            "Session store call duration in seconds",
            &["operation", "store"],
            vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            registry.clone()
        )
        .expect("Failed to register session_store_duration_seconds");

        let auth_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "auth_requests_total",
                "Total number of authentication middleware passes"
            ),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register auth_requests_total");

        Metrics {
            registry,
            session_operations_total,
            store_duration_seconds,
            auth_requests_total,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_session_operation(&self, operation: &str, result: &str) {
        self.session_operations_total
            .with_label_values(&[operation, result])
            .inc();
    }

    fn record_store_duration(&self, operation: &str, store: &str, duration_secs: f64) {
        self.store_duration_seconds
            .with_label_values(&[operation, store])
            .observe(duration_secs);
    }

    fn record_auth_attempt(&self, result: &str) {
        self.auth_requests_total.with_label_values(&[result]).inc();
    }
}
