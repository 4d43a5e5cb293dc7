mod http;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};

pub use http::{metrics_handler, track_requests};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - HTTP traffic (count and latency per route template)
// - Order state transitions
// - Best-effort lookups that degraded to "unavailable"
// - Circuit breaker state per downstream client
//
// Scraped via GET /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // HTTP
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Orders
    pub order_transitions_total: IntCounterVec,
    pub enrichment_unavailable_total: IntCounterVec,

    // Circuit Breakers
    pub circuit_breaker_state: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method", "route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        let order_transitions_total = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order status transitions by target status"),
            &["status"],
        )?;
        registry.register(Box::new(order_transitions_total.clone()))?;

        let enrichment_unavailable_total = IntCounterVec::new(
            Opts::new(
                "enrichment_unavailable_total",
                "Best-effort lookups that failed and were left out of a response",
            ),
            &["source"],
        )?;
        registry.register(Box::new(enrichment_unavailable_total.clone()))?;

        let circuit_breaker_state = IntGaugeVec::new(
            Opts::new(
                "circuit_breaker_state",
                "Circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
            ),
            &["client"],
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            order_transitions_total,
            enrichment_unavailable_total,
            circuit_breaker_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    pub fn record_transition(&self, status: &str) {
        self.order_transitions_total.with_label_values(&[status]).inc();
    }

    pub fn record_enrichment_unavailable(&self, source: &str) {
        self.enrichment_unavailable_total.with_label_values(&[source]).inc();
    }

    /// Gauge a circuit breaker for `client` should report into.
    pub fn circuit_breaker_gauge(&self, client: &str) -> IntGauge {
        self.circuit_breaker_state.with_label_values(&[client])
    }
}
