use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub record_writes_total: IntCounterVec,
    pub geocode_requests_total: IntCounterVec,
    pub geocode_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let record_writes_total = IntCounterVec::new(
            Opts::new(
                "record_writes_total",
                "Write requests by entity, operation and outcome",
            ),
            &["entity", "operation", "outcome"],
        )
        .expect("valid record_writes_total metric");

        let geocode_requests_total = IntCounterVec::new(
            Opts::new("geocode_requests_total", "Geocoding lookups by outcome"),
            &["outcome"],
        )
        .expect("valid geocode_requests_total metric");

        let geocode_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "geocode_latency_seconds",
                "Latency of geocoding lookups in seconds",
            ),
            &["outcome"],
        )
        .expect("valid geocode_latency_seconds metric");

        registry
            .register(Box::new(record_writes_total.clone()))
            .expect("register record_writes_total");
        registry
            .register(Box::new(geocode_requests_total.clone()))
            .expect("register geocode_requests_total");
        registry
            .register(Box::new(geocode_latency_seconds.clone()))
            .expect("register geocode_latency_seconds");

        Self {
            registry,
            record_writes_total,
            geocode_requests_total,
            geocode_latency_seconds,
        }
    }

    pub fn record_write(&self, entity: &str, operation: &str, outcome: &str) {
        self.record_writes_total
            .with_label_values(&[entity, operation, outcome])
            .inc();
    }

    pub fn record_geocode(&self, outcome: &str, elapsed_secs: f64) {
        self.geocode_requests_total
            .with_label_values(&[outcome])
            .inc();
        self.geocode_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
