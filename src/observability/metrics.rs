use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Vendor request metrics
    pub vendor_requests: IntCounterVec,
    pub vendor_request_duration: HistogramVec,

    // Authentication metrics
    pub auth_exchanges: IntCounterVec,
    pub auth_retries: IntCounterVec,

    // Orchestration metrics
    pub trial_outcomes: IntCounterVec,
    pub webhook_responses: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("trialagent".into()), None).expect("valid metrics prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Vendor
            vendor_requests: IntCounterVec::new(Opts::new("vendor_requests_total", "Upstream vendor requests by status"),&["service", "status"],).unwrap(),
            vendor_request_duration: HistogramVec::new(HistogramOpts::new("vendor_request_duration_seconds", "Upstream vendor request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),&["service"],).unwrap(),

            // Auth
            auth_exchanges: IntCounterVec::new(Opts::new("auth_exchanges_total", "Login / token exchanges by outcome"),&["service", "outcome"],).unwrap(),
            auth_retries: IntCounterVec::new(Opts::new("auth_retries_total", "Requests replayed after 401/403"),&["service"],).unwrap(),

            // Orchestration
            trial_outcomes: IntCounterVec::new(Opts::new("trial_outcomes_total", "Trial requests by final outcome"),&["outcome"],).unwrap(),
            webhook_responses: IntCounterVec::new(Opts::new("webhook_responses_total", "Webhook responses by HTTP status"),&["status"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.vendor_requests.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.auth_exchanges.clone())).unwrap();
        reg.register(Box::new(metrics.auth_retries.clone())).unwrap();
        reg.register(Box::new(metrics.trial_outcomes.clone())).unwrap();
        reg.register(Box::new(metrics.webhook_responses.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
