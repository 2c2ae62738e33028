/// Prometheus metrics for the property search service.
///
/// Three concerns are tracked:
/// - queries served, by kind (`find`, `postcode`, `suggest`)
/// - latency and failures of calls to the search and storage services
/// - documents written by the import pipeline
///
/// # Example
/// ```no_run
/// use property_search::metrics::{init_metrics, gather_metrics, SEARCH_QUERIES_TOTAL};
///
/// init_metrics().ok();
/// SEARCH_QUERIES_TOTAL.with_label_values(&["find"]).inc();
/// println!("{}", gather_metrics());
/// ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::Instant;

const NAMESPACE: &str = "property_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Queries served
    ///
    /// Labels: kind
    pub static ref SEARCH_QUERIES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_queries_total", "Total number of search queries served")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_QUERIES_TOTAL metric");

    /// Upstream call duration in seconds
    ///
    /// Labels: service, operation
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "upstream_request_duration_seconds",
            "Duration of calls to the search and storage services in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"]
    ).expect("Failed to create UPSTREAM_REQUEST_DURATION_SECONDS metric");

    /// Upstream calls that failed before a response arrived
    ///
    /// Labels: service, operation
    pub static ref UPSTREAM_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("upstream_errors_total", "Total number of failed upstream calls")
            .namespace(NAMESPACE),
        &["service", "operation"]
    ).expect("Failed to create UPSTREAM_ERRORS_TOTAL metric");

    /// Documents written to blob storage by imports
    ///
    /// Labels: index
    pub static ref DOCUMENTS_IMPORTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("documents_imported_total", "Total number of documents imported")
            .namespace(NAMESPACE),
        &["index"]
    ).expect("Failed to create DOCUMENTS_IMPORTED_TOTAL metric");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; repeated registrations are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SEARCH_QUERIES_TOTAL.clone()),
        Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()),
        Box::new(UPSTREAM_ERRORS_TOTAL.clone()),
        Box::new(DOCUMENTS_IMPORTED_TOTAL.clone()),
    ];

    for collector in collectors {
        match PROMETHEUS_REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Record one upstream call started at `start`
pub fn observe_upstream(service: &str, operation: &str, start: Instant, ok: bool) {
    UPSTREAM_REQUEST_DURATION_SECONDS
        .with_label_values(&[service, operation])
        .observe(start.elapsed().as_secs_f64());
    if !ok {
        UPSTREAM_ERRORS_TOTAL
            .with_label_values(&[service, operation])
            .inc();
    }
}

pub fn record_query(kind: &str) {
    SEARCH_QUERIES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_documents_imported(index: &str, count: usize) {
    DOCUMENTS_IMPORTED_TOTAL
        .with_label_values(&[index])
        .inc_by(count as f64);
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
