use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("fusion_requests_total", "Total number of fusion requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("fusion_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("fusion_cache_misses_total", "Total cache misses").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("fusion_upstream_failures_total", "Requests that exhausted upstream retries").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "fusion_request_latency_seconds",
        "Suggestion latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("fusion_cache_size", "Current number of items in cache").unwrap();
}

// Text exposition of every registered metric
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}
