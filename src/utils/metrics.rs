use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics collector for the application.
///
/// Tracks transformation cycles, outbound provider calls, and latencies.
/// Thread-safe and can be shared across the application.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Cycle metrics
    cycles_total: AtomicUsize,
    cycles_succeeded: AtomicUsize,
    cycles_failed: AtomicUsize,
    validation_rejections: AtomicUsize,

    // Outbound call metrics (one entry per attempt)
    upload_calls_total: AtomicUsize,
    upload_calls_failed: AtomicUsize,
    upload_latency_ms: RwLock<Vec<u64>>,
    transform_calls_total: AtomicUsize,
    transform_calls_failed: AtomicUsize,
    transform_latency_ms: RwLock<Vec<u64>>,

    // Per-endpoint request counters
    endpoint_counters: DashMap<String, AtomicUsize>,

    // Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                cycles_total: AtomicUsize::new(0),
                cycles_succeeded: AtomicUsize::new(0),
                cycles_failed: AtomicUsize::new(0),
                validation_rejections: AtomicUsize::new(0),
                upload_calls_total: AtomicUsize::new(0),
                upload_calls_failed: AtomicUsize::new(0),
                upload_latency_ms: RwLock::new(Vec::new()),
                transform_calls_total: AtomicUsize::new(0),
                transform_calls_failed: AtomicUsize::new(0),
                transform_latency_ms: RwLock::new(Vec::new()),
                endpoint_counters: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    // Cycle metrics
    pub fn record_cycle_started(&self) {
        self.inner.cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle_succeeded(&self) {
        self.inner.cycles_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle_failed(&self) {
        self.inner.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.inner
            .validation_rejections
            .fetch_add(1, Ordering::Relaxed);
    }

    // Outbound call metrics
    pub fn record_upload_call(&self, success: bool, duration: Duration) {
        self.inner.upload_calls_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.inner.upload_calls_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .upload_latency_ms
            .write()
            .push(duration.as_millis() as u64);
    }

    pub fn record_transform_call(&self, success: bool, duration: Duration) {
        self.inner
            .transform_calls_total
            .fetch_add(1, Ordering::Relaxed);
        if !success {
            self.inner
                .transform_calls_failed
                .fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .transform_latency_ms
            .write()
            .push(duration.as_millis() as u64);
    }

    // Endpoint metrics
    pub fn record_endpoint_request(&self, endpoint: &str) {
        self.inner
            .endpoint_counters
            .entry(endpoint.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let upload_latency = self.inner.upload_latency_ms.read();
        let upload_latency_avg = avg(&upload_latency);
        let upload_latency_p95 = percentile(&upload_latency, 0.95);
        drop(upload_latency);

        let transform_latency = self.inner.transform_latency_ms.read();
        let transform_latency_avg = avg(&transform_latency);
        let transform_latency_p50 = percentile(&transform_latency, 0.5);
        let transform_latency_p95 = percentile(&transform_latency, 0.95);
        drop(transform_latency);

        let endpoints = self
            .inner
            .endpoint_counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            cycles_total: self.inner.cycles_total.load(Ordering::Relaxed),
            cycles_succeeded: self.inner.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.inner.cycles_failed.load(Ordering::Relaxed),
            validation_rejections: self.inner.validation_rejections.load(Ordering::Relaxed),
            upload_calls_total: self.inner.upload_calls_total.load(Ordering::Relaxed),
            upload_calls_failed: self.inner.upload_calls_failed.load(Ordering::Relaxed),
            upload_latency_avg_ms: upload_latency_avg,
            upload_latency_p95_ms: upload_latency_p95,
            transform_calls_total: self.inner.transform_calls_total.load(Ordering::Relaxed),
            transform_calls_failed: self.inner.transform_calls_failed.load(Ordering::Relaxed),
            transform_latency_avg_ms: transform_latency_avg,
            transform_latency_p50_ms: transform_latency_p50,
            transform_latency_p95_ms: transform_latency_p95,
            endpoints,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            r#"# HELP cycles_total Total transformation cycles started
# TYPE cycles_total counter
cycles_total {{}} {}

# HELP cycles_succeeded Transformation cycles that completed successfully
# TYPE cycles_succeeded counter
cycles_succeeded {{}} {}

# HELP cycles_failed Transformation cycles that failed
# TYPE cycles_failed counter
cycles_failed {{}} {}

# HELP validation_rejections Submissions rejected before any network call
# TYPE validation_rejections counter
validation_rejections {{}} {}

# HELP provider_calls_total Outbound provider call attempts
# TYPE provider_calls_total counter
provider_calls_total {{provider="hosting"}} {}
provider_calls_total {{provider="transform"}} {}

# HELP provider_calls_failed Failed outbound provider call attempts
# TYPE provider_calls_failed counter
provider_calls_failed {{provider="hosting"}} {}
provider_calls_failed {{provider="transform"}} {}

# HELP provider_latency_avg_ms Average provider call latency in milliseconds
# TYPE provider_latency_avg_ms gauge
provider_latency_avg_ms {{provider="hosting"}} {}
provider_latency_avg_ms {{provider="transform"}} {}

# HELP uptime_seconds Application uptime in seconds
# TYPE uptime_seconds counter
uptime_seconds {{}} {}
"#,
            snapshot.cycles_total,
            snapshot.cycles_succeeded,
            snapshot.cycles_failed,
            snapshot.validation_rejections,
            snapshot.upload_calls_total,
            snapshot.transform_calls_total,
            snapshot.upload_calls_failed,
            snapshot.transform_calls_failed,
            snapshot.upload_latency_avg_ms,
            snapshot.transform_latency_avg_ms,
            snapshot.uptime_seconds,
        );

        for (endpoint, count) in &snapshot.endpoints {
            out.push_str(&format!(
                "endpoint_requests_total {{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub cycles_total: usize,
    pub cycles_succeeded: usize,
    pub cycles_failed: usize,
    pub validation_rejections: usize,
    pub upload_calls_total: usize,
    pub upload_calls_failed: usize,
    pub upload_latency_avg_ms: u64,
    pub upload_latency_p95_ms: u64,
    pub transform_calls_total: usize,
    pub transform_calls_failed: usize,
    pub transform_latency_avg_ms: u64,
    pub transform_latency_p50_ms: u64,
    pub transform_latency_p95_ms: u64,
    pub endpoints: BTreeMap<String, usize>,
    pub uptime_seconds: u64,
}

fn percentile(values: &[u64], p: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let idx = ((values.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_cycle_started();
        metrics.record_cycle_succeeded();
        metrics.record_upload_call(true, Duration::from_millis(120));
        metrics.record_transform_call(false, Duration::from_millis(40));
        metrics.record_transform_call(true, Duration::from_millis(80));
        metrics.record_endpoint_request("/api/transform");
        metrics.record_endpoint_request("/api/transform");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cycles_total, 1);
        assert_eq!(snapshot.cycles_succeeded, 1);
        assert_eq!(snapshot.upload_calls_total, 1);
        assert_eq!(snapshot.upload_calls_failed, 0);
        assert_eq!(snapshot.transform_calls_total, 2);
        assert_eq!(snapshot.transform_calls_failed, 1);
        assert_eq!(snapshot.transform_latency_avg_ms, 60);
        assert_eq!(snapshot.endpoints.get("/api/transform"), Some(&2));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_cycle_started();
        metrics.record_transform_call(true, Duration::from_millis(100));
        metrics.record_endpoint_request("/health");

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("cycles_total {} 1"));
        assert!(prometheus.contains("provider_calls_total {provider=\"transform\"} 1"));
        assert!(prometheus.contains("endpoint_requests_total {endpoint=\"/health\"} 1"));
    }
}
