// Metrics collection for the pricing engine

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for quote and ingestion monitoring
#[derive(Debug)]
pub struct MetricsCollector {
    // Quote metrics
    pub quotes_total: AtomicCounter,
    pub quote_failures_total: AtomicCounter,
    pub quote_latency_us: AtomicHistogram,

    // Rule metrics
    pub rule_faults_total: AtomicCounter,

    // Signal metrics
    pub signals_ingested_total: AtomicCounter,
    pub signals_rejected_total: AtomicCounter,

    pub uptime_start: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            quotes_total: AtomicCounter::new(),
            quote_failures_total: AtomicCounter::new(),
            // 1000 buckets of 10µs = 10ms
            quote_latency_us: AtomicHistogram::with_buckets(1000, 10),
            rule_faults_total: AtomicCounter::new(),
            signals_ingested_total: AtomicCounter::new(),
            signals_rejected_total: AtomicCounter::new(),
            uptime_start: Instant::now(),
        }
    }

    /// Get current uptime
    pub fn uptime(&self) -> std::time::Duration {
        self.uptime_start.elapsed()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> PricingMetrics {
        PricingMetrics {
            quotes_total: self.quotes_total.get(),
            quote_failures_total: self.quote_failures_total.get(),
            quote_latency_p50_us: self.quote_latency_us.percentile(50.0),
            quote_latency_p95_us: self.quote_latency_us.percentile(95.0),
            quote_latency_p99_us: self.quote_latency_us.percentile(99.0),
            rule_faults_total: self.rule_faults_total.get(),
            signals_ingested_total: self.signals_ingested_total.get(),
            signals_rejected_total: self.signals_rejected_total.get(),
            uptime_seconds: self.uptime().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe atomic counter
#[derive(Debug)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self { value: AtomicU64::new(0) }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe bucketed histogram for latency tracking
#[derive(Debug)]
pub struct AtomicHistogram {
    buckets: Vec<AtomicU64>,
    bucket_size: u64,
    max_value: u64,
}

impl AtomicHistogram {
    pub fn with_buckets(bucket_count: usize, bucket_size: u64) -> Self {
        let buckets = (0..bucket_count).map(|_| AtomicU64::new(0)).collect();

        Self { buckets, bucket_size, max_value: (bucket_count as u64) * bucket_size }
    }

    pub fn record(&self, value: u64) {
        let bucket_index = if value >= self.max_value {
            self.buckets.len() - 1
        } else {
            (value / self.bucket_size) as usize
        };

        if let Some(bucket) = self.buckets.get(bucket_index) {
            bucket.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.load(Ordering::Relaxed)).sum()
    }

    pub fn percentile(&self, p: f64) -> u64 {
        let total = self.total_count();
        if total == 0 {
            return 0;
        }

        let target = ((total as f64 * p / 100.0) as u64).max(1);
        let mut count = 0;

        for (i, bucket) in self.buckets.iter().enumerate() {
            count += bucket.load(Ordering::Relaxed);
            if count >= target {
                if p >= 100.0 {
                    return self.max_value;
                }
                return (i as u64) * self.bucket_size;
            }
        }

        self.max_value
    }
}

/// Point-in-time view of the pricing metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingMetrics {
    pub quotes_total: u64,
    pub quote_failures_total: u64,
    pub quote_latency_p50_us: u64,
    pub quote_latency_p95_us: u64,
    pub quote_latency_p99_us: u64,
    pub rule_faults_total: u64,
    pub signals_ingested_total: u64,
    pub signals_rejected_total: u64,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_atomic_counter() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.get(), 0);

        counter.inc();
        assert_eq!(counter.get(), 1);

        counter.add(5);
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn test_histogram_percentiles() {
        let histogram = AtomicHistogram::with_buckets(10, 100);

        histogram.record(50); // bucket 0
        histogram.record(150); // bucket 1
        histogram.record(250); // bucket 2
        histogram.record(250); // bucket 2 again
        histogram.record(5_000); // overflow -> last bucket

        assert_eq!(histogram.total_count(), 5);
        assert_eq!(histogram.percentile(50.0), 100);
        assert_eq!(histogram.percentile(100.0), 1000);
        assert_eq!(AtomicHistogram::with_buckets(4, 10).percentile(99.0), 0);
    }

    #[test]
    fn test_snapshot() {
        let metrics = MetricsCollector::new();
        metrics.quotes_total.add(10);
        metrics.quote_failures_total.inc();
        metrics.rule_faults_total.add(2);
        metrics.quote_latency_us.record(35);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.quotes_total, 10);
        assert_eq!(snapshot.quote_failures_total, 1);
        assert_eq!(snapshot.rule_faults_total, 2);
        assert_eq!(snapshot.quote_latency_p50_us, 30);
    }

    #[test]
    fn test_concurrent_metrics() {
        let metrics = Arc::new(MetricsCollector::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let metrics = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    metrics.quotes_total.inc();
                    metrics.quote_latency_us.record(120);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.quotes_total, 400);
        assert_eq!(snapshot.quote_latency_p50_us, 120);
    }
}
