//! Prometheus metrics for monitoring
//!
//! Counters, gauges, and histograms rendered in the Prometheus text format.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

/// Counter metric (monotonically increasing)
pub struct Counter {
    value: AtomicU64,
    name: String,
    help: String,
}

impl Counter {
    /// Create a new counter
    pub fn new(name: &str, help: &str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name: name.into(),
            help: help.into(),
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by delta
    pub fn inc_by(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Gauge metric (can go up or down)
pub struct Gauge {
    value: AtomicI64,
    name: String,
    help: String,
}

impl Gauge {
    /// Create a new gauge
    pub fn new(name: &str, help: &str) -> Self {
        Self {
            value: AtomicI64::new(0),
            name: name.into(),
            help: help.into(),
        }
    }

    /// Set value
    pub fn set(&self, val: i64) {
        self.value.store(val, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} gauge\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Histogram for latency measurements
pub struct Histogram {
    buckets: Vec<(f64, AtomicU64)>,
    sum: AtomicU64,
    count: AtomicU64,
    name: String,
    help: String,
}

impl Histogram {
    /// Create with default buckets (seconds)
    pub fn new(name: &str, help: &str) -> Self {
        Self::with_buckets(
            name,
            help,
            vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0],
        )
    }

    /// Create with custom buckets
    pub fn with_buckets(name: &str, help: &str, bounds: Vec<f64>) -> Self {
        let buckets = bounds
            .into_iter()
            .map(|b| (b, AtomicU64::new(0)))
            .collect();

        Self {
            buckets,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
            name: name.into(),
            help: help.into(),
        }
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);

        // Sum kept as u64 micros
        let micros = (value * 1_000_000.0) as u64;
        self.sum.fetch_add(micros, Ordering::Relaxed);

        for (bound, count) in &self.buckets {
            if value <= *bound {
                count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Time a closure and record the duration
    pub fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.observe(start.elapsed().as_secs_f64());
        result
    }

    /// Number of observations
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        let mut output = format!(
            "# HELP {} {}\n# TYPE {} histogram\n",
            self.name, self.help, self.name
        );

        for (bound, count) in &self.buckets {
            output.push_str(&format!(
                "{}_bucket{{le=\"{}\"}} {}\n",
                self.name, bound, count.load(Ordering::Relaxed)
            ));
        }

        let sum_secs = self.sum.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        output.push_str(&format!("{}_sum {}\n", self.name, sum_secs));
        output.push_str(&format!("{}_count {}\n", self.name, self.count()));

        output
    }
}

/// Standard loader metrics
pub mod standard {
    use super::*;
    use std::sync::LazyLock;

    pub static BYTES_FETCHED: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("tessera_bytes_fetched_total", "Total source bytes fetched")
    });

    pub static LOADS_COMPLETED: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("tessera_loads_completed_total", "Successful dataset loads")
    });

    pub static LOADS_FAILED: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("tessera_loads_failed_total", "Failed dataset loads")
    });

    pub static BATCHES_SERVED: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("tessera_batches_served_total", "Batches returned to callers")
    });

    pub static EXAMPLES_DRAWN: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("tessera_examples_drawn_total", "Examples copied into batches")
    });

    pub static LOADED_EXAMPLES: LazyLock<Gauge> = LazyLock::new(|| {
        Gauge::new("tessera_loaded_examples", "Examples held by the most recent load")
    });

    pub static DECODE_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
        Histogram::new("tessera_decode_duration_seconds", "Sprite decode latency")
    });

    pub static LOAD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
        Histogram::new("tessera_load_duration_seconds", "End-to-end load latency")
    });
}

/// Render all standard metrics
pub fn gather_loader_metrics() -> String {
    let mut output = String::new();

    output.push_str(&standard::BYTES_FETCHED.to_prometheus());
    output.push_str(&standard::LOADS_COMPLETED.to_prometheus());
    output.push_str(&standard::LOADS_FAILED.to_prometheus());
    output.push_str(&standard::BATCHES_SERVED.to_prometheus());
    output.push_str(&standard::EXAMPLES_DRAWN.to_prometheus());

    output.push_str(&standard::LOADED_EXAMPLES.to_prometheus());

    output.push_str(&standard::DECODE_DURATION.to_prometheus());
    output.push_str(&standard::LOAD_DURATION.to_prometheus());

    output
}
