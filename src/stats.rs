//! Export statistics for the exporter itself.
//!
//! Tracks how export cycles and report reloads perform over the lifetime of
//! the process. Rendered as a plain-text table on `/health`.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use crate::exporter::ExportSummary;

/// Running statistics for a single value.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(last, avg, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Sliding window of HTTP request timestamps (10 minutes).
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Duration::from_secs(600))
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            let now = Instant::now();
            guard
                .iter()
                .filter(|&&t| now.duration_since(t) <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

/// Statistics about export cycles, report loading and HTTP traffic.
pub struct ExportStats {
    pub cycle_duration_ms: Stat,
    pub samples_per_cycle: Stat,
    pub sites_per_cycle: Stat,
    pub total_cycles: AtomicU64,
    pub total_samples: AtomicU64,

    pub report_loads: AtomicU64,
    pub report_load_failures: AtomicU64,
    pub report_load_duration_ms: Stat,

    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,
    pub serialization_duration_ms: Stat,

    pub start_time: Instant,
    pub last_cycle_time: StdRwLock<Option<Instant>>,
}

impl Default for ExportStats {
    fn default() -> Self {
        Self {
            cycle_duration_ms: Stat::default(),
            samples_per_cycle: Stat::default(),
            sites_per_cycle: Stat::default(),
            total_cycles: AtomicU64::new(0),
            total_samples: AtomicU64::new(0),
            report_loads: AtomicU64::new(0),
            report_load_failures: AtomicU64::new(0),
            report_load_duration_ms: Stat::default(),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            serialization_duration_ms: Stat::default(),
            start_time: Instant::now(),
            last_cycle_time: StdRwLock::new(None),
        }
    }
}

impl ExportStats {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_cycle(&self, summary: &ExportSummary) {
        self.cycle_duration_ms
            .add_sample(summary.duration.as_secs_f64() * 1000.0);
        self.samples_per_cycle.add_sample(summary.samples as f64);
        self.sites_per_cycle.add_sample(summary.sites as f64);
        self.total_cycles.fetch_add(1, Ordering::Relaxed);
        self.total_samples
            .fetch_add(summary.samples as u64, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_cycle_time.write() {
            *guard = Some(Instant::now());
        }
    }

    pub fn record_report_load(&self, duration_ms: f64) {
        self.report_loads.fetch_add(1, Ordering::Relaxed);
        self.report_load_duration_ms.add_sample(duration_ms);
    }

    pub fn record_report_load_failure(&self) {
        self.report_load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_serialization_duration_ms(&self, duration_ms: f64) {
        self.serialization_duration_ms.add_sample(duration_ms);
    }

    /// Share of successful report loads in percent; 100 before the first load.
    pub fn get_report_load_success_rate(&self) -> f64 {
        let success = self.report_loads.load(Ordering::Relaxed);
        let failure = self.report_load_failures.load(Ordering::Relaxed);
        let total = success + failure;
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Seconds since the last export cycle, if any.
    pub fn seconds_since_last_cycle(&self) -> Option<f64> {
        self.last_cycle_time
            .read()
            .ok()
            .and_then(|g| (*g).map(|t| t.elapsed().as_secs_f64()))
    }

    pub fn render_table(&self) -> String {
        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        let row = |out: &mut String, name: &str, stat: &Stat, precision: usize| {
            let (cur, avg, max, min, _) = stat.snapshot();
            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
                name,
                format!("{:.p$}", cur, p = precision),
                format!("{:.p$}", avg, p = precision.max(1)),
                format!("{:.p$}", max, p = precision),
                format!("{:.p$}", min, p = precision),
                left = left_col,
                col = col_w
            )
            .ok();
        };

        writeln!(out).ok();
        writeln!(out, "EXPORT CYCLES").ok();
        writeln!(out, "-------------").ok();
        row(&mut out, "cycle_duration (ms)", &self.cycle_duration_ms, 3);
        row(&mut out, "samples_per_cycle", &self.samples_per_cycle, 0);
        row(&mut out, "sites_per_cycle", &self.sites_per_cycle, 0);

        writeln!(out).ok();
        writeln!(out, "REPORT SOURCE").ok();
        writeln!(out, "-------------").ok();
        row(&mut out, "report_load (ms)", &self.report_load_duration_ms, 3);

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        row(&mut out, "serialization (ms)", &self.serialization_duration_ms, 3);

        let last_cycle = self
            .seconds_since_last_cycle()
            .map(|s| format!("{:.1}s ago", s))
            .unwrap_or_else(|| "N/A".to_string());

        writeln!(out).ok();
        writeln!(out, "TOTALS").ok();
        writeln!(out, "------").ok();
        writeln!(
            out,
            "total_cycles: {}",
            self.total_cycles.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            out,
            "total_samples: {}",
            self.total_samples.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            out,
            "report_load_success_rate: {:.1}%",
            self.get_report_load_success_rate()
        )
        .ok();
        writeln!(
            out,
            "metrics_endpoint_calls: {}",
            self.metrics_endpoint_calls.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            out,
            "http_requests_last_minute: {}",
            self.http_request_timestamps.count_last_minute()
        )
        .ok();
        writeln!(out, "last_cycle: {}", last_cycle).ok();
        writeln!(out, "uptime: {}s", self.get_uptime_seconds()).ok();

        out
    }
}
