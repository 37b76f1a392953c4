use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use crate::models::record::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Latencies {
    pub total: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub max: Duration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByteMetrics {
    pub total: u64,
    pub mean: f64,
}

/// Summary of a result set. Built fresh for every report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub requests: u64,
    /// Earliest to latest issue timestamp
    pub duration: Duration,
    /// Latest issue timestamp to the last response
    pub wait: Duration,
    pub latencies: Latencies,
    pub bytes_in: ByteMetrics,
    pub bytes_out: ByteMetrics,
    /// Ratio of records without an error, 0 to 1
    pub success: f64,
    pub status_codes: BTreeMap<i32, u64>,
    /// Distinct error strings in order of first occurrence
    pub errors: Vec<String>,
}

impl Metrics {
    pub fn new(results: &[Record]) -> Self {
        let mut m = Metrics::default();
        if results.is_empty() {
            return m;
        }

        let mut latencies = Vec::with_capacity(results.len());
        let mut total_latency: u128 = 0;
        let mut successes = 0u64;
        let mut seen_errors = HashSet::new();
        let mut earliest = results[0].timestamp;
        let mut latest = earliest;
        let mut end = results[0].end();

        for r in results {
            earliest = earliest.min(r.timestamp);
            latest = latest.max(r.timestamp);
            end = end.max(r.end());

            latencies.push(r.latency);
            total_latency += r.latency.as_nanos();
            m.bytes_in.total += r.bytes_in;
            m.bytes_out.total += r.bytes_out;
            *m.status_codes.entry(r.code).or_insert(0) += 1;

            if r.is_success() {
                successes += 1;
            } else if seen_errors.insert(r.error.as_str()) {
                m.errors.push(r.error.clone());
            }
        }

        let n = results.len() as u64;
        m.requests = n;
        m.duration = latest.duration_since(earliest).unwrap_or_default();
        m.wait = end.duration_since(latest).unwrap_or_default();

        latencies.sort_unstable();
        m.latencies = Latencies {
            total: nanos(total_latency),
            mean: nanos(total_latency / n as u128),
            p50: nearest_rank(&latencies, 50),
            p95: nearest_rank(&latencies, 95),
            p99: nearest_rank(&latencies, 99),
            max: latencies[latencies.len() - 1],
        };
        m.bytes_in.mean = m.bytes_in.total as f64 / n as f64;
        m.bytes_out.mean = m.bytes_out.total as f64 / n as f64;
        m.success = successes as f64 / n as f64;
        m
    }

    /// Attack duration plus the wait for the last response.
    pub fn total_duration(&self) -> Duration {
        self.duration + self.wait
    }
}

/// Value at rank `ceil(pct * n / 100)` of an ascending slice.
pub(crate) fn nearest_rank(sorted: &[Duration], pct: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (sorted.len() * pct).div_ceil(100);
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

fn nanos(n: u128) -> Duration {
    Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX))
}
