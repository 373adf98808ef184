//! Telemetry helpers for the DOM analyzer.
//!
//! Lightweight counters + latency aggregates so hosts can surface basic
//! metrics without depending on an external metrics backend yet.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static ANALYZE_TOTAL: AtomicU64 = AtomicU64::new(0);
static ANALYZE_FAILED: AtomicU64 = AtomicU64::new(0);
static ANALYZE_LAT_NS: AtomicU64 = AtomicU64::new(0);
static ANALYZE_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);

static WALK_NODES_TOTAL: AtomicU64 = AtomicU64::new(0);
static WALK_CANDIDATES_TOTAL: AtomicU64 = AtomicU64::new(0);

static POPUP_SCAN_TOTAL: AtomicU64 = AtomicU64::new(0);
static POPUP_DETECTED_TOTAL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricCounter {
    pub total: u64,
    pub avg_ms: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub analyze: MetricCounter,
    pub analyze_failures: u64,
    pub walk_nodes: u64,
    pub walk_candidates: u64,
    pub popup_scans: u64,
    pub popups_detected: u64,
}

pub fn record_analysis(failed: bool, duration: Duration) {
    ANALYZE_TOTAL.fetch_add(1, Ordering::Relaxed);
    if failed {
        ANALYZE_FAILED.fetch_add(1, Ordering::Relaxed);
    }
    record_latency(&ANALYZE_LAT_NS, &ANALYZE_LAT_SAMPLES, duration);
}

pub fn record_walk(nodes: u64, candidates: u64) {
    WALK_NODES_TOTAL.fetch_add(nodes, Ordering::Relaxed);
    WALK_CANDIDATES_TOTAL.fetch_add(candidates, Ordering::Relaxed);
}

pub fn record_popup_scan(detected: u64) {
    POPUP_SCAN_TOTAL.fetch_add(1, Ordering::Relaxed);
    POPUP_DETECTED_TOTAL.fetch_add(detected, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    MetricSnapshot {
        analyze: make_counter(
            ANALYZE_TOTAL.load(Ordering::Relaxed),
            ANALYZE_LAT_NS.load(Ordering::Relaxed),
            ANALYZE_LAT_SAMPLES.load(Ordering::Relaxed),
        ),
        analyze_failures: ANALYZE_FAILED.load(Ordering::Relaxed),
        walk_nodes: WALK_NODES_TOTAL.load(Ordering::Relaxed),
        walk_candidates: WALK_CANDIDATES_TOTAL.load(Ordering::Relaxed),
        popup_scans: POPUP_SCAN_TOTAL.load(Ordering::Relaxed),
        popups_detected: POPUP_DETECTED_TOTAL.load(Ordering::Relaxed),
    }
}

fn make_counter(total: u64, nanos: u64, samples: u64) -> MetricCounter {
    let avg_ms = if samples == 0 {
        0.0
    } else {
        (nanos as f64 / samples as f64) / 1_000_000.0
    };
    MetricCounter { total, avg_ms }
}

fn record_latency(total_ns: &AtomicU64, samples: &AtomicU64, duration: Duration) {
    let nanos = duration_to_nanos(duration);
    total_ns.fetch_add(nanos, Ordering::Relaxed);
    samples.fetch_add(1, Ordering::Relaxed);
}

fn duration_to_nanos(duration: Duration) -> u64 {
    let nanos = duration.as_nanos();
    if nanos > u64::MAX as u128 {
        u64::MAX
    } else {
        nanos as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_activity() {
        // Counters are process-global and other tests record into them
        // concurrently, so assert on lower bounds only.
        let before = snapshot();
        record_analysis(false, Duration::from_millis(2));
        record_walk(10, 3);
        record_popup_scan(1);
        let after = snapshot();
        assert!(after.analyze.total >= before.analyze.total + 1);
        assert!(after.walk_nodes >= before.walk_nodes + 10);
        assert!(after.walk_candidates >= before.walk_candidates + 3);
        assert!(after.popups_detected >= before.popups_detected + 1);
    }
}
