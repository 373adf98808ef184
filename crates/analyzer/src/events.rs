use std::time::Duration;

use tracing::debug;

use crate::metrics;

pub fn emit_walk(nodes: u64, candidates: u64, iframes: u64, duration: Duration) {
    metrics::record_walk(nodes, candidates);
    debug!(
        target: "domlens.events",
        nodes,
        candidates,
        iframes,
        elapsed_ms = duration.as_secs_f64() * 1000.0,
        "analyzer.walk.completed"
    );
}

pub fn emit_filter(kept: usize, dropped: usize) {
    debug!(
        target: "domlens.events",
        kept,
        dropped,
        "analyzer.filter.completed"
    );
}

pub fn emit_popup_scan(scanned: u64, detected: u64) {
    metrics::record_popup_scan(detected);
    debug!(
        target: "domlens.events",
        scanned,
        detected,
        "analyzer.popups.scanned"
    );
}

pub fn emit_analysis(processed: u64, interactive: u64, filtered: u64, failed: bool, duration: Duration) {
    metrics::record_analysis(failed, duration);
    debug!(
        target: "domlens.events",
        processed,
        interactive,
        filtered,
        failed,
        elapsed_ms = duration.as_secs_f64() * 1000.0,
        "analyzer.analysis.completed"
    );
}
