//! Analysis entry point: walk, filter, index, paint, scan, project.

use std::time::Instant;

use chrono::Utc;
use domlens_page::Page;
use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::errors::AnalyzerError;
use crate::events;
use crate::filter;
use crate::highlight;
use crate::model::{AnalysisResult, IframeMetrics, NodeMetrics, PerfMetrics, PopupMetrics};
use crate::output;
use crate::popup;
use crate::walker::WalkContext;

pub struct DomAnalyzer {
    config: AnalyzerConfig,
}

impl DomAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the page in one synchronous pass.
    ///
    /// Never propagates: a failure degrades to an envelope with `error`
    /// set and a null root. A missed candidate beats a crash.
    pub fn analyze(&self, page: &mut Page) -> AnalysisResult {
        let started = Instant::now();
        let start_time = Utc::now().timestamp_millis();
        match self.run(page, started, start_time) {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    target: "domlens",
                    error = %err,
                    "dom analysis failed; returning degraded envelope"
                );
                events::emit_analysis(0, 0, 0, true, started.elapsed());
                AnalysisResult::degraded(
                    err.to_string(),
                    close_perf(
                        start_time,
                        started,
                        NodeMetrics::default(),
                        IframeMetrics::default(),
                        PopupMetrics::default(),
                    ),
                )
            }
        }
    }

    fn run(
        &self,
        page: &mut Page,
        started: Instant,
        start_time: i64,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let config = &self.config;
        let frame_rect = page.window.rect();

        let mut ctx = WalkContext::new(config);
        let root_id = ctx
            .walk_document(&page.document, frame_rect, 0)
            .ok_or(AnalyzerError::MissingBody)?;
        events::emit_walk(
            ctx.node_metrics.processed_nodes,
            ctx.candidates.len() as u64,
            ctx.iframe_metrics.total_iframes,
            started.elapsed(),
        );

        let mut survivors =
            filter::filter_candidates(&ctx.candidates, &ctx.parent_of, config.debug_mode);
        events::emit_filter(survivors.len(), ctx.candidates.len() - survivors.len());
        ctx.node_metrics.filtered_interactive_nodes = survivors.len() as u64;

        highlight::assign_indices(&mut ctx.map, &mut survivors);
        if config.do_highlight_elements && !survivors.is_empty() {
            highlight::paint(&mut page.document, &survivors, config.focus_highlight_index)?;
        }

        let (popup_containers, scanned) = popup::detect_popups(&page.document, &ctx.top_ids);
        let popup_metrics = PopupMetrics {
            scanned,
            detected: popup_containers.len() as u64,
        };
        events::emit_popup_scan(scanned, popup_metrics.detected);

        let map = if config.compact_mode {
            output::project_compact(
                &ctx.map,
                &ctx.parent_of,
                &survivors,
                &ctx.iframe_nodes,
                root_id,
            )
        } else {
            ctx.map
        };
        let iframe_nodes = ctx
            .iframe_nodes
            .iter()
            .filter_map(|id| map.get(id).cloned())
            .collect();

        let perf_metrics = close_perf(
            start_time,
            started,
            ctx.node_metrics,
            ctx.iframe_metrics,
            popup_metrics,
        );
        events::emit_analysis(
            perf_metrics.node_metrics.processed_nodes,
            perf_metrics.node_metrics.interactive_nodes,
            perf_metrics.node_metrics.filtered_interactive_nodes,
            false,
            started.elapsed(),
        );

        Ok(AnalysisResult {
            map,
            root_id: Some(root_id),
            iframe_nodes,
            popup_containers,
            perf_metrics,
            compact_mode: config.compact_mode,
            error: None,
        })
    }
}

/// One-shot convenience wrapper.
pub fn analyze(page: &mut Page, config: AnalyzerConfig) -> AnalysisResult {
    DomAnalyzer::new(config).analyze(page)
}

fn close_perf(
    start_time: i64,
    started: Instant,
    node_metrics: NodeMetrics,
    iframe_metrics: IframeMetrics,
    popup_metrics: PopupMetrics,
) -> PerfMetrics {
    PerfMetrics {
        start_time,
        end_time: Utc::now().timestamp_millis(),
        total_time: started.elapsed().as_secs_f64() * 1000.0,
        node_metrics,
        iframe_metrics,
        popup_metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domlens_page::{el, Document, PageBuilder, Window};

    #[test]
    fn missing_body_degrades_instead_of_failing() {
        let mut page = Page::new(Window::new(800.0, 600.0), Document::new());
        let result = analyze(&mut page, AnalyzerConfig::default());
        assert!(result.root_id.is_none());
        assert!(result.map.is_empty());
        assert_eq!(result.error.as_deref(), Some("document has no body element"));
    }

    #[test]
    fn perf_metrics_are_populated() {
        let mut page = PageBuilder::new(800.0, 600.0)
            .child(el("button").rect(0.0, 0.0, 80.0, 24.0).text_child("Go"))
            .build();
        let result = analyze(&mut page, AnalyzerConfig::default());
        let metrics = result.perf_metrics;
        assert!(metrics.end_time >= metrics.start_time);
        assert!(metrics.total_time >= 0.0);
        assert_eq!(metrics.node_metrics.interactive_nodes, 1);
        assert_eq!(metrics.node_metrics.filtered_interactive_nodes, 1);
        assert!(metrics.node_metrics.processed_nodes >= 3);
    }
}
