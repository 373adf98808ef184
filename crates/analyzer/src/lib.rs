//! In-page DOM analysis for LLM-driven browser automation.
//!
//! Given a captured page ([`domlens_page::Page`]) and an
//! [`AnalyzerConfig`], the analyzer walks the rendered tree in one
//! synchronous pass, classifies interactive elements, resolves which
//! are topmost at their own center, prunes nested and overlapping
//! candidates, assigns stable reading-order highlight indices,
//! optionally paints overlay boxes into the document, detects popup
//! containers, and returns a serializable [`AnalysisResult`].

pub mod analyzer;
pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod highlight;
pub mod interactive;
pub mod metrics;
pub mod model;
pub mod topmost;

mod filter;
mod output;
mod popup;
mod walker;

pub use analyzer::{analyze, DomAnalyzer};
pub use config::AnalyzerConfig;
pub use errors::AnalyzerError;
pub use highlight::{HIGHLIGHT_CLASS, HIGHLIGHT_CONTAINER_ID};
pub use model::{
    AnalysisResult, ElementNodeRecord, IframeContent, IframeMetrics, NodeMetrics, NodeRecord,
    PerfMetrics, PopupContainer, PopupMetrics, TextNodeRecord, ViewportRect,
};
