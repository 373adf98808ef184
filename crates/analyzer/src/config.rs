use serde::{Deserialize, Serialize};

/// Analyzer configuration.
///
/// Field names serialize in camelCase so hosts can hand over the same
/// JSON object they would pass to an injected in-page script.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Paint overlay boxes over the surviving top candidates.
    pub do_highlight_elements: bool,
    /// Highlight index rendered with the focused treatment, -1 for none.
    pub focus_highlight_index: i32,
    /// Pixels to expand the viewport rectangle used by the in-viewport
    /// test. Negative values shrink it. Any non-zero positive value also
    /// admits off-viewport candidates (see the walker).
    pub viewport_expansion: i32,
    /// Emit the candidate filtering table at debug level.
    pub debug_mode: bool,
    /// Maximum iframe nesting depth to descend into.
    pub max_iframe_depth: u32,
    /// Global cap on processed same-origin iframes.
    pub max_iframes: u32,
    /// Emit placeholder records for iframes whose document is unreadable.
    pub include_cross_origin_iframes: bool,
    /// Project the output map down to candidates, their ancestors,
    /// iframe placeholders and the root.
    pub compact_mode: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            do_highlight_elements: true,
            focus_highlight_index: -1,
            viewport_expansion: 0,
            debug_mode: false,
            max_iframe_depth: 5,
            max_iframes: 100,
            include_cross_origin_iframes: true,
            compact_mode: false,
        }
    }
}
