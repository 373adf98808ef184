//! Output records and the result envelope.

use std::collections::BTreeMap;

use domlens_core_types::{NodeId, Rect};
use serde::{Deserialize, Serialize};

/// Element geometry relative to the current viewport, in CSS pixels.
///
/// Plain bounding-client-rect coordinates; scroll offsets are never
/// added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for ViewportRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TextNodeType {
    #[serde(rename = "TEXT_NODE")]
    TextNode,
}

/// Record for a non-empty text node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNodeRecord {
    #[serde(rename = "type")]
    pub node_type: TextNodeType,
    /// Trimmed content, capped at 100 characters.
    pub text: String,
    /// Visibility of the parent element.
    pub is_visible: bool,
    /// Always empty; present for a uniform record shape.
    pub children: Vec<NodeId>,
}

impl TextNodeRecord {
    pub fn new(text: String, is_visible: bool) -> Self {
        Self {
            node_type: TextNodeType::TextNode,
            text,
            is_visible,
            children: Vec::new(),
        }
    }
}

/// How an iframe's content document resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum IframeContent {
    #[serde(rename = "extractable")]
    Extractable,
    #[serde(rename = "cross-origin-blocked")]
    CrossOriginBlocked,
}

/// Record for an element node. Iframe placeholders use the same shape
/// with the `iframe*` fields populated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNodeRecord {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
    pub xpath: String,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub is_top_element: bool,
    pub is_in_viewport: bool,
    /// Reading-order index for surviving candidates, null otherwise.
    pub highlight_index: Option<u32>,
    pub shadow_root: bool,
    pub viewport: ViewportRect,
    pub children: Vec<NodeId>,
    pub text: String,
    pub aria_label: Option<String>,
    pub aria_description: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub is_scrollable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframe_content: Option<IframeContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframe_depth: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRecord {
    Text(TextNodeRecord),
    Element(ElementNodeRecord),
}

impl NodeRecord {
    pub fn as_element(&self) -> Option<&ElementNodeRecord> {
        match self {
            NodeRecord::Element(el) => Some(el),
            NodeRecord::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNodeRecord> {
        match self {
            NodeRecord::Element(el) => Some(el),
            NodeRecord::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNodeRecord> {
        match self {
            NodeRecord::Text(t) => Some(t),
            NodeRecord::Element(_) => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeRecord::Text(t) => &t.children,
            NodeRecord::Element(el) => &el.children,
        }
    }
}

/// Advisory descriptor for a likely modal/overlay region.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupContainer {
    /// NodeId of the matching record, when the element was walked.
    pub node_id: Option<NodeId>,
    pub tag_name: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub z_index: i32,
    pub position: String,
    pub viewport: ViewportRect,
    /// Which heuristic matched (keyword, role or aria-modal).
    pub matched: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    /// Nodes seen by the walker, including skipped ones.
    pub total_nodes: u64,
    /// Records emitted into the map.
    pub processed_nodes: u64,
    pub interactive_nodes: u64,
    pub visible_nodes: u64,
    /// Candidates surviving the nested/overlap filter.
    pub filtered_interactive_nodes: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeMetrics {
    pub total_iframes: u64,
    pub same_origin: u64,
    pub cross_origin: u64,
    /// Same-origin iframes skipped by the depth/count budgets.
    pub skipped: u64,
    pub max_depth_seen: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupMetrics {
    /// Elements examined by the popup scan.
    pub scanned: u64,
    pub detected: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfMetrics {
    /// Wall-clock start, milliseconds since the Unix epoch.
    pub start_time: i64,
    pub end_time: i64,
    /// Total analysis duration in milliseconds.
    pub total_time: f64,
    pub node_metrics: NodeMetrics,
    pub iframe_metrics: IframeMetrics,
    pub popup_metrics: PopupMetrics,
}

/// The analysis envelope returned to the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub map: BTreeMap<NodeId, NodeRecord>,
    pub root_id: Option<NodeId>,
    /// Iframe placeholder records, in discovery order.
    pub iframe_nodes: Vec<NodeRecord>,
    pub popup_containers: Vec<PopupContainer>,
    pub perf_metrics: PerfMetrics,
    pub compact_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// The envelope returned when the top-level pass failed.
    pub fn degraded(error: String, perf_metrics: PerfMetrics) -> Self {
        Self {
            map: BTreeMap::new(),
            root_id: None,
            iframe_nodes: Vec::new(),
            popup_containers: Vec::new(),
            perf_metrics,
            compact_mode: false,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_record_serializes_with_type_tag() {
        let record = NodeRecord::Text(TextNodeRecord::new("Go".into(), true));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "TEXT_NODE",
                "text": "Go",
                "isVisible": true,
                "children": [],
            })
        );
    }

    #[test]
    fn element_record_uses_camel_case_and_null_highlight() {
        let record = ElementNodeRecord {
            tag_name: "button".into(),
            attributes: BTreeMap::new(),
            xpath: "/html/body/button".into(),
            is_visible: true,
            is_interactive: true,
            is_top_element: true,
            is_in_viewport: true,
            highlight_index: None,
            shadow_root: false,
            viewport: ViewportRect::default(),
            children: vec![NodeId(2)],
            text: "Go".into(),
            aria_label: None,
            aria_description: None,
            title: None,
            role: None,
            is_scrollable: false,
            iframe_content: None,
            iframe_depth: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["tagName"], "button");
        assert_eq!(value["highlightIndex"], serde_json::Value::Null);
        assert_eq!(value["children"], json!([2]));
        assert!(value.get("iframeContent").is_none());
    }

    #[test]
    fn untagged_round_trip_distinguishes_variants() {
        let text = NodeRecord::Text(TextNodeRecord::new("hi".into(), false));
        let back: NodeRecord =
            serde_json::from_value(serde_json::to_value(&text).unwrap()).unwrap();
        assert!(back.as_text().is_some());
    }

    #[test]
    fn iframe_content_wire_names() {
        assert_eq!(
            serde_json::to_value(IframeContent::CrossOriginBlocked).unwrap(),
            json!("cross-origin-blocked")
        );
        assert_eq!(
            serde_json::to_value(IframeContent::Extractable).unwrap(),
            json!("extractable")
        );
    }

    #[test]
    fn degraded_envelope_shape() {
        let result = AnalysisResult::degraded("boom".into(), PerfMetrics::default());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rootId"], serde_json::Value::Null);
        assert_eq!(value["error"], "boom");
        assert_eq!(value["map"], json!({}));
    }
}
