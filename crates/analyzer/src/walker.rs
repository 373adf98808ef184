//! Single-pass tree walk producing the node map.
//!
//! All ambient state lives in an explicit [`WalkContext`] threaded
//! through the recursion: the record map, a parent side table (records
//! themselves stay acyclic and cheaply serializable), the candidate
//! list and the metric counters.

use std::collections::{BTreeMap, HashMap};

use domlens_core_types::{NodeId, Rect};
use domlens_page::{Display, Document, ElementData, FrameContent, NodeData, NodeRef, Visibility};

use crate::config::AnalyzerConfig;
use crate::geometry::{is_in_viewport, is_visible};
use crate::highlight::HIGHLIGHT_CONTAINER_ID;
use crate::interactive::is_interactive;
use crate::model::{
    ElementNodeRecord, IframeContent, IframeMetrics, NodeMetrics, NodeRecord, TextNodeRecord,
};
use crate::topmost::is_top_element;

/// Tags skipped entirely: not emitted, not recursed into.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "meta", "link", "head", "br", "hr"];

const MAX_TEXT_LEN: usize = 100;
const MAX_SRC_LEN: usize = 200;

/// Interactive element that passed the visibility + viewport gate.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub node_id: NodeId,
    pub rect: Rect,
    pub is_top: bool,
    pub tag: String,
    pub role: Option<String>,
}

impl Candidate {
    pub fn area(&self) -> f64 {
        self.rect.area()
    }
}

pub(crate) struct WalkContext<'a> {
    config: &'a AnalyzerConfig,
    pub map: BTreeMap<NodeId, NodeRecord>,
    pub parent_of: HashMap<NodeId, NodeId>,
    pub candidates: Vec<Candidate>,
    /// Iframe placeholder ids in discovery order.
    pub iframe_nodes: Vec<NodeId>,
    /// NodeRef -> NodeId for the top document only (popup scan lookup).
    pub top_ids: HashMap<NodeRef, NodeId>,
    pub node_metrics: NodeMetrics,
    pub iframe_metrics: IframeMetrics,
    next_id: u32,
    iframe_count: u32,
}

impl<'a> WalkContext<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            map: BTreeMap::new(),
            parent_of: HashMap::new(),
            candidates: Vec::new(),
            iframe_nodes: Vec::new(),
            top_ids: HashMap::new(),
            node_metrics: NodeMetrics::default(),
            iframe_metrics: IframeMetrics::default(),
            next_id: 1,
            iframe_count: 0,
        }
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Walk one document: its body subtree first, then its iframes.
    /// Returns the NodeId of the body record, or None without a body.
    pub fn walk_document(&mut self, doc: &Document, frame_rect: Rect, depth: u32) -> Option<NodeId> {
        let body = doc.body()?;
        let mut iframes = Vec::new();
        let root_id = self.visit(doc, body, None, true, &frame_rect, depth, &mut iframes);
        for (iframe_ref, iframe_id) in iframes {
            self.process_iframe(doc, iframe_ref, iframe_id, depth);
        }
        root_id
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &mut self,
        doc: &Document,
        r: NodeRef,
        parent_id: Option<NodeId>,
        parent_visible: bool,
        frame_rect: &Rect,
        depth: u32,
        iframes: &mut Vec<(NodeRef, NodeId)>,
    ) -> Option<NodeId> {
        self.node_metrics.total_nodes += 1;
        match doc.data(r) {
            NodeData::Text(t) => {
                let trimmed = t.text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let id = self.alloc();
                self.map.insert(
                    id,
                    NodeRecord::Text(TextNodeRecord::new(truncate(trimmed), parent_visible)),
                );
                if let Some(pid) = parent_id {
                    self.parent_of.insert(id, pid);
                }
                self.node_metrics.processed_nodes += 1;
                Some(id)
            }
            NodeData::Element(el) => self.visit_element(doc, r, el, parent_id, frame_rect, depth, iframes),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_element(
        &mut self,
        doc: &Document,
        r: NodeRef,
        el: &ElementData,
        parent_id: Option<NodeId>,
        frame_rect: &Rect,
        depth: u32,
        iframes: &mut Vec<(NodeRef, NodeId)>,
    ) -> Option<NodeId> {
        let tag = el.tag.as_str();
        if SKIPPED_TAGS.contains(&tag) {
            return None;
        }
        // Never re-walk our own overlay from a previous invocation.
        if el.attr("id") == Some(HIGHLIGHT_CONTAINER_ID) {
            return None;
        }

        let is_iframe = tag == "iframe";
        let frame_state = if is_iframe {
            match el.frame {
                Some(FrameContent::SameOrigin(_)) => Some(IframeContent::Extractable),
                _ => Some(IframeContent::CrossOriginBlocked),
            }
        } else {
            None
        };
        if frame_state == Some(IframeContent::CrossOriginBlocked)
            && !self.config.include_cross_origin_iframes
        {
            return None;
        }

        let visible = is_visible(doc, r);
        let interactive = is_interactive(doc, r);
        let expansion = f64::from(self.config.viewport_expansion);
        let in_viewport = is_in_viewport(&el.rect, frame_rect, expansion);
        let top = is_top_element(doc, r, frame_rect);

        let id = self.alloc();
        if depth == 0 {
            self.top_ids.insert(r, id);
        }
        if let Some(pid) = parent_id {
            self.parent_of.insert(id, pid);
        }

        let attributes = if is_iframe {
            iframe_attributes(el, frame_state)
        } else {
            filtered_attributes(el)
        };
        let record = ElementNodeRecord {
            tag_name: el.tag.clone(),
            attributes,
            xpath: build_xpath(doc, r),
            is_visible: visible,
            is_interactive: interactive,
            is_top_element: top,
            is_in_viewport: in_viewport,
            highlight_index: None,
            shadow_root: doc.has_shadow_root(r),
            viewport: el.rect.into(),
            children: Vec::new(),
            text: element_text(doc, r, el, interactive),
            aria_label: attr_owned(el, "aria-label"),
            aria_description: attr_owned(el, "aria-description"),
            title: attr_owned(el, "title"),
            role: attr_owned(el, "role"),
            is_scrollable: is_scrollable(el),
            iframe_content: frame_state,
            iframe_depth: if is_iframe { Some(depth) } else { None },
        };
        self.map.insert(id, NodeRecord::Element(record));
        self.node_metrics.processed_nodes += 1;
        if visible {
            self.node_metrics.visible_nodes += 1;
        }
        if interactive {
            self.node_metrics.interactive_nodes += 1;
        }
        if interactive && visible && (in_viewport || self.config.viewport_expansion > 0) {
            self.candidates.push(Candidate {
                node_id: id,
                rect: el.rect,
                is_top: top,
                tag: el.tag.clone(),
                role: attr_owned(el, "role"),
            });
        }

        if is_iframe {
            self.iframe_nodes.push(id);
            iframes.push((r, id));
        } else {
            let mut kids = Vec::new();
            for &c in doc.children(r) {
                if let Some(cid) = self.visit(doc, c, Some(id), visible, frame_rect, depth, iframes)
                {
                    kids.push(cid);
                }
            }
            for &c in doc.shadow_children(r) {
                if let Some(cid) = self.visit(doc, c, Some(id), visible, frame_rect, depth, iframes)
                {
                    kids.push(cid);
                }
            }
            if let Some(NodeRecord::Element(rec)) = self.map.get_mut(&id) {
                rec.children = kids;
            }
        }
        Some(id)
    }

    fn process_iframe(&mut self, doc: &Document, iframe_ref: NodeRef, iframe_id: NodeId, depth: u32) {
        self.iframe_metrics.total_iframes += 1;
        match doc.frame_content(iframe_ref) {
            Some(FrameContent::SameOrigin(inner)) => {
                if self.iframe_count >= self.config.max_iframes
                    || depth + 1 > self.config.max_iframe_depth
                {
                    self.iframe_metrics.skipped += 1;
                    return;
                }
                self.iframe_count += 1;
                self.iframe_metrics.same_origin += 1;
                if depth + 1 > self.iframe_metrics.max_depth_seen {
                    self.iframe_metrics.max_depth_seen = depth + 1;
                }
                let rect = doc
                    .element(iframe_ref)
                    .map(|el| el.rect)
                    .unwrap_or_default();
                let inner_rect = Rect::new(0.0, 0.0, rect.width, rect.height);
                if let Some(inner_root) = self.walk_document(inner, inner_rect, depth + 1) {
                    if let Some(NodeRecord::Element(rec)) = self.map.get_mut(&iframe_id) {
                        rec.children.push(inner_root);
                    }
                    self.parent_of.insert(inner_root, iframe_id);
                }
            }
            _ => {
                self.iframe_metrics.cross_origin += 1;
            }
        }
    }
}

fn attr_owned(el: &ElementData, name: &str) -> Option<String> {
    el.attr(name).map(|v| v.to_string())
}

/// Framework-internal noise is stripped; everything else is retained
/// verbatim.
fn filtered_attributes(el: &ElementData) -> BTreeMap<String, String> {
    el.attributes
        .iter()
        .filter(|(k, _)| {
            k != "style"
                && !k.starts_with("data-reactid")
                && !k.starts_with("data-reactroot")
                && !k.starts_with("ng-")
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Iframe placeholders carry a curated attribute set.
fn iframe_attributes(el: &ElementData, state: Option<IframeContent>) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    if let Some(src) = el.attr("src") {
        attrs.insert("src".to_string(), truncate_to(src, MAX_SRC_LEN));
    }
    let kind = match state {
        Some(IframeContent::Extractable) => "same-origin",
        _ => "cross-origin",
    };
    attrs.insert("data-iframe-type".to_string(), kind.to_string());
    for key in ["title", "aria-label", "name", "id"] {
        if let Some(value) = el.attr(key) {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
    attrs
}

fn is_scrollable(el: &ElementData) -> bool {
    let overflow_content = el.scroll_height > el.client_height + 1.0
        || el.scroll_width > el.client_width + 1.0;
    if !overflow_content {
        return false;
    }
    if matches!(el.tag.as_str(), "body" | "html") {
        return true;
    }
    el.style.overflow_x.is_scroll_container() || el.style.overflow_y.is_scroll_container()
}

fn truncate(s: &str) -> String {
    truncate_to(s, MAX_TEXT_LEN)
}

fn truncate_to(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

fn element_text(doc: &Document, r: NodeRef, el: &ElementData, interactive: bool) -> String {
    let raw = if interactive {
        let mut text = inner_text(doc, r);
        if text.is_empty() {
            text = text_content(doc, r);
        }
        // Form controls rarely carry text nodes; reuse the
        // element-specific fallback so inputs still label themselves.
        if text.is_empty() {
            text = fallback_text(doc, r, el);
        }
        text
    } else {
        let text = direct_child_text(doc, r);
        if text.is_empty() {
            fallback_text(doc, r, el)
        } else {
            text
        }
    };
    truncate(raw.trim())
}

/// Rendered text approximation: descendant text outside hidden subtrees.
fn inner_text(doc: &Document, r: NodeRef) -> String {
    let mut parts = Vec::new();
    gather_visible_text(doc, r, &mut parts);
    parts.join(" ")
}

fn gather_visible_text(doc: &Document, r: NodeRef, out: &mut Vec<String>) {
    for &c in doc.children(r).iter().chain(doc.shadow_children(r)) {
        if let Some(text) = doc.text(c) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(collapse_ws(trimmed));
            }
        } else if let Some(el) = doc.element(c) {
            if el.style.display == Display::None || el.style.visibility != Visibility::Visible {
                continue;
            }
            gather_visible_text(doc, c, out);
        }
    }
}

fn text_content(doc: &Document, r: NodeRef) -> String {
    let mut raw = String::new();
    for node in doc.subtree(r) {
        if let Some(text) = doc.text(node) {
            raw.push_str(text);
            raw.push(' ');
        }
    }
    collapse_ws(raw.trim())
}

fn direct_child_text(doc: &Document, r: NodeRef) -> String {
    let parts: Vec<String> = doc
        .children(r)
        .iter()
        .filter_map(|&c| doc.text(c))
        .map(|t| collapse_ws(t.trim()))
        .filter(|t| !t.is_empty())
        .collect();
    parts.join(" ")
}

/// Element-specific fallback text for mute containers.
fn fallback_text(doc: &Document, r: NodeRef, el: &ElementData) -> String {
    match el.tag.as_str() {
        "input" => el
            .value
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| attr_owned(el, "value"))
            .or_else(|| attr_owned(el, "placeholder"))
            .unwrap_or_default(),
        "textarea" => el
            .value
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| attr_owned(el, "placeholder"))
            .unwrap_or_default(),
        "select" => doc
            .subtree(r)
            .into_iter()
            .find(|&n| doc.tag(n) == Some("option") && doc.element(n).is_some_and(|o| o.selected))
            .map(|option| direct_child_text(doc, option))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `/html/body/div[2]/a` style path; collapses at the nearest ancestor
/// carrying an id.
fn build_xpath(doc: &Document, r: NodeRef) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut prefix: Option<String> = None;
    let mut cur = Some(r);
    while let Some(node) = cur {
        let el = match doc.element(node) {
            Some(el) => el,
            None => break,
        };
        if let Some(id) = el.attr("id") {
            prefix = Some(format!("//*[@id=\"{id}\"]"));
            break;
        }
        segments.push(xpath_segment(doc, node, &el.tag));
        cur = doc.parent(node);
    }
    segments.reverse();
    match prefix {
        Some(p) if segments.is_empty() => p,
        Some(p) => format!("{}/{}", p, segments.join("/")),
        None => format!("/{}", segments.join("/")),
    }
}

fn xpath_segment(doc: &Document, node: NodeRef, tag: &str) -> String {
    let parent = match doc.parent(node) {
        Some(p) => p,
        None => return tag.to_string(),
    };
    let light = doc.children(parent);
    let list: &[NodeRef] = if light.contains(&node) {
        light
    } else {
        doc.shadow_children(parent)
    };
    let same_tag: Vec<NodeRef> = list
        .iter()
        .copied()
        .filter(|&s| doc.tag(s) == Some(tag))
        .collect();
    if same_tag.len() > 1 {
        let position = 1 + same_tag.iter().take_while(|&&s| s != node).count();
        format!("{tag}[{position}]")
    } else {
        tag.to_string()
    }
}
