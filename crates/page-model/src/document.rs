//! Arena-backed captured document.
//!
//! Nodes live in a flat `Vec`; `NodeRef` handles are indices into it.
//! Arena order equals creation order, which the builders keep aligned
//! with document order, so `NodeRef::index` doubles as a document-order
//! tiebreaker for hit testing.

use domlens_core_types::Rect;

use crate::errors::PageError;
use crate::style::{ComputedStyle, Display, PointerEvents, Visibility};

/// Handle to a node inside one [`Document`] arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What an `<iframe>` element resolved to at capture time.
#[derive(Debug)]
pub enum FrameContent {
    /// Same-origin frame whose document could be read.
    SameOrigin(Box<Document>),
    /// The host could not read `contentDocument`.
    CrossOriginBlocked,
}

#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub style: ComputedStyle,
    /// Bounding client rect, viewport-relative.
    pub rect: Rect,
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    /// Whether the host reported a non-null `offsetParent`.
    pub has_offset_parent: bool,
    /// Current value of a form control, if any.
    pub value: Option<String>,
    /// `<option>` selection state.
    pub selected: bool,
    pub frame: Option<FrameContent>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: ComputedStyle::default(),
            rect: Rect::default(),
            client_width: 0.0,
            client_height: 0.0,
            scroll_width: 0.0,
            scroll_height: 0.0,
            has_offset_parent: true,
            value: None,
            selected: false,
            frame: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(TextData),
}

#[derive(Debug)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
    shadow_children: Vec<NodeRef>,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeRef,
}

impl Document {
    /// Create a document with an empty `<html>` root element.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeRef(0),
        };
        let root = doc.create_element("html");
        doc.root = root;
        doc
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeRef {
        self.push(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeRef {
        self.push(NodeData::Text(TextData {
            text: text.to_string(),
        }))
    }

    fn push(&mut self, data: NodeData) -> NodeRef {
        let r = NodeRef(self.nodes.len());
        self.nodes.push(NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
            shadow_children: Vec::new(),
        });
        r
    }

    pub fn append_child(&mut self, parent: NodeRef, child: NodeRef) -> Result<(), PageError> {
        if !self.is_element(parent) {
            return Err(PageError::NotAnElement);
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(PageError::AlreadyAttached);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(PageError::CycleDetected);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Attach `child` under `host`'s shadow root. The host is the
    /// parent for ancestry purposes.
    pub fn attach_shadow_child(&mut self, host: NodeRef, child: NodeRef) -> Result<(), PageError> {
        if !self.is_element(host) {
            return Err(PageError::NotAnElement);
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(PageError::AlreadyAttached);
        }
        if child == host || self.is_ancestor(child, host) {
            return Err(PageError::CycleDetected);
        }
        self.nodes[child.0].parent = Some(host);
        self.nodes[host.0].shadow_children.push(child);
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        el: NodeRef,
        name: &str,
        value: &str,
    ) -> Result<(), PageError> {
        let data = self.element_mut(el).ok_or(PageError::NotAnElement)?;
        if let Some(entry) = data.attributes.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            data.attributes.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }

    pub fn data(&self, r: NodeRef) -> &NodeData {
        &self.nodes[r.0].data
    }

    pub fn element(&self, r: NodeRef) -> Option<&ElementData> {
        match &self.nodes[r.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, r: NodeRef) -> Option<&mut ElementData> {
        match &mut self.nodes[r.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, r: NodeRef) -> bool {
        matches!(self.nodes[r.0].data, NodeData::Element(_))
    }

    pub fn is_text(&self, r: NodeRef) -> bool {
        matches!(self.nodes[r.0].data, NodeData::Text(_))
    }

    pub fn tag(&self, r: NodeRef) -> Option<&str> {
        self.element(r).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, r: NodeRef, name: &str) -> Option<&str> {
        self.element(r).and_then(|el| el.attr(name))
    }

    pub fn text(&self, r: NodeRef) -> Option<&str> {
        match &self.nodes[r.0].data {
            NodeData::Text(t) => Some(t.text.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn parent(&self, r: NodeRef) -> Option<NodeRef> {
        self.nodes[r.0].parent
    }

    pub fn children(&self, r: NodeRef) -> &[NodeRef] {
        &self.nodes[r.0].children
    }

    pub fn shadow_children(&self, r: NodeRef) -> &[NodeRef] {
        &self.nodes[r.0].shadow_children
    }

    pub fn has_shadow_root(&self, r: NodeRef) -> bool {
        !self.nodes[r.0].shadow_children.is_empty()
    }

    pub fn frame_content(&self, r: NodeRef) -> Option<&FrameContent> {
        self.element(r).and_then(|el| el.frame.as_ref())
    }

    /// The `<body>` element, if present under the root.
    pub fn body(&self) -> Option<NodeRef> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == Some("body"))
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        (0..self.nodes.len())
            .map(NodeRef)
            .find(|&r| self.attr(r, "id") == Some(id))
    }

    pub fn depth(&self, r: NodeRef) -> usize {
        let mut depth = 0;
        let mut cur = r;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        depth
    }

    /// Whether `ancestor` strictly contains `node` (light or shadow tree).
    pub fn is_ancestor(&self, ancestor: NodeRef, node: NodeRef) -> bool {
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Pre-order traversal of `r` and its subtree, light children before
    /// shadow children. Frame content documents are separate arenas and
    /// are never included.
    pub fn subtree(&self, r: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack = vec![r];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            let slot = &self.nodes[cur.0];
            for &c in slot
                .shadow_children
                .iter()
                .rev()
                .chain(slot.children.iter().rev())
            {
                stack.push(c);
            }
        }
        out
    }

    /// Paint-order hit test: the topmost element whose rect contains the
    /// point. Ranking key is (effective z-index, tree depth, document
    /// order); `display:none` subtrees, hidden and pointer-events-none
    /// elements never hit.
    pub fn element_from_point(&self, x: f64, y: f64) -> Option<NodeRef> {
        let mut best: Option<(i32, usize, usize)> = None;
        let mut winner = None;
        self.hit_visit(self.root, 0, 0, x, y, &mut best, &mut winner);
        winner
    }

    #[allow(clippy::too_many_arguments)]
    fn hit_visit(
        &self,
        r: NodeRef,
        depth: usize,
        inherited_z: i32,
        x: f64,
        y: f64,
        best: &mut Option<(i32, usize, usize)>,
        winner: &mut Option<NodeRef>,
    ) {
        let el = match self.element(r) {
            Some(el) => el,
            None => return,
        };
        if el.style.display == Display::None {
            return;
        }
        let z = match (el.style.position.is_positioned(), el.style.z_index.numeric()) {
            (true, Some(z)) => z,
            _ => inherited_z,
        };
        let hittable = el.style.visibility == Visibility::Visible
            && el.style.pointer_events == PointerEvents::Auto
            && !el.rect.is_empty()
            && el.rect.contains_point(x, y);
        if hittable {
            let key = (z, depth, r.0);
            if best.map_or(true, |b| key > b) {
                *best = Some(key);
                *winner = Some(r);
            }
        }
        let slot = &self.nodes[r.0];
        for &c in slot.children.iter().chain(slot.shadow_children.iter()) {
            self.hit_visit(c, depth + 1, z, x, y, best, winner);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Position, ZIndex};

    fn positioned(doc: &mut Document, tag: &str, rect: Rect, z: i32) -> NodeRef {
        let r = doc.create_element(tag);
        let el = doc.element_mut(r).unwrap();
        el.rect = rect;
        el.style.position = Position::Fixed;
        el.style.z_index = ZIndex::Value(z);
        r
    }

    #[test]
    fn append_and_ancestry() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        let div = doc.create_element("div");
        doc.append_child(doc.root(), body).unwrap();
        doc.append_child(body, div).unwrap();
        assert!(doc.is_ancestor(doc.root(), div));
        assert!(doc.is_ancestor(body, div));
        assert!(!doc.is_ancestor(div, body));
        assert_eq!(doc.body(), Some(body));
        assert_eq!(doc.depth(div), 2);
    }

    #[test]
    fn append_rejects_cycles_and_reattachment() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.append_child(doc.root(), body).unwrap();
        assert!(matches!(
            doc.append_child(body, doc.root()),
            Err(PageError::CycleDetected)
        ));
        assert!(matches!(
            doc.append_child(doc.root(), body),
            Err(PageError::AlreadyAttached)
        ));
    }

    #[test]
    fn set_attribute_replaces_existing() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "class", "a").unwrap();
        doc.set_attribute(div, "class", "b").unwrap();
        assert_eq!(doc.attr(div, "class"), Some("b"));
        assert_eq!(doc.element(div).unwrap().attributes.len(), 1);
    }

    #[test]
    fn subtree_is_preorder_with_shadow_after_light() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        let host = doc.create_element("div");
        let light = doc.create_element("span");
        let shadow = doc.create_element("button");
        doc.append_child(doc.root(), body).unwrap();
        doc.append_child(body, host).unwrap();
        doc.append_child(host, light).unwrap();
        doc.attach_shadow_child(host, shadow).unwrap();
        let order = doc.subtree(body);
        assert_eq!(order, vec![body, host, light, shadow]);
        assert!(doc.has_shadow_root(host));
        assert_eq!(doc.parent(shadow), Some(host));
    }

    #[test]
    fn hit_test_prefers_higher_z_then_depth() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.element_mut(body).unwrap().rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        doc.append_child(doc.root(), body).unwrap();

        let low = positioned(&mut doc, "div", Rect::new(0.0, 0.0, 200.0, 200.0), 1);
        let high = positioned(&mut doc, "div", Rect::new(0.0, 0.0, 200.0, 200.0), 10);
        let inner = doc.create_element("button");
        doc.element_mut(inner).unwrap().rect = Rect::new(50.0, 50.0, 50.0, 20.0);
        doc.append_child(body, low).unwrap();
        doc.append_child(body, high).unwrap();
        doc.append_child(high, inner).unwrap();

        assert_eq!(doc.element_from_point(60.0, 60.0), Some(inner));
        assert_eq!(doc.element_from_point(10.0, 10.0), Some(high));
    }

    #[test]
    fn hit_test_skips_hidden_and_pointer_events_none() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.element_mut(body).unwrap().rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        doc.append_child(doc.root(), body).unwrap();

        let blocked = positioned(&mut doc, "div", Rect::new(0.0, 0.0, 200.0, 200.0), 10);
        doc.element_mut(blocked).unwrap().style.pointer_events = PointerEvents::None;
        doc.append_child(body, blocked).unwrap();

        let hidden = positioned(&mut doc, "div", Rect::new(0.0, 0.0, 200.0, 200.0), 5);
        doc.element_mut(hidden).unwrap().style.visibility = Visibility::Hidden;
        doc.append_child(body, hidden).unwrap();

        assert_eq!(doc.element_from_point(10.0, 10.0), Some(body));
    }

    #[test]
    fn hit_test_skips_display_none_subtree() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.element_mut(body).unwrap().rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        doc.append_child(doc.root(), body).unwrap();

        let gone = positioned(&mut doc, "div", Rect::new(0.0, 0.0, 200.0, 200.0), 10);
        doc.element_mut(gone).unwrap().style.display = Display::None;
        let child = positioned(&mut doc, "button", Rect::new(0.0, 0.0, 100.0, 100.0), 20);
        doc.append_child(body, gone).unwrap();
        doc.append_child(gone, child).unwrap();

        assert_eq!(doc.element_from_point(10.0, 10.0), Some(body));
    }
}
