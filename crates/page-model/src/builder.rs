//! Fluent construction of captured pages.
//!
//! Primarily test support: scenario pages are described as a tree of
//! [`ElementSpec`]s and realized into the arena in document order.

use domlens_core_types::Rect;

use crate::document::{Document, FrameContent, NodeRef};
use crate::page::Page;
use crate::style::{
    ComputedStyle, Cursor, Display, Overflow, PointerEvents, Position, Visibility, ZIndex,
};
use crate::window::Window;

/// Rect given to elements that do not set one explicitly. Non-empty so
/// that fixtures are visible unless a test hides them on purpose.
const DEFAULT_RECT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 100.0,
    height: 24.0,
};

/// Start an element spec.
pub fn el(tag: &str) -> ElementSpec {
    ElementSpec::new(tag)
}

#[derive(Debug)]
enum ChildSpec {
    Element(ElementSpec),
    Text(String),
}

#[derive(Debug)]
enum FrameSpec {
    SameOrigin {
        width: f64,
        height: f64,
        children: Vec<ElementSpec>,
    },
    CrossOrigin,
}

#[derive(Debug)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    style: ComputedStyle,
    rect: Option<Rect>,
    client: Option<(f64, f64)>,
    scroll: Option<(f64, f64)>,
    has_offset_parent: bool,
    value: Option<String>,
    selected: bool,
    children: Vec<ChildSpec>,
    shadow: Vec<ElementSpec>,
    frame: Option<FrameSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            style: ComputedStyle::default(),
            rect: None,
            client: None,
            scroll: None,
            has_offset_parent: true,
            value: None,
            selected: false,
            children: Vec::new(),
            shadow: Vec::new(),
            frame: None,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Some(Rect::new(x, y, width, height));
        self
    }

    pub fn display_none(mut self) -> Self {
        self.style.display = Display::None;
        self
    }

    pub fn visibility_hidden(mut self) -> Self {
        self.style.visibility = Visibility::Hidden;
        self
    }

    pub fn visibility_collapse(mut self) -> Self {
        self.style.visibility = Visibility::Collapse;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.style.position = position;
        self
    }

    pub fn z_index(mut self, z: i32) -> Self {
        self.style.z_index = ZIndex::Value(z);
        self
    }

    pub fn pointer_events_none(mut self) -> Self {
        self.style.pointer_events = PointerEvents::None;
        self
    }

    pub fn cursor_pointer(mut self) -> Self {
        self.style.cursor = Cursor::Pointer;
        self
    }

    pub fn overflow_x(mut self, overflow: Overflow) -> Self {
        self.style.overflow_x = overflow;
        self
    }

    pub fn overflow_y(mut self, overflow: Overflow) -> Self {
        self.style.overflow_y = overflow;
        self
    }

    pub fn no_offset_parent(mut self) -> Self {
        self.has_offset_parent = false;
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn client(mut self, width: f64, height: f64) -> Self {
        self.client = Some((width, height));
        self
    }

    pub fn scroll_extent(mut self, width: f64, height: f64) -> Self {
        self.scroll = Some((width, height));
        self
    }

    pub fn child(mut self, spec: ElementSpec) -> Self {
        self.children.push(ChildSpec::Element(spec));
        self
    }

    pub fn text_child(mut self, text: &str) -> Self {
        self.children.push(ChildSpec::Text(text.to_string()));
        self
    }

    pub fn shadow_child(mut self, spec: ElementSpec) -> Self {
        self.shadow.push(spec);
        self
    }

    pub fn same_origin_frame(
        mut self,
        width: f64,
        height: f64,
        children: Vec<ElementSpec>,
    ) -> Self {
        self.frame = Some(FrameSpec::SameOrigin {
            width,
            height,
            children,
        });
        self
    }

    pub fn cross_origin_frame(mut self) -> Self {
        self.frame = Some(FrameSpec::CrossOrigin);
        self
    }
}

#[derive(Debug)]
pub struct PageBuilder {
    width: f64,
    height: f64,
    scroll_x: f64,
    scroll_y: f64,
    body_scroll: Option<(f64, f64)>,
    children: Vec<ElementSpec>,
}

impl PageBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            body_scroll: None,
            children: Vec::new(),
        }
    }

    pub fn scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    /// Make the `<body>` overflow its client box (scrollable page).
    pub fn body_scroll_extent(mut self, width: f64, height: f64) -> Self {
        self.body_scroll = Some((width, height));
        self
    }

    pub fn child(mut self, spec: ElementSpec) -> Self {
        self.children.push(spec);
        self
    }

    pub fn build(self) -> Page {
        let window = Window {
            inner_width: self.width,
            inner_height: self.height,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        };
        let document = build_document(self.width, self.height, self.body_scroll, self.children);
        Page::new(window, document)
    }
}

fn build_document(
    width: f64,
    height: f64,
    body_scroll: Option<(f64, f64)>,
    children: Vec<ElementSpec>,
) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    {
        let html = doc.element_mut(root).expect("root is an element");
        html.rect = Rect::new(0.0, 0.0, width, height);
        html.client_width = width;
        html.client_height = height;
        html.scroll_width = width;
        html.scroll_height = height;
        html.has_offset_parent = false;
    }
    let body = doc.create_element("body");
    {
        let el = doc.element_mut(body).expect("body is an element");
        el.rect = Rect::new(0.0, 0.0, width, height);
        el.client_width = width;
        el.client_height = height;
        let (sw, sh) = body_scroll.unwrap_or((width, height));
        el.scroll_width = sw;
        el.scroll_height = sh;
        el.has_offset_parent = false;
    }
    doc.append_child(root, body).expect("fresh body attaches");
    for spec in children {
        let child = instantiate(&mut doc, spec);
        doc.append_child(body, child).expect("fresh child attaches");
    }
    doc
}

fn instantiate(doc: &mut Document, spec: ElementSpec) -> NodeRef {
    let r = doc.create_element(&spec.tag);
    {
        let el = doc.element_mut(r).expect("just created element");
        el.attributes = spec.attrs;
        el.style = spec.style;
        let rect = spec.rect.unwrap_or(DEFAULT_RECT);
        el.rect = rect;
        let (cw, ch) = spec.client.unwrap_or((rect.width, rect.height));
        el.client_width = cw;
        el.client_height = ch;
        let (sw, sh) = spec.scroll.unwrap_or((cw, ch));
        el.scroll_width = sw;
        el.scroll_height = sh;
        el.has_offset_parent = spec.has_offset_parent;
        el.value = spec.value;
        el.selected = spec.selected;
        el.frame = spec.frame.map(|frame| match frame {
            FrameSpec::SameOrigin {
                width,
                height,
                children,
            } => FrameContent::SameOrigin(Box::new(build_document(width, height, None, children))),
            FrameSpec::CrossOrigin => FrameContent::CrossOriginBlocked,
        });
    }
    for child in spec.children {
        match child {
            ChildSpec::Element(c) => {
                let node = instantiate(doc, c);
                doc.append_child(r, node).expect("fresh child attaches");
            }
            ChildSpec::Text(t) => {
                let node = doc.create_text(&t);
                doc.append_child(r, node).expect("fresh text attaches");
            }
        }
    }
    for shadow in spec.shadow {
        let node = instantiate(doc, shadow);
        doc.attach_shadow_child(r, node)
            .expect("fresh shadow child attaches");
    }
    r
}
