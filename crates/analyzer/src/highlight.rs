//! Reading-order index assignment and overlay painting.

use std::collections::BTreeMap;

use domlens_core_types::NodeId;
use domlens_page::{Cursor, Document, NodeRef, PointerEvents, Position, ZIndex};

use crate::errors::AnalyzerError;
use crate::model::NodeRecord;
use crate::walker::Candidate;

/// Singleton overlay root. Never removed by the analyzer; callers are
/// expected to clean it up.
pub const HIGHLIGHT_CONTAINER_ID: &str = "browser-use-highlight-container";
pub const HIGHLIGHT_CLASS: &str = "browser-use-highlight";

const OVERLAY_Z_INDEX: i32 = 2147483647;

/// Rows within this many pixels of each other sort as one row.
const ROW_TOLERANCE: f64 = 5.0;

/// Sort survivors into reading order and stamp `highlightIndex` (and the
/// candidate's top-at-point verdict) onto their map records.
pub(crate) fn assign_indices(map: &mut BTreeMap<NodeId, NodeRecord>, survivors: &mut [Candidate]) {
    survivors.sort_by(|a, b| {
        let row_a = (a.rect.y / ROW_TOLERANCE).round() as i64;
        let row_b = (b.rect.y / ROW_TOLERANCE).round() as i64;
        row_a
            .cmp(&row_b)
            .then(a.rect.x.total_cmp(&b.rect.x))
            .then(a.node_id.cmp(&b.node_id))
    });
    for (index, candidate) in survivors.iter().enumerate() {
        if let Some(NodeRecord::Element(rec)) = map.get_mut(&candidate.node_id) {
            rec.highlight_index = Some(index as u32);
            rec.is_top_element = candidate.is_top;
        }
    }
}

/// Paint overlay boxes for the topmost survivors into the document.
pub(crate) fn paint(
    doc: &mut Document,
    survivors: &[Candidate],
    focus_index: i32,
) -> Result<(), AnalyzerError> {
    let container = ensure_container(doc)?;
    for (index, candidate) in survivors.iter().enumerate() {
        if !candidate.is_top {
            continue;
        }
        let focused = focus_index >= 0 && index as i32 == focus_index;
        let overlay = make_overlay(doc, candidate, index, focused)?;
        doc.append_child(container, overlay)?;
    }
    Ok(())
}

fn ensure_container(doc: &mut Document) -> Result<NodeRef, AnalyzerError> {
    if let Some(existing) = doc.element_by_id(HIGHLIGHT_CONTAINER_ID) {
        return Ok(existing);
    }
    let body = doc.body().ok_or(AnalyzerError::MissingBody)?;
    let container = doc.create_element("div");
    doc.set_attribute(container, "id", HIGHLIGHT_CONTAINER_ID)?;
    doc.set_attribute(
        container,
        "style",
        "position:fixed;top:0;left:0;width:100%;height:100%;pointer-events:none;z-index:2147483647;",
    )?;
    if let Some(el) = doc.element_mut(container) {
        el.style.position = Position::Fixed;
        el.style.z_index = ZIndex::Value(OVERLAY_Z_INDEX);
        el.style.pointer_events = PointerEvents::None;
    }
    doc.append_child(body, container)?;
    Ok(container)
}

fn make_overlay(
    doc: &mut Document,
    candidate: &Candidate,
    index: usize,
    focused: bool,
) -> Result<NodeRef, AnalyzerError> {
    let rect = candidate.rect;
    let color = color_for_tag(&candidate.tag);
    let border = if focused {
        format!("border:3px solid {color};background-color:{color}22;")
    } else {
        format!("border:2px dashed {color};")
    };
    let overlay = doc.create_element("div");
    doc.set_attribute(overlay, "class", HIGHLIGHT_CLASS)?;
    doc.set_attribute(overlay, "data-highlight-index", &index.to_string())?;
    doc.set_attribute(
        overlay,
        "style",
        &format!(
            "position:fixed;left:{}px;top:{}px;width:{}px;height:{}px;{}box-sizing:border-box;pointer-events:none;",
            rect.x, rect.y, rect.width, rect.height, border
        ),
    )?;
    if let Some(el) = doc.element_mut(overlay) {
        el.rect = rect;
        el.style.position = Position::Fixed;
        el.style.z_index = ZIndex::Value(OVERLAY_Z_INDEX);
        el.style.pointer_events = PointerEvents::None;
        el.style.cursor = Cursor::Default;
    }

    let label = doc.create_element("span");
    doc.set_attribute(
        label,
        "style",
        &format!(
            "position:absolute;top:-16px;left:-1px;background-color:{color};color:white;\
             padding:2px 4px;font-size:8px;font-family:monospace;font-weight:bold;\
             border-radius:2px;white-space:nowrap;line-height:1;"
        ),
    )?;
    if let Some(el) = doc.element_mut(label) {
        el.style.position = Position::Absolute;
        el.style.pointer_events = PointerEvents::None;
    }
    let text = doc.create_text(&index.to_string());
    doc.append_child(label, text)?;
    doc.append_child(overlay, label)?;
    Ok(overlay)
}

fn color_for_tag(tag: &str) -> &'static str {
    match tag {
        "button" => "#FF6B6B",
        "input" => "#4ECDC4",
        "select" => "#45B7D1",
        "a" => "#96CEB4",
        "textarea" => "#FF8C42",
        _ => "#DDA0DD",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementNodeRecord, ViewportRect};
    use domlens_core_types::Rect;
    use domlens_page::PageBuilder;

    fn record(tag: &str) -> NodeRecord {
        NodeRecord::Element(ElementNodeRecord {
            tag_name: tag.to_string(),
            attributes: BTreeMap::new(),
            xpath: String::new(),
            is_visible: true,
            is_interactive: true,
            is_top_element: false,
            is_in_viewport: true,
            highlight_index: None,
            shadow_root: false,
            viewport: ViewportRect::default(),
            children: Vec::new(),
            text: String::new(),
            aria_label: None,
            aria_description: None,
            title: None,
            role: None,
            is_scrollable: false,
            iframe_content: None,
            iframe_depth: None,
        })
    }

    fn cand(id: u32, x: f64, y: f64, is_top: bool) -> Candidate {
        Candidate {
            node_id: NodeId(id),
            rect: Rect::new(x, y, 80.0, 24.0),
            is_top,
            tag: "button".to_string(),
            role: None,
        }
    }

    #[test]
    fn assigns_reading_order_with_row_tolerance() {
        let mut map = BTreeMap::new();
        for id in 1..=3 {
            map.insert(NodeId(id), record("button"));
        }
        // Same visual row (within the 5px bucket), so left-to-right
        // despite the vertical jitter; the third sits on the next row.
        let mut survivors = vec![
            cand(1, 300.0, 12.0, true),
            cand(2, 10.0, 10.0, true),
            cand(3, 0.0, 60.0, true),
        ];
        assign_indices(&mut map, &mut survivors);
        let index_of = |id: u32| {
            map[&NodeId(id)]
                .as_element()
                .unwrap()
                .highlight_index
                .unwrap()
        };
        assert_eq!(index_of(2), 0);
        assert_eq!(index_of(1), 1);
        assert_eq!(index_of(3), 2);
    }

    #[test]
    fn stamps_top_verdict_on_records() {
        let mut map = BTreeMap::new();
        map.insert(NodeId(1), record("button"));
        let mut survivors = vec![cand(1, 0.0, 0.0, true)];
        assign_indices(&mut map, &mut survivors);
        assert!(map[&NodeId(1)].as_element().unwrap().is_top_element);
    }

    #[test]
    fn paints_singleton_container_with_labels() {
        let page = PageBuilder::new(800.0, 600.0).build();
        let mut doc = page.document;
        let survivors = vec![cand(1, 10.0, 10.0, true), cand(2, 10.0, 50.0, false)];
        paint(&mut doc, &survivors, -1).unwrap();
        let container = doc.element_by_id(HIGHLIGHT_CONTAINER_ID).expect("container");
        // Only the topmost survivor is painted.
        assert_eq!(doc.children(container).len(), 1);
        let overlay = doc.children(container)[0];
        assert_eq!(doc.attr(overlay, "class"), Some(HIGHLIGHT_CLASS));
        assert_eq!(doc.attr(overlay, "data-highlight-index"), Some("0"));

        // A second paint reuses the same container.
        paint(&mut doc, &survivors, -1).unwrap();
        assert_eq!(doc.element_by_id(HIGHLIGHT_CONTAINER_ID), Some(container));
        assert_eq!(doc.children(container).len(), 2);
    }

    #[test]
    fn focused_overlay_gets_solid_treatment() {
        let page = PageBuilder::new(800.0, 600.0).build();
        let mut doc = page.document;
        let survivors = vec![cand(1, 10.0, 10.0, true)];
        paint(&mut doc, &survivors, 0).unwrap();
        let container = doc.element_by_id(HIGHLIGHT_CONTAINER_ID).unwrap();
        let overlay = doc.children(container)[0];
        let style = doc.attr(overlay, "style").unwrap();
        assert!(style.contains("solid"));
    }
}
