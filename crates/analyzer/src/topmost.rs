//! Topmost-at-point resolution.
//!
//! Hit testing at the rect center settles most elements; the fallback
//! walks siblings up the ancestor chain comparing stacking priorities,
//! which tracks the CSS stacking rules closely enough for typical web
//! UIs without a full stacking-context simulation.

use domlens_core_types::Rect;
use domlens_page::{Display, Document, NodeRef, PointerEvents, Visibility};

use crate::geometry::{parent_stacking_z, rects_overlap, stacking_priority};

/// Whether the element is the topmost target at its own center.
pub fn is_top_element(doc: &Document, r: NodeRef, frame_rect: &Rect) -> bool {
    let el = match doc.element(r) {
        Some(el) => el,
        None => return false,
    };
    let rect = el.rect;
    if rect.width == 0.0 || rect.height == 0.0 {
        return false;
    }
    let (cx, cy) = rect.center();
    if !frame_rect.contains_point(cx, cy) {
        return false;
    }
    if let Some(hit) = doc.element_from_point(cx, cy) {
        if hit == r || doc.is_ancestor(r, hit) {
            return true;
        }
    }
    !has_overlapping_higher_element(doc, r, &rect)
}

/// Stacking fallback: does any visible sibling (or positioned uncle's
/// child) overlap `rect` with a strictly higher stacking priority?
pub fn has_overlapping_higher_element(doc: &Document, el: NodeRef, rect: &Rect) -> bool {
    let own_style = match doc.element(el) {
        Some(data) => &data.style,
        None => return false,
    };
    let own = stacking_priority(own_style, parent_stacking_z(doc, el));

    let mut occluders: Vec<NodeRef> = Vec::new();
    let mut cur = el;
    let mut level = 0u32;
    while let Some(parent) = doc.parent(cur) {
        if !doc.is_element(parent) {
            break;
        }
        for &sib in doc.children(parent) {
            if sib == cur {
                continue;
            }
            let data = match doc.element(sib) {
                Some(data) => data,
                None => continue,
            };
            if data.style.display == Display::None
                || data.style.visibility != Visibility::Visible
                || data.style.opacity == 0.0
                || data.style.pointer_events == PointerEvents::None
            {
                continue;
            }
            occluders.push(sib);
            // Children of out-of-flow uncles can overlay cousins.
            if level >= 1 && data.style.position.is_out_of_flow() {
                occluders.extend(
                    doc.children(sib)
                        .iter()
                        .copied()
                        .filter(|&c| doc.is_element(c)),
                );
            }
        }
        if doc.tag(parent) == Some("body") {
            break;
        }
        cur = parent;
        level += 1;
    }

    for cand in occluders {
        if cand == el || doc.is_ancestor(cand, el) {
            continue;
        }
        let data = match doc.element(cand) {
            Some(data) => data,
            None => continue,
        };
        if !rects_overlap(&data.rect, rect) {
            continue;
        }
        let priority = stacking_priority(&data.style, parent_stacking_z(doc, cand));
        if priority > own {
            return true;
        }
    }
    false
}
