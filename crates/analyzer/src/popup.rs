//! Advisory detection of likely modal/overlay containers.

use std::collections::HashMap;

use domlens_core_types::NodeId;
use domlens_page::{Document, NodeRef, Position};
use once_cell::sync::Lazy;

use crate::geometry::is_visible;
use crate::highlight::HIGHLIGHT_CONTAINER_ID;
use crate::model::{PopupContainer, ViewportRect};

/// Case-insensitive class/id fragments that mark popup-like regions.
static POPUP_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "modal", "popup", "dialog", "overlay", "signin", "login", "consent", "cookie", "banner",
    ]
});

const MIN_POPUP_EDGE: f64 = 50.0;
const POPUP_Z_THRESHOLD: i32 = 9000;

/// Scan the top document for popup containers. Returns the descriptors
/// plus the number of elements examined.
pub(crate) fn detect_popups(
    doc: &Document,
    top_ids: &HashMap<NodeRef, NodeId>,
) -> (Vec<PopupContainer>, u64) {
    let overlay = doc.element_by_id(HIGHLIGHT_CONTAINER_ID);
    let mut containers = Vec::new();
    let mut scanned = 0u64;
    for r in doc.subtree(doc.root()) {
        let el = match doc.element(r) {
            Some(el) => el,
            None => continue,
        };
        if overlay.is_some_and(|o| r == o || doc.is_ancestor(o, r)) {
            continue;
        }
        scanned += 1;

        let z = match el.style.z_index.numeric() {
            Some(z) if z > POPUP_Z_THRESHOLD => z,
            _ => continue,
        };
        if !matches!(el.style.position, Position::Fixed | Position::Absolute) {
            continue;
        }
        if !is_visible(doc, r) {
            continue;
        }
        if el.rect.width < MIN_POPUP_EDGE || el.rect.height < MIN_POPUP_EDGE {
            continue;
        }
        let matched = match popup_signal(el) {
            Some(signal) => signal,
            None => continue,
        };

        containers.push(PopupContainer {
            node_id: top_ids.get(&r).copied(),
            tag_name: el.tag.clone(),
            id: el.attr("id").map(str::to_string),
            class: el.attr("class").map(str::to_string),
            z_index: z,
            position: match el.style.position {
                Position::Fixed => "fixed".to_string(),
                _ => "absolute".to_string(),
            },
            viewport: el.rect.into(),
            matched,
        });
    }
    (containers, scanned)
}

fn popup_signal(el: &domlens_page::ElementData) -> Option<String> {
    let mut haystack = String::new();
    for key in ["class", "id"] {
        if let Some(value) = el.attr(key) {
            haystack.push_str(&value.to_ascii_lowercase());
            haystack.push(' ');
        }
    }
    for keyword in POPUP_KEYWORDS.iter() {
        if haystack.contains(keyword) {
            return Some(format!("keyword:{keyword}"));
        }
    }
    if let Some(role) = el.attr("role") {
        let role = role.to_ascii_lowercase();
        if role == "dialog" || role == "alertdialog" {
            return Some(format!("role:{role}"));
        }
    }
    if el.attr("aria-modal") == Some("true") {
        return Some("aria-modal".to_string());
    }
    None
}
