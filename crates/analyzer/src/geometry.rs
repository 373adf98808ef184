//! Geometry and style probes: visibility, viewport membership, stacking
//! priority and tolerant rect overlap.

use domlens_core_types::Rect;
use domlens_page::{ComputedStyle, Display, Document, NodeRef, PointerEvents, Position, Visibility};

/// Per-axis tolerance absorbing subpixel rounding when comparing rects.
pub const OVERLAP_TOLERANCE: f64 = 1.0;

/// Pragmatic visibility: disqualifies everything an LLM should not be
/// shown as a target.
pub fn is_visible(doc: &Document, r: NodeRef) -> bool {
    let el = match doc.element(r) {
        Some(el) => el,
        None => return false,
    };
    if el.style.display == Display::None {
        return false;
    }
    if matches!(el.style.visibility, Visibility::Hidden | Visibility::Collapse) {
        return false;
    }
    if el.style.opacity == 0.0 {
        return false;
    }
    if el.rect.width == 0.0 && el.rect.height == 0.0 {
        return false;
    }
    // A null offsetParent means the element is out of the layout tree,
    // unless it is the root/body or escapes via fixed/sticky positioning.
    let anchored = el.has_offset_parent
        || matches!(el.tag.as_str(), "body" | "html")
        || matches!(el.style.position, Position::Fixed | Position::Sticky);
    if !anchored {
        return false;
    }
    if el.style.pointer_events == PointerEvents::None {
        return false;
    }
    true
}

/// Whether `rect` intersects the viewport expanded by `expansion` on all
/// four sides (negative values shrink it).
pub fn is_in_viewport(rect: &Rect, viewport: &Rect, expansion: f64) -> bool {
    viewport.expanded(expansion).intersects(rect)
}

/// Lexicographic key comparing the apparent z-order of two elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct StackingPriority(pub bool, pub i64, pub bool);

/// Stacking priority of an element given its style and the numeric
/// z-index of its parent stacking context (if any).
///
/// `z-index: auto` contributes no explicit z of its own; the effective z
/// falls back to the parent stacking context's value, else 0.
pub fn stacking_priority(style: &ComputedStyle, parent_z: Option<i32>) -> StackingPriority {
    let positioned = style.position.is_positioned();
    let effective_z = style
        .z_index
        .numeric()
        .or(parent_z)
        .map(i64::from)
        .unwrap_or(0);
    StackingPriority(positioned, effective_z, positioned)
}

/// Numeric z-index of the nearest positioned ancestor that sets one.
pub fn parent_stacking_z(doc: &Document, r: NodeRef) -> Option<i32> {
    let mut cur = doc.parent(r);
    while let Some(p) = cur {
        if let Some(el) = doc.element(p) {
            if el.style.position.is_positioned() {
                if let Some(z) = el.style.z_index.numeric() {
                    return Some(z);
                }
            }
        }
        cur = doc.parent(p);
    }
    None
}

pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b, OVERLAP_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domlens_page::{el, PageBuilder, Position};

    fn page_with(spec: domlens_page::ElementSpec) -> domlens_page::Page {
        PageBuilder::new(1280.0, 720.0).child(spec).build()
    }

    fn only_child(page: &domlens_page::Page) -> NodeRef {
        let body = page.document.body().unwrap();
        page.document.children(body)[0]
    }

    #[test]
    fn visible_by_default() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0));
        assert!(is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn display_none_hides() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).display_none());
        assert!(!is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn visibility_hidden_and_collapse_hide() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).visibility_hidden());
        assert!(!is_visible(&page.document, only_child(&page)));
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).visibility_collapse());
        assert!(!is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn zero_opacity_hides_but_partial_does_not() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).opacity(0.0));
        assert!(!is_visible(&page.document, only_child(&page)));
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).opacity(0.2));
        assert!(is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn zero_by_zero_rect_hides() {
        let page = page_with(el("div").rect(5.0, 5.0, 0.0, 0.0));
        assert!(!is_visible(&page.document, only_child(&page)));
        // One non-zero axis is enough to stay visible.
        let page = page_with(el("div").rect(5.0, 5.0, 0.0, 10.0));
        assert!(is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn detached_from_layout_hides_unless_fixed_or_sticky() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).no_offset_parent());
        assert!(!is_visible(&page.document, only_child(&page)));
        let page = page_with(
            el("div")
                .rect(0.0, 0.0, 100.0, 20.0)
                .no_offset_parent()
                .position(Position::Fixed),
        );
        assert!(is_visible(&page.document, only_child(&page)));
        let page = page_with(
            el("div")
                .rect(0.0, 0.0, 100.0, 20.0)
                .no_offset_parent()
                .position(Position::Sticky),
        );
        assert!(is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn body_is_exempt_from_offset_parent_rule() {
        let page = PageBuilder::new(800.0, 600.0).build();
        let body = page.document.body().unwrap();
        assert!(is_visible(&page.document, body));
    }

    #[test]
    fn pointer_events_none_hides() {
        let page = page_with(el("div").rect(0.0, 0.0, 100.0, 20.0).pointer_events_none());
        assert!(!is_visible(&page.document, only_child(&page)));
    }

    #[test]
    fn viewport_expansion_widens_and_shrinks() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let below = Rect::new(0.0, 700.0, 100.0, 50.0);
        assert!(!is_in_viewport(&below, &viewport, 0.0));
        assert!(is_in_viewport(&below, &viewport, 150.0));
        let edge = Rect::new(0.0, 590.0, 100.0, 50.0);
        assert!(is_in_viewport(&edge, &viewport, 0.0));
        assert!(!is_in_viewport(&edge, &viewport, -50.0));
    }

    #[test]
    fn stacking_priority_orders_positioned_then_z() {
        let mut positioned = ComputedStyle::default();
        positioned.position = Position::Absolute;
        positioned.z_index = domlens_page::ZIndex::Value(1);
        let static_style = ComputedStyle::default();
        assert!(
            stacking_priority(&positioned, None) > stacking_priority(&static_style, None)
        );

        let mut higher = positioned.clone();
        higher.z_index = domlens_page::ZIndex::Value(5);
        assert!(stacking_priority(&higher, None) > stacking_priority(&positioned, None));
    }

    #[test]
    fn auto_z_falls_back_to_parent_context_then_zero() {
        let mut style = ComputedStyle::default();
        style.position = Position::Absolute;
        assert_eq!(stacking_priority(&style, Some(7)).1, 7);
        assert_eq!(stacking_priority(&style, None).1, 0);
    }
}
