//! Interactive-element classification.
//!
//! The selector set is a compile-time constant; the permissive class/id
//! tail is plain substring matching rather than CSS attribute selectors,
//! which fall off a performance cliff on large DOMs.

use std::collections::HashSet;

use domlens_page::{Cursor, Document, ElementData, NodeRef};
use once_cell::sync::Lazy;

/// Tags that are interactive on their own.
static INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea", "summary", "details"];

/// ARIA roles that make any element interactive.
static INTERACTIVE_ROLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "button",
        "link",
        "checkbox",
        "radio",
        "tab",
        "menuitem",
        "option",
        "switch",
        "slider",
        "spinbutton",
        "combobox",
        "listbox",
        "searchbox",
        "textbox",
        "dialog",
        "alertdialog",
    ]
    .into_iter()
    .collect()
});

/// Substrings matched against class, id and data-testid.
static NAME_PATTERNS: &[&str] = &["button", "btn", "popup", "modal", "dialog", "overlay"];

/// Whether a single element is a plausible user target.
pub fn is_interactive(doc: &Document, r: NodeRef) -> bool {
    let el = match doc.element(r) {
        Some(el) => el,
        None => return false,
    };
    let tag = el.tag.as_str();

    // Anchors that render nothing clickable are never targets, whatever
    // else they carry.
    if tag == "a" && is_empty_anchor(doc, r, el) {
        return false;
    }
    if tag == "a" && (el.attr("href").is_some() || el.attr("role").is_some()) {
        return true;
    }
    if INTERACTIVE_TAGS.contains(&tag) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if INTERACTIVE_ROLES.contains(role.to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    if el.attr("tabindex").is_some() {
        return true;
    }
    if el.attr("onclick").is_some() {
        return true;
    }
    if el.attr("contenteditable") == Some("true") {
        return true;
    }
    if tag == "label" && el.attr("for").is_some() {
        return true;
    }
    if el.attr("draggable") == Some("true") {
        return true;
    }
    if el.attr("aria-modal") == Some("true") {
        return true;
    }
    if matches_name_patterns(el) {
        return true;
    }
    if matches!(tag, "div" | "span") && el.style.cursor == Cursor::Pointer {
        return true;
    }
    false
}

/// Anchor with no visible text, no aria-label, no title and no graphic
/// descendant.
fn is_empty_anchor(doc: &Document, r: NodeRef, el: &ElementData) -> bool {
    if el.attr("aria-label").is_some() || el.attr("title").is_some() {
        return false;
    }
    for node in doc.subtree(r) {
        if let Some(text) = doc.text(node) {
            if !text.trim().is_empty() {
                return false;
            }
        } else if node != r {
            if let Some(child) = doc.element(node) {
                if matches!(child.tag.as_str(), "img" | "svg")
                    || child.attr("role") == Some("img")
                {
                    return false;
                }
            }
        }
    }
    true
}

fn matches_name_patterns(el: &ElementData) -> bool {
    let mut haystack = String::new();
    for key in ["class", "id", "data-testid"] {
        if let Some(value) = el.attr(key) {
            haystack.push_str(&value.to_ascii_lowercase());
            haystack.push(' ');
        }
    }
    if haystack.is_empty() {
        return false;
    }
    NAME_PATTERNS.iter().any(|p| haystack.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domlens_page::{el, PageBuilder};

    fn classify(spec: domlens_page::ElementSpec) -> bool {
        let page = PageBuilder::new(1280.0, 720.0).child(spec).build();
        let body = page.document.body().unwrap();
        is_interactive(&page.document, page.document.children(body)[0])
    }

    #[test]
    fn form_controls_are_interactive() {
        assert!(classify(el("button")));
        assert!(classify(el("input")));
        assert!(classify(el("select")));
        assert!(classify(el("textarea")));
        assert!(classify(el("summary")));
        assert!(classify(el("details")));
    }

    #[test]
    fn plain_div_is_not() {
        assert!(!classify(el("div")));
        assert!(!classify(el("p").text_child("hello")));
    }

    #[test]
    fn aria_roles_make_elements_interactive() {
        assert!(classify(el("div").attr("role", "button")));
        assert!(classify(el("div").attr("role", "ComboBox")));
        assert!(!classify(el("div").attr("role", "navigation")));
    }

    #[test]
    fn attribute_signals() {
        assert!(classify(el("div").attr("tabindex", "0")));
        assert!(classify(el("div").attr("onclick", "go()")));
        assert!(classify(el("div").attr("contenteditable", "true")));
        assert!(!classify(el("div").attr("contenteditable", "false")));
        assert!(classify(el("label").attr("for", "email")));
        assert!(!classify(el("label")));
        assert!(classify(el("div").attr("draggable", "true")));
        assert!(classify(el("div").attr("aria-modal", "true")));
    }

    #[test]
    fn class_and_testid_substrings() {
        assert!(classify(el("div").attr("class", "nav-Button primary")));
        assert!(classify(el("div").attr("id", "signup-modal")));
        assert!(classify(el("div").attr("data-testid", "overlay-root")));
        assert!(!classify(el("div").attr("class", "content")));
    }

    #[test]
    fn cursor_pointer_divs_and_spans() {
        assert!(classify(el("div").cursor_pointer()));
        assert!(classify(el("span").cursor_pointer()));
        assert!(!classify(el("p").cursor_pointer()));
    }

    #[test]
    fn anchor_needs_href_or_role() {
        assert!(classify(el("a").attr("href", "/x").text_child("Go")));
        assert!(classify(el("a").attr("role", "link").text_child("Go")));
        assert!(!classify(el("a").text_child("Go")));
    }

    #[test]
    fn empty_anchor_is_never_interactive() {
        assert!(!classify(el("a").attr("href", "/x")));
        assert!(!classify(el("a").attr("href", "/x").attr("onclick", "go()")));
    }

    #[test]
    fn anchor_with_label_title_or_graphic_counts() {
        assert!(classify(el("a").attr("href", "/x").attr("aria-label", "Home")));
        assert!(classify(el("a").attr("href", "/x").attr("title", "Home")));
        assert!(classify(el("a").attr("href", "/x").child(el("img"))));
        assert!(classify(el("a").attr("href", "/x").child(el("svg"))));
        assert!(classify(
            el("a")
                .attr("href", "/x")
                .child(el("i").attr("role", "img"))
        ));
        assert!(!classify(el("a").attr("href", "/x").child(el("i"))));
    }
}
