//! Nested / overlapping candidate filtering.
//!
//! Two passes evaluated over the full candidate list (drops accumulate,
//! so a wrapper eliminated for nesting still shields what it overlaps):
//! a DOM-containment pass with link/button priority, then a
//! visual-overlap pass driven by area and topmost-at-point.

use std::collections::HashMap;

use domlens_core_types::NodeId;
use tracing::debug;

use crate::geometry::rects_overlap;
use crate::walker::Candidate;

pub(crate) fn filter_candidates(
    candidates: &[Candidate],
    parent_of: &HashMap<NodeId, NodeId>,
    debug_mode: bool,
) -> Vec<Candidate> {
    let n = candidates.len();
    let mut dropped = vec![false; n];
    let mut reasons: Vec<&'static str> = vec![""; n];

    // Containment pass: anchors swallow generic content they wrap,
    // everything else defers to its innermost interactive descendant.
    for i in 0..n {
        for j in 0..n {
            if i == j || !contains(parent_of, candidates[i].node_id, candidates[j].node_id) {
                continue;
            }
            let inner = &candidates[j];
            let inner_protected = inner.tag == "a"
                || inner.tag == "button"
                || inner.role.as_deref() == Some("button");
            if candidates[i].tag == "a" && !inner_protected {
                dropped[j] = true;
                reasons[j] = "wrapped-by-anchor";
            } else {
                dropped[i] = true;
                reasons[i] = "contains-inner-target";
            }
        }
    }

    // Overlap pass: of two overlapping, non-nested candidates the larger
    // one goes, unless it is the topmost-at-point one.
    for i in 0..n {
        for j in (i + 1)..n {
            if contains(parent_of, candidates[i].node_id, candidates[j].node_id)
                || contains(parent_of, candidates[j].node_id, candidates[i].node_id)
            {
                continue;
            }
            if !rects_overlap(&candidates[i].rect, &candidates[j].rect) {
                continue;
            }
            let (big, small) = if candidates[i].area() > candidates[j].area() {
                (i, j)
            } else if candidates[j].area() > candidates[i].area() {
                (j, i)
            } else {
                continue;
            };
            if candidates[big].is_top {
                dropped[small] = true;
                reasons[small] = "occluded-by-larger-top";
            } else {
                dropped[big] = true;
                reasons[big] = "overlapping-wrapper";
            }
        }
    }

    if debug_mode {
        for (i, c) in candidates.iter().enumerate() {
            debug!(
                target: "domlens.filter",
                node_id = %c.node_id,
                tag = %c.tag,
                kept = !dropped[i],
                reason = reasons[i],
                "candidate filtering result"
            );
        }
    }

    candidates
        .iter()
        .zip(dropped.iter())
        .filter(|(_, &d)| !d)
        .map(|(c, _)| c.clone())
        .collect()
}

fn contains(parent_of: &HashMap<NodeId, NodeId>, ancestor: NodeId, node: NodeId) -> bool {
    let mut cur = parent_of.get(&node);
    while let Some(&p) = cur {
        if p == ancestor {
            return true;
        }
        cur = parent_of.get(&p);
    }
    false
}
