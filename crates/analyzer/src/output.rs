//! Compact-mode projection of the node map.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use domlens_core_types::NodeId;

use crate::model::NodeRecord;
use crate::walker::Candidate;

/// Keep only the essential nodes: the root, every surviving candidate
/// with its ancestors, and iframe placeholders. Child lists are pruned
/// to the surviving set so every referenced id still resolves.
pub(crate) fn project_compact(
    map: &BTreeMap<NodeId, NodeRecord>,
    parent_of: &HashMap<NodeId, NodeId>,
    survivors: &[Candidate],
    iframe_nodes: &[NodeId],
    root_id: NodeId,
) -> BTreeMap<NodeId, NodeRecord> {
    let mut essential: BTreeSet<NodeId> = BTreeSet::new();
    essential.insert(root_id);
    essential.extend(iframe_nodes.iter().copied());
    for candidate in survivors {
        let mut cur = Some(candidate.node_id);
        while let Some(id) = cur {
            if !essential.insert(id) {
                break;
            }
            cur = parent_of.get(&id).copied();
        }
    }

    let mut compact = BTreeMap::new();
    for id in &essential {
        let Some(record) = map.get(id) else { continue };
        let mut record = record.clone();
        if let Some(el) = record.as_element_mut() {
            el.children.retain(|c| essential.contains(c));
        }
        compact.insert(*id, record);
    }
    compact
}
