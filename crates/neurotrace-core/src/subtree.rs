//! Subtree extraction

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::model::{Morphology, SwcNode};

/// Collect the subtree rooted at `root_id` via BFS over the child index.
/// Returns an empty map for an unknown id; a visited set guards against
/// cycles in a corrupted index.
pub fn subtree(result: &Morphology, root_id: i64) -> BTreeMap<i64, SwcNode> {
    let mut out = BTreeMap::new();
    if !result.nodes.contains_key(&root_id) {
        return out;
    }

    let mut visited: BTreeSet<i64> = BTreeSet::new();
    let mut queue: VecDeque<i64> = VecDeque::from([root_id]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = result.nodes.get(&id) else {
            continue;
        };
        out.insert(id, *node);

        for &child_id in result.children(id) {
            if !visited.contains(&child_id) {
                queue.push_back(child_id);
            }
        }
    }

    out
}
