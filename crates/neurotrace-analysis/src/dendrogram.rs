//! Dendrogram layout: tree → 2-D projection
//!
//! x is cumulative path distance from the chosen root, y is leaf order with
//! internal nodes centered over their children. Both passes are iterative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use neurotrace_core::{distance, Morphology};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DendroNode {
    pub id: i64,
    /// Path distance from the root, µm.
    pub x: f64,
    /// Leaf order index (leaves), or midpoint of the children's range.
    pub y: f64,
    pub node_type: i32,
    pub parent_id: i64,
    pub is_leaf: bool,
    pub is_branch: bool,
}

/// Lay out the subtree under `root_id`. Unknown roots produce an empty map.
pub fn dendrogram_layout(m: &Morphology, root_id: i64) -> BTreeMap<i64, DendroNode> {
    let mut result = BTreeMap::new();
    if !m.nodes.contains_key(&root_id) {
        return result;
    }

    // Pass 1: cumulative distance via iterative DFS, recording visit order.
    let mut dist_from_root: BTreeMap<i64, f64> = BTreeMap::from([(root_id, 0.0)]);
    let mut dfs_order: Vec<i64> = Vec::new();
    let mut stack = vec![root_id];

    while let Some(id) = stack.pop() {
        dfs_order.push(id);
        let node = &m.nodes[&id];
        let parent_dist = dist_from_root[&id];

        for &child_id in m.children(id) {
            let Some(child) = m.nodes.get(&child_id) else {
                continue;
            };
            dist_from_root.insert(child_id, parent_dist + distance(child, node));
            stack.push(child_id);
        }
    }

    // Pass 2: bottom-up over the reverse DFS order. Leaves take sequential
    // indices; internal nodes take the midpoint of their children's range.
    let mut leaf_index = 0u32;
    let mut y_min: BTreeMap<i64, f64> = BTreeMap::new();
    let mut y_max: BTreeMap<i64, f64> = BTreeMap::new();
    let mut y_val: BTreeMap<i64, f64> = BTreeMap::new();

    for &id in dfs_order.iter().rev() {
        let children = m.children(id);
        if children.is_empty() {
            let y = f64::from(leaf_index);
            leaf_index += 1;
            y_val.insert(id, y);
            y_min.insert(id, y);
            y_max.insert(id, y);
        } else {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for child_id in children {
                if let Some(&v) = y_min.get(child_id) {
                    lo = lo.min(v);
                }
                if let Some(&v) = y_max.get(child_id) {
                    hi = hi.max(v);
                }
            }
            y_val.insert(id, (lo + hi) / 2.0);
            y_min.insert(id, lo);
            y_max.insert(id, hi);
        }
    }

    for &id in &dfs_order {
        let node = &m.nodes[&id];
        let child_count = m.children(id).len();
        result.insert(
            id,
            DendroNode {
                id,
                x: dist_from_root.get(&id).copied().unwrap_or(0.0),
                y: y_val.get(&id).copied().unwrap_or(0.0),
                node_type: node.node_type,
                parent_id: node.parent_id,
                is_leaf: child_count == 0,
                is_branch: child_count >= 2,
            },
        );
    }

    result
}
