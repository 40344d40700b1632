//! O(N) summary statistics over a parsed morphology

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{distance, Morphology};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphologyStats {
    pub total_nodes: usize,
    /// Summed parent-child Euclidean distance, µm.
    pub total_length: f64,
    pub branch_points: usize,
    pub terminal_tips: usize,
    pub max_path_distance: f64,
    pub max_branch_order: u32,
    pub node_count_by_type: BTreeMap<i32, usize>,
    pub root_count: usize,
}

/// Compute summary statistics.
///
/// One O(N) pass for counts and total length, then one iterative DFS per
/// root for max path distance and max branch order — branch order only
/// increments when passing through a node with 2+ children.
pub fn compute_stats(result: &Morphology) -> MorphologyStats {
    let mut stats = MorphologyStats {
        total_nodes: result.nodes.len(),
        root_count: result.roots.len(),
        ..Default::default()
    };

    for (&id, node) in &result.nodes {
        *stats.node_count_by_type.entry(node.node_type).or_insert(0) += 1;

        if node.parent_id != -1 {
            if let Some(parent) = result.nodes.get(&node.parent_id) {
                stats.total_length += distance(node, parent);
            }
        }

        let child_count = result.children(id).len();
        if child_count >= 2 {
            stats.branch_points += 1;
        }
        if child_count == 0 {
            stats.terminal_tips += 1;
        }
    }

    struct Frame {
        id: i64,
        cumulative_distance: f64,
        branch_order: u32,
    }

    for &root_id in &result.roots {
        let mut stack = vec![Frame {
            id: root_id,
            cumulative_distance: 0.0,
            branch_order: 0,
        }];
        let mut visited: BTreeSet<i64> = BTreeSet::new();

        while let Some(frame) = stack.pop() {
            if !visited.insert(frame.id) {
                continue;
            }
            let Some(node) = result.nodes.get(&frame.id) else {
                continue;
            };

            let mut edge_len = 0.0;
            if node.parent_id != -1 {
                if let Some(parent) = result.nodes.get(&node.parent_id) {
                    edge_len = distance(node, parent);
                }
            }

            let dist = frame.cumulative_distance + edge_len;
            if dist > stats.max_path_distance {
                stats.max_path_distance = dist;
            }
            if frame.branch_order > stats.max_branch_order {
                stats.max_branch_order = frame.branch_order;
            }

            let children = result.children(frame.id);
            let is_branch = children.len() >= 2;
            for &child_id in children {
                if !visited.contains(&child_id) {
                    stack.push(Frame {
                        id: child_id,
                        cumulative_distance: dist,
                        branch_order: if is_branch {
                            frame.branch_order + 1
                        } else {
                            frame.branch_order
                        },
                    });
                }
            }
        }
    }

    stats
}
