//! Heavier per-tree morphometric descriptors
//!
//! Everything here runs off the interactive path: the caller hands a
//! [`TreeSnapshot`] by value (see [`crate::pool`]) and gets one result back.
//! The hull and box-counting passes are superlinear in practice; the rest
//! is linear.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use neurotrace_core::distance;

use crate::hull::convex_hull_volume;
use crate::snapshot::TreeSnapshot;

/// Tortuosity of one branch-to-branch segment, tagged with the node the
/// segment starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentTortuosity {
    pub node_id: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Morphometrics {
    pub total_length: f64,
    /// Frustum lateral surface summed over edges, µm².
    pub total_surface: f64,
    /// Frustum volume summed over edges, µm³.
    pub total_volume: f64,
    pub branch_count: usize,
    pub tip_count: usize,
    pub max_strahler_order: u32,
    /// Pairwise angles at branch points, degrees.
    pub branch_angles: Vec<f64>,
    /// Soma-to-tip path length per terminal.
    pub tip_path_lengths: Vec<f64>,
    pub segment_tortuosity: Vec<SegmentTortuosity>,
    pub convex_hull_volume: f64,
    pub fractal_dimension: f64,
}

/// Compute all descriptors for one tree snapshot.
pub fn compute_morphometrics(snapshot: &TreeSnapshot) -> Morphometrics {
    let mut result = Morphometrics::default();

    for &id in snapshot.nodes.keys() {
        let n = snapshot.children(id).len();
        if n == 0 {
            result.tip_count += 1;
        }
        if n >= 2 {
            result.branch_count += 1;
        }
    }

    // Edge-based totals: each edge modeled as a conical frustum.
    for node in snapshot.nodes.values() {
        if node.parent_id == -1 {
            continue;
        }
        let Some(parent) = snapshot.nodes.get(&node.parent_id) else {
            continue;
        };
        let seg_len = distance(node, parent);
        let (r1, r2) = (parent.radius, node.radius);

        result.total_length += seg_len;
        result.total_surface += std::f64::consts::PI * (r1 + r2) * seg_len;
        result.total_volume +=
            std::f64::consts::PI * (r1 * r1 + r1 * r2 + r2 * r2) * seg_len / 3.0;
    }

    result.branch_angles = branch_angles(snapshot);
    result.max_strahler_order = strahler_orders(snapshot)
        .values()
        .copied()
        .max()
        .unwrap_or(0);
    result.tip_path_lengths = tip_path_lengths(snapshot);
    result.segment_tortuosity = segment_tortuosity(snapshot);

    let points: Vec<[f64; 3]> = snapshot.nodes.values().map(|n| [n.x, n.y, n.z]).collect();
    result.convex_hull_volume = if points.len() >= 4 {
        convex_hull_volume(&points)
    } else {
        0.0
    };
    result.fractal_dimension = fractal_dimension(&points);

    result
}

/// All pairwise angles between child vectors at every ≥2-child node, in
/// degrees. The dot product is clamped before `acos` for numeric safety;
/// zero-length vectors are skipped.
fn branch_angles(snapshot: &TreeSnapshot) -> Vec<f64> {
    let mut angles = Vec::new();
    for (&id, children) in &snapshot.child_index {
        if children.len() < 2 {
            continue;
        }
        let Some(branch) = snapshot.nodes.get(&id) else {
            continue;
        };
        for i in 0..children.len() {
            for j in (i + 1)..children.len() {
                let (Some(c1), Some(c2)) =
                    (snapshot.nodes.get(&children[i]), snapshot.nodes.get(&children[j]))
                else {
                    continue;
                };
                let v1 = [c1.x - branch.x, c1.y - branch.y, c1.z - branch.z];
                let v2 = [c2.x - branch.x, c2.y - branch.y, c2.z - branch.z];
                let mag1 = (v1[0] * v1[0] + v1[1] * v1[1] + v1[2] * v1[2]).sqrt();
                let mag2 = (v2[0] * v2[0] + v2[1] * v2[1] + v2[2] * v2[2]).sqrt();
                if mag1 == 0.0 || mag2 == 0.0 {
                    continue;
                }
                let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
                let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
                angles.push(cos.acos().to_degrees());
            }
        }
    }
    angles
}

/// Strahler order per node, by iterative bottom-up reduction.
///
/// Tips seed order 1. A parent becomes ready once every child has been
/// processed (tracked by a counter); its order is max(child orders) + 1 when
/// it has 2+ children that *all* tie at the max, otherwise just the max.
pub fn strahler_orders(snapshot: &TreeSnapshot) -> BTreeMap<i64, u32> {
    let mut orders: BTreeMap<i64, u32> = BTreeMap::new();
    let mut processed: BTreeMap<i64, usize> = BTreeMap::new();
    let mut queue: VecDeque<i64> = VecDeque::new();

    for (&id, node) in &snapshot.nodes {
        processed.insert(id, 0);
        if snapshot.children(id).is_empty() {
            orders.insert(id, 1);
            if node.parent_id != -1 && snapshot.nodes.contains_key(&node.parent_id) {
                queue.push_back(node.parent_id);
            }
        }
    }

    while let Some(parent_id) = queue.pop_front() {
        let count = processed.get(&parent_id).copied().unwrap_or(0) + 1;
        processed.insert(parent_id, count);

        let children = snapshot.children(parent_id);
        if count < children.len() {
            continue;
        }

        let child_orders: Vec<u32> = children
            .iter()
            .filter_map(|c| orders.get(c).copied())
            .collect();

        let order = if child_orders.is_empty() {
            1
        } else {
            let max = *child_orders.iter().max().expect("non-empty");
            let all_tie = child_orders.iter().all(|&o| o == max);
            if all_tie && child_orders.len() >= 2 {
                max + 1
            } else {
                max
            }
        };
        orders.insert(parent_id, order);

        let node = &snapshot.nodes[&parent_id];
        if node.parent_id != -1 && snapshot.nodes.contains_key(&node.parent_id) {
            queue.push_back(node.parent_id);
        }
    }

    orders
}

/// Path length from each terminal tip back to its root.
fn tip_path_lengths(snapshot: &TreeSnapshot) -> Vec<f64> {
    let mut lengths = Vec::new();
    for &id in snapshot.nodes.keys() {
        if !snapshot.children(id).is_empty() {
            continue;
        }
        let mut dist = 0.0;
        let mut cur = id;
        loop {
            let Some(node) = snapshot.nodes.get(&cur) else {
                break;
            };
            if node.parent_id == -1 {
                break;
            }
            let Some(parent) = snapshot.nodes.get(&node.parent_id) else {
                break;
            };
            dist += distance(node, parent);
            cur = node.parent_id;
        }
        lengths.push(dist);
    }
    lengths
}

/// Path length ÷ straight-line distance for each segment between a branch
/// point (or root) and the next branch/tip along a degree-1 chain.
fn segment_tortuosity(snapshot: &TreeSnapshot) -> Vec<SegmentTortuosity> {
    let mut out = Vec::new();

    let mut seg_starts: Vec<i64> = Vec::new();
    for &id in snapshot.nodes.keys() {
        if snapshot.children(id).len() >= 2 {
            seg_starts.push(id);
        }
    }
    for (&id, node) in &snapshot.nodes {
        if node.parent_id == -1 {
            seg_starts.push(id);
        }
    }

    for start_id in seg_starts {
        let start = &snapshot.nodes[&start_id];
        for &child_id in snapshot.children(start_id) {
            let mut path_len = 0.0;
            let mut prev = start_id;
            let mut cur = child_id;
            loop {
                let Some(node) = snapshot.nodes.get(&cur) else {
                    break;
                };
                path_len += distance(node, &snapshot.nodes[&prev]);
                let children = snapshot.children(cur);
                if children.len() != 1 {
                    break;
                }
                prev = cur;
                cur = children[0];
            }

            let Some(end) = snapshot.nodes.get(&cur) else {
                continue;
            };
            let straight = distance(end, start);
            if straight > 0.0 {
                out.push(SegmentTortuosity {
                    node_id: start_id,
                    value: path_len / straight,
                });
            }
        }
    }

    out
}

/// Box-counting fractal dimension: occupied-cell counts at geometrically
/// doubling divisions of the bounding box, slope of log(count) against
/// log(1/boxSize). Returns 0 (never NaN) when fewer than 2 points or fewer
/// than 2 usable scales are available.
fn fractal_dimension(points: &[[f64; 3]]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let span = (0..3)
        .map(|a| max[a] - min[a])
        .fold(1.0f64, f64::max);

    let mut log_eps = Vec::new();
    let mut log_n = Vec::new();

    let mut divisions = 2u32;
    while divisions <= 64 {
        let box_size = span / f64::from(divisions);
        let mut occupied: HashSet<(i64, i64, i64)> = HashSet::new();
        for p in points {
            occupied.insert((
                ((p[0] - min[0]) / box_size).floor() as i64,
                ((p[1] - min[1]) / box_size).floor() as i64,
                ((p[2] - min[2]) / box_size).floor() as i64,
            ));
        }
        log_eps.push((1.0 / box_size).ln());
        log_n.push((occupied.len() as f64).ln());
        divisions *= 2;
    }

    if log_eps.len() < 2 {
        return 0.0;
    }

    let n = log_eps.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (x, y) in log_eps.iter().zip(&log_n) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }
    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denom
}
