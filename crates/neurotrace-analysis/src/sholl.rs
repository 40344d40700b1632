//! Sholl analysis: neurite crossings of concentric shells around the soma

use serde::{Deserialize, Serialize};

use neurotrace_core::Morphology;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShollPoint {
    pub radius: f64,
    pub intersections: usize,
}

/// Count edge crossings of shells at `radius_step` spacing, centered at the
/// first soma-typed node (falling back to the first root). An edge crosses
/// shell r iff min(d1, d2) < r ≤ max(d1, d2) for its endpoint distances.
pub fn compute_sholl(m: &Morphology, radius_step: f64) -> Vec<ShollPoint> {
    if m.nodes.is_empty() || radius_step <= 0.0 {
        return Vec::new();
    }
    let Some(soma) = m.soma() else {
        return Vec::new();
    };
    let (cx, cy, cz) = (soma.x, soma.y, soma.z);
    let center_dist = |x: f64, y: f64, z: f64| -> f64 {
        ((x - cx).powi(2) + (y - cy).powi(2) + (z - cz).powi(2)).sqrt()
    };

    let mut max_dist = 0.0f64;
    let mut edges: Vec<(f64, f64)> = Vec::new();
    for node in m.nodes.values() {
        if node.parent_id == -1 {
            continue;
        }
        let Some(parent) = m.nodes.get(&node.parent_id) else {
            continue;
        };
        let d1 = center_dist(parent.x, parent.y, parent.z);
        let d2 = center_dist(node.x, node.y, node.z);
        max_dist = max_dist.max(d1).max(d2);
        edges.push((d1, d2));
    }
    if edges.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut shell = 1u32;
    loop {
        let r = radius_step * f64::from(shell);
        if r > max_dist {
            break;
        }
        let intersections = edges
            .iter()
            .filter(|&&(d1, d2)| d1.min(d2) < r && r <= d1.max(d2))
            .count();
        results.push(ShollPoint {
            radius: r,
            intersections,
        });
        shell += 1;
    }

    results
}

/// Render a Sholl series as CSV with a `radius,intersections` header.
pub fn sholl_csv(data: &[ShollPoint]) -> String {
    let mut out = String::from("radius,intersections\n");
    for point in data {
        out.push_str(&format!("{},{}\n", point.radius, point.intersections));
    }
    out
}
