//! Shared helpers for unit tests

use crate::model::{Morphology, SwcNode};

/// Build a node with the common fields spelled out.
pub fn node(id: i64, node_type: i32, x: f64, y: f64, z: f64, radius: f64, parent_id: i64) -> SwcNode {
    SwcNode {
        id,
        node_type,
        x,
        y,
        z,
        radius,
        parent_id,
    }
}

/// Assemble a morphology directly from nodes, deriving roots and the child
/// index from the parent pointers.
pub fn morphology_from_nodes(nodes: Vec<SwcNode>) -> Morphology {
    let mut m = Morphology::new();
    for n in nodes {
        m.nodes.insert(n.id, n);
    }
    m.rebuild_index();
    m
}

/// A simple Y-shaped tree: soma root at the origin with a straight neck,
/// splitting into two tips.
pub fn y_tree() -> Morphology {
    morphology_from_nodes(vec![
        node(1, 1, 0.0, 0.0, 0.0, 2.0, -1),
        node(2, 3, 0.0, 10.0, 0.0, 1.0, 1),
        node(3, 3, -5.0, 20.0, 0.0, 0.5, 2),
        node(4, 3, 5.0, 20.0, 0.0, 0.5, 2),
    ])
}
