//! Reversible tree operations
//!
//! Every structural change to a morphology is expressed as a batch of
//! [`TreeOp`]s. Each op carries enough state to run backwards, so undo is
//! just `invert_batch` + `apply_ops`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use neurotrace_core::SwcNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOp {
    Move {
        node_id: i64,
        before: [f64; 3],
        after: [f64; 3],
    },
    Retype {
        node_id: i64,
        before: i32,
        after: i32,
    },
    Reparent {
        node_id: i64,
        before: i64,
        after: i64,
    },
    Insert {
        node: SwcNode,
    },
    Delete {
        node: SwcNode,
    },
}

impl TreeOp {
    /// The op that undoes this one.
    pub fn invert(&self) -> TreeOp {
        match self {
            TreeOp::Move {
                node_id,
                before,
                after,
            } => TreeOp::Move {
                node_id: *node_id,
                before: *after,
                after: *before,
            },
            TreeOp::Retype {
                node_id,
                before,
                after,
            } => TreeOp::Retype {
                node_id: *node_id,
                before: *after,
                after: *before,
            },
            TreeOp::Reparent {
                node_id,
                before,
                after,
            } => TreeOp::Reparent {
                node_id: *node_id,
                before: *after,
                after: *before,
            },
            TreeOp::Insert { node } => TreeOp::Delete { node: *node },
            TreeOp::Delete { node } => TreeOp::Insert { node: *node },
        }
    }
}

/// Invert a batch: reversed order, each op inverted.
pub fn invert_batch(ops: &[TreeOp]) -> Vec<TreeOp> {
    ops.iter().rev().map(TreeOp::invert).collect()
}

/// Apply a batch of ops to a node arena, in order.
pub fn apply_ops(nodes: &mut BTreeMap<i64, SwcNode>, ops: &[TreeOp]) {
    for op in ops {
        match op {
            TreeOp::Move { node_id, after, .. } => {
                if let Some(node) = nodes.get_mut(node_id) {
                    node.x = after[0];
                    node.y = after[1];
                    node.z = after[2];
                }
            }
            TreeOp::Retype { node_id, after, .. } => {
                if let Some(node) = nodes.get_mut(node_id) {
                    node.node_type = *after;
                }
            }
            TreeOp::Reparent { node_id, after, .. } => {
                if let Some(node) = nodes.get_mut(node_id) {
                    node.parent_id = *after;
                }
            }
            TreeOp::Insert { node } => {
                nodes.insert(node.id, *node);
            }
            TreeOp::Delete { node } => {
                nodes.remove(&node.id);
            }
        }
    }
}
