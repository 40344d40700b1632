//! Interactive edit session over one morphology
//!
//! The engine owns the tree. Callers mutate it only through the builder
//! methods below; every accepted batch lands on the undo history and
//! triggers a full recompute of the derived state (index, roots, stats,
//! warnings). Single writer, single reader; no internal locking.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use neurotrace_core::{
    compute_stats, validate, Morphology, MorphologyStats, SwcNode, Warning, NO_PARENT,
};

use crate::ops::{apply_ops, invert_batch, TreeOp};

/// Undo depth. Oldest batches fall off the far end.
const HISTORY_CAP: usize = 100;

pub struct EditEngine {
    morphology: Morphology,
    /// Warnings produced at parse time. Structural validation is re-run
    /// after every edit, but these stay attached for the session.
    base_warnings: Vec<Warning>,
    stats: MorphologyStats,
    history: VecDeque<Vec<TreeOp>>,
    redo: Vec<Vec<TreeOp>>,
}

impl EditEngine {
    pub fn new(morphology: Morphology) -> Self {
        let base_warnings = morphology.warnings.clone();
        let stats = compute_stats(&morphology);
        Self {
            morphology,
            base_warnings,
            stats,
            history: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    pub fn morphology(&self) -> &Morphology {
        &self.morphology
    }

    pub fn stats(&self) -> &MorphologyStats {
        &self.stats
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn move_node(&mut self, node_id: i64, position: [f64; 3]) {
        let Some(node) = self.morphology.nodes.get(&node_id) else {
            return;
        };
        let before = [node.x, node.y, node.z];
        if before == position {
            return;
        }
        self.commit(vec![TreeOp::Move {
            node_id,
            before,
            after: position,
        }]);
    }

    /// Retype a set of nodes in one batch. Nodes already of the target type
    /// (and unknown ids) are skipped.
    pub fn retype_nodes(&mut self, node_ids: &[i64], new_type: i32) {
        let mut ops = Vec::new();
        for &id in node_ids {
            let Some(node) = self.morphology.nodes.get(&id) else {
                continue;
            };
            if node.node_type == new_type {
                continue;
            }
            ops.push(TreeOp::Retype {
                node_id: id,
                before: node.node_type,
                after: new_type,
            });
        }
        self.commit(ops);
    }

    /// Attach `node_id` under `new_parent`. A reparent that would create a
    /// cycle (the node found on the walk from the proposed parent to its
    /// root) is dropped silently and nothing is recorded. Pass
    /// [`NO_PARENT`] to make the node a root.
    pub fn reparent(&mut self, node_id: i64, new_parent: i64) {
        let Some(node) = self.morphology.nodes.get(&node_id) else {
            return;
        };
        if node.parent_id == new_parent || node_id == new_parent {
            return;
        }
        if new_parent != NO_PARENT {
            if !self.morphology.nodes.contains_key(&new_parent) {
                return;
            }
            // Parent pointers may already contain a cycle (a parse with
            // warnings keeps them), so the walk is bounded by node count.
            let mut cur = new_parent;
            let mut hops = 0;
            loop {
                if cur == node_id {
                    debug!(node_id, new_parent, "reparent would create a cycle");
                    return;
                }
                hops += 1;
                if hops > self.morphology.nodes.len() {
                    debug!(node_id, new_parent, "reparent target has a cyclic ancestry");
                    return;
                }
                match self.morphology.nodes.get(&cur) {
                    Some(n) if n.parent_id != NO_PARENT => cur = n.parent_id,
                    _ => break,
                }
            }
        }
        let before = node.parent_id;
        self.commit(vec![TreeOp::Reparent {
            node_id,
            before,
            after: new_parent,
        }]);
    }

    /// Delete a set of nodes. Victims are removed deepest-first; each
    /// surviving child is reparented onto the victim's former parent, so
    /// grandchildren stay connected. Children that are themselves victims
    /// are left to their own delete op.
    pub fn delete_nodes(&mut self, node_ids: &[i64]) {
        let victims: BTreeSet<i64> = node_ids
            .iter()
            .copied()
            .filter(|id| self.morphology.nodes.contains_key(id))
            .collect();
        if victims.is_empty() {
            return;
        }

        let mut ordered: Vec<i64> = victims.iter().copied().collect();
        ordered.sort_by_key(|&id| std::cmp::Reverse(self.depth_of(id)));

        // Ops are applied to the working arena as they are generated, so a
        // victim chain cascades: a child freshly reparented onto a victim
        // gets reparented again when that victim goes.
        let mut nodes = self.morphology.nodes.clone();
        let mut ops = Vec::new();
        for victim_id in ordered {
            let victim = nodes[&victim_id];
            let surviving: Vec<i64> = nodes
                .values()
                .filter(|n| n.parent_id == victim_id && !victims.contains(&n.id))
                .map(|n| n.id)
                .collect();
            for child_id in surviving {
                let op = TreeOp::Reparent {
                    node_id: child_id,
                    before: victim_id,
                    after: victim.parent_id,
                };
                apply_ops(&mut nodes, std::slice::from_ref(&op));
                ops.push(op);
            }
            let op = TreeOp::Delete { node: victim };
            apply_ops(&mut nodes, std::slice::from_ref(&op));
            ops.push(op);
        }
        self.commit(ops);
    }

    /// Split the `parent → child` edge with a new node at `position`.
    /// Returns the fresh id, or `None` if the edge does not exist.
    pub fn insert_between(
        &mut self,
        parent_id: i64,
        child_id: i64,
        position: [f64; 3],
    ) -> Option<i64> {
        let parent = self.morphology.nodes.get(&parent_id)?;
        let child = self.morphology.nodes.get(&child_id)?;
        if child.parent_id != parent_id {
            return None;
        }
        let new_id = self.next_id();
        let node = SwcNode {
            id: new_id,
            node_type: parent.node_type,
            x: position[0],
            y: position[1],
            z: position[2],
            radius: (parent.radius + child.radius) / 2.0,
            parent_id,
        };
        self.commit(vec![
            TreeOp::Insert { node },
            TreeOp::Reparent {
                node_id: child_id,
                before: parent_id,
                after: new_id,
            },
        ]);
        Some(new_id)
    }

    /// Grow a new leaf under `parent_id` at `position`. Returns the fresh id.
    pub fn append_child(&mut self, parent_id: i64, position: [f64; 3]) -> Option<i64> {
        let parent = self.morphology.nodes.get(&parent_id)?;
        let new_id = self.next_id();
        let node = SwcNode {
            id: new_id,
            node_type: parent.node_type,
            x: position[0],
            y: position[1],
            z: position[2],
            radius: parent.radius.max(0.5),
            parent_id,
        };
        self.commit(vec![TreeOp::Insert { node }]);
        Some(new_id)
    }

    /// Delete `root_id` and everything below it. No reparenting: the whole
    /// subtree goes in one batch.
    pub fn prune_subtree(&mut self, root_id: i64) {
        if !self.morphology.nodes.contains_key(&root_id) {
            return;
        }
        let mut ordered: Vec<i64> =
            neurotrace_core::subtree(&self.morphology, root_id).into_keys().collect();
        ordered.sort_by_key(|&id| std::cmp::Reverse(self.depth_of(id)));
        let ops = ordered
            .into_iter()
            .map(|id| TreeOp::Delete {
                node: self.morphology.nodes[&id],
            })
            .collect();
        self.commit(ops);
    }

    pub fn undo(&mut self) -> bool {
        let Some(batch) = self.history.pop_back() else {
            return false;
        };
        apply_ops(&mut self.morphology.nodes, &invert_batch(&batch));
        self.redo.push(batch);
        self.recompute();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(batch) = self.redo.pop() else {
            return false;
        };
        apply_ops(&mut self.morphology.nodes, &batch);
        self.push_history(batch);
        self.recompute();
        true
    }

    fn commit(&mut self, ops: Vec<TreeOp>) {
        if ops.is_empty() {
            return;
        }
        debug!(ops = ops.len(), "applying edit batch");
        apply_ops(&mut self.morphology.nodes, &ops);
        self.push_history(ops);
        self.redo.clear();
        self.recompute();
    }

    fn push_history(&mut self, batch: Vec<TreeOp>) {
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(batch);
    }

    fn recompute(&mut self) {
        self.morphology.rebuild_index();
        self.stats = compute_stats(&self.morphology);
        let mut warnings = self.base_warnings.clone();
        warnings.extend(validate(&self.morphology));
        self.morphology.warnings = warnings;
    }

    fn next_id(&self) -> i64 {
        self.morphology.nodes.keys().next_back().copied().unwrap_or(0) + 1
    }

    fn depth_of(&self, id: i64) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(node) = self.morphology.nodes.get(&cur) {
            if node.parent_id == NO_PARENT {
                break;
            }
            if !self.morphology.nodes.contains_key(&node.parent_id) {
                break;
            }
            depth += 1;
            cur = node.parent_id;
            if depth > self.morphology.nodes.len() {
                break;
            }
        }
        depth
    }
}
