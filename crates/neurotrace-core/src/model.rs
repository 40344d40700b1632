//! Core data structures for the canonical morphology tree

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Conventional SWC type codes (0–7). The range is a convention, not a
/// constraint — out-of-range codes parse fine and only raise a warning.
pub mod swc_type {
    pub const UNDEFINED: i32 = 0;
    pub const SOMA: i32 = 1;
    pub const AXON: i32 = 2;
    pub const BASAL_DENDRITE: i32 = 3;
    pub const APICAL_DENDRITE: i32 = 4;
    pub const CUSTOM5: i32 = 5;
    pub const CUSTOM6: i32 = 6;
    pub const CUSTOM7: i32 = 7;
}

/// Sentinel parent id marking a root node.
pub const NO_PARENT: i64 = -1;

/// A single traced point. Ids are caller-assigned and need not be
/// sequential; positions are conventionally micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwcNode {
    pub id: i64,
    pub node_type: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    pub parent_id: i64,
}

/// Discriminates what kind of defect a warning describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    // ── Per-line / per-node parse defects ───────────────────
    MalformedLine,
    DuplicateId,
    UnknownType,
    InvalidParent,
    RadiusOutlier,

    // ── Whole-tree parse heuristics ─────────────────────────
    NoRoot,
    NonSequentialIds,
    MissingSoma,

    // ── Structural validation ───────────────────────────────
    CycleDetected,
    DisconnectedComponent,
}

/// Triage level for UI presentation. Never alters parsing or validation
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A recoverable defect. Anything describable as "this line/node is wrong,
/// the rest is usable" becomes one of these instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// 1-based source line, where one exists.
    pub line: Option<usize>,
    pub node_id: Option<i64>,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Warning {
            kind,
            message: message.into(),
            line: None,
            node_id: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn for_node(mut self, node_id: i64) -> Self {
        self.node_id = Some(node_id);
        self
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            WarningKind::CycleDetected | WarningKind::DisconnectedComponent => Severity::Error,
            WarningKind::NonSequentialIds => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// Structured metadata extracted from `# KEY value` header comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub original_source: Option<String>,
    pub species: Option<String>,
    pub brain_region: Option<String>,
    pub cell_type: Option<String>,
}

/// The canonical parsed tree. All three parsers emit this shape.
///
/// `nodes` is the arena (id → node); `roots` and `child_index` are derived
/// from the parent pointers and rebuilt wholesale after any mutation, never
/// patched incrementally. Nodes live in a `BTreeMap`, so iteration — and
/// therefore every children list — is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Morphology {
    pub nodes: BTreeMap<i64, SwcNode>,
    pub roots: Vec<i64>,
    pub child_index: BTreeMap<i64, Vec<i64>>,
    /// Header comment lines, verbatim, for round-trip fidelity.
    pub comments: Vec<String>,
    pub metadata: Metadata,
    pub warnings: Vec<Warning>,
}

impl Morphology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of `id` in ascending-id order. Empty slice for leaves and
    /// unknown ids.
    pub fn children(&self, id: i64) -> &[i64] {
        self.child_index.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First soma-typed node (ascending id), falling back to the first root.
    pub fn soma(&self) -> Option<&SwcNode> {
        self.nodes
            .values()
            .find(|n| n.node_type == swc_type::SOMA)
            .or_else(|| self.roots.first().and_then(|id| self.nodes.get(id)))
    }

    /// Rebuild `roots` and `child_index` from the parent pointers.
    ///
    /// A node whose parent is absent from the arena is treated as a root;
    /// callers that want a warning for that case (the parsers) do their own
    /// index pass instead.
    pub fn rebuild_index(&mut self) {
        self.roots.clear();
        self.child_index.clear();
        let ids: Vec<i64> = self.nodes.keys().copied().collect();
        for id in ids {
            let parent_id = self.nodes[&id].parent_id;
            if parent_id == NO_PARENT || !self.nodes.contains_key(&parent_id) {
                self.roots.push(id);
            } else {
                self.child_index.entry(parent_id).or_default().push(id);
            }
        }
    }
}

/// Euclidean distance between two nodes.
pub fn distance(a: &SwcNode, b: &SwcNode) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}
