//! By-value tree snapshot handed to analysis workers
//!
//! Ownership of a snapshot transfers to the worker for the duration of one
//! computation; caller and worker never share mutable state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use neurotrace_core::{Morphology, SwcNode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub nodes: BTreeMap<i64, SwcNode>,
    pub child_index: BTreeMap<i64, Vec<i64>>,
}

impl TreeSnapshot {
    pub fn children(&self, id: i64) -> &[i64] {
        self.child_index.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<&Morphology> for TreeSnapshot {
    fn from(m: &Morphology) -> Self {
        TreeSnapshot {
            nodes: m.nodes.clone(),
            child_index: m.child_index.clone(),
        }
    }
}
