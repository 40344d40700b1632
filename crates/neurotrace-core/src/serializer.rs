//! Canonical round-trip writer
//!
//! Preserves original comments verbatim, backfills structured metadata that
//! is not already present, and emits nodes in ascending id order. Floats use
//! shortest round-trip formatting, so `serialize(parse(x))` reproduces every
//! node field exactly.

use crate::meta::{comment_has_key, METADATA_KEYS};
use crate::model::Morphology;

pub fn serialize(result: &Morphology) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(result.comments.len() + result.nodes.len());

    for comment in &result.comments {
        lines.push(comment.clone());
    }

    let metadata_values = [
        result.metadata.original_source.as_deref(),
        result.metadata.species.as_deref(),
        result.metadata.brain_region.as_deref(),
        result.metadata.cell_type.as_deref(),
    ];
    for (key, value) in METADATA_KEYS.iter().zip(metadata_values) {
        let Some(value) = value else { continue };
        let already_present = result.comments.iter().any(|c| comment_has_key(c, key));
        if !already_present {
            lines.push(format!("# {key} {value}"));
        }
    }

    // BTreeMap iteration is already in ascending id order
    for node in result.nodes.values() {
        lines.push(format!(
            "{} {} {} {} {} {} {}",
            node.id, node.node_type, node.x, node.y, node.z, node.radius, node.parent_id
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
