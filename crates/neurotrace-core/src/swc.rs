//! SWC text parser
//!
//! Single left-to-right pass over physical lines. Never fails: every
//! recoverable defect becomes a [`Warning`] and the rest of the file is
//! still used. CRLF and LF input parse to byte-identical trees.
//!
//! [`Warning`]: crate::model::Warning

use crate::meta::extract_metadata;
use crate::model::{swc_type, Morphology, SwcNode, Warning, WarningKind, NO_PARENT};

/// Parse the 7 whitespace-separated numeric fields of a data line.
/// Returns `None` on anything that is not exactly 7 finite numbers, so
/// `nan` and `inf` spellings are malformed rather than nodes.
fn parse_data_line(line: &str) -> Option<[f64; 7]> {
    let mut values = [0.0f64; 7];
    let mut count = 0;
    for field in line.split_ascii_whitespace() {
        if count == 7 {
            return None;
        }
        let v: f64 = field.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        values[count] = v;
        count += 1;
    }
    (count == 7).then_some(values)
}

/// Parse SWC-format text into a [`Morphology`].
pub fn parse_swc(content: &str) -> Morphology {
    let mut result = Morphology::new();
    if content.is_empty() {
        return result;
    }

    let mut prev_id: Option<i64> = None;
    let mut is_sequential = true;
    let mut has_soma = false;

    for (line_idx, raw_line) in content.split('\n').enumerate() {
        let line_num = line_idx + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            result.comments.push(line.to_string());
            extract_metadata(line, &mut result.metadata);
            continue;
        }

        let Some(values) = parse_data_line(line) else {
            result.warnings.push(
                Warning::new(WarningKind::MalformedLine, "Malformed data line")
                    .at_line(line_num),
            );
            continue;
        };

        let id = values[0] as i64;
        let node_type = values[1] as i32;
        let [x, y, z] = [values[2], values[3], values[4]];
        let radius = values[5];
        let parent_id = values[6] as i64;

        if result.nodes.contains_key(&id) {
            result.warnings.push(
                Warning::new(WarningKind::DuplicateId, format!("Duplicate node ID {id}"))
                    .at_line(line_num)
                    .for_node(id),
            );
            continue;
        }

        if !(0..=7).contains(&node_type) {
            result.warnings.push(
                Warning::new(
                    WarningKind::UnknownType,
                    format!("Unknown type code {node_type}"),
                )
                .at_line(line_num)
                .for_node(id),
            );
        }

        if !(0.0..=100.0).contains(&radius) {
            result.warnings.push(
                Warning::new(
                    WarningKind::RadiusOutlier,
                    format!("Radius {radius} outside expected range [0, 100]"),
                )
                .at_line(line_num)
                .for_node(id),
            );
        }

        if node_type == swc_type::SOMA {
            has_soma = true;
        }

        if is_sequential && prev_id.is_some_and(|prev| id != prev + 1) {
            is_sequential = false;
        }
        prev_id = Some(id);

        result.nodes.insert(
            id,
            SwcNode {
                id,
                node_type,
                x,
                y,
                z,
                radius,
                parent_id,
            },
        );
    }

    build_tree_structure(&mut result);

    // Post-parse heuristics
    if result.roots.is_empty() && !result.nodes.is_empty() {
        let min_id = *result.nodes.keys().next().expect("non-empty");
        result.warnings.push(
            Warning::new(
                WarningKind::NoRoot,
                format!("No root node found, using node {min_id} as root"),
            )
            .for_node(min_id),
        );
        result
            .nodes
            .get_mut(&min_id)
            .expect("non-empty")
            .parent_id = NO_PARENT;
        result.roots.push(min_id);
        // forcing a root changes a parent pointer, so the index must agree
        if let Some(children) = result.child_index.values_mut().find(|c| c.contains(&min_id)) {
            children.retain(|&c| c != min_id);
        }
        result.child_index.retain(|_, c| !c.is_empty());
    }

    if !is_sequential && result.nodes.len() > 1 {
        result.warnings.push(Warning::new(
            WarningKind::NonSequentialIds,
            "Node IDs are not sequential",
        ));
    }

    if !has_soma && !result.nodes.is_empty() {
        result.warnings.push(Warning::new(
            WarningKind::MissingSoma,
            "No soma (type 1) node found",
        ));
    }

    tracing::debug!(
        nodes = result.nodes.len(),
        roots = result.roots.len(),
        warnings = result.warnings.len(),
        "parsed SWC"
    );
    result
}

/// Second pass: derive roots and the child index from parent pointers.
/// A node whose parent is missing is severed and forced to root.
pub(crate) fn build_tree_structure(result: &mut Morphology) {
    let ids: Vec<i64> = result.nodes.keys().copied().collect();
    for id in ids {
        let parent_id = result.nodes[&id].parent_id;
        if parent_id == NO_PARENT {
            result.roots.push(id);
        } else if result.nodes.contains_key(&parent_id) {
            result.child_index.entry(parent_id).or_default().push(id);
        } else {
            result.warnings.push(
                Warning::new(
                    WarningKind::InvalidParent,
                    format!("Node {id} references missing parent {parent_id}"),
                )
                .for_node(id),
            );
            result.nodes.get_mut(&id).expect("present").parent_id = NO_PARENT;
            result.roots.push(id);
        }
    }
}
