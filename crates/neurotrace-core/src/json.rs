//! SWC-JSON parser
//!
//! Accepts a bare array of node objects or an object wrapping one under a
//! conventional key, with synonymous field spellings normalized. Shares the
//! SWC warning vocabulary; hard-fails only on unparseable JSON, a missing
//! node collection, or zero surviving nodes.

use serde_json::Value;

use crate::error::ParseError;
use crate::model::{swc_type, Morphology, SwcNode, Warning, WarningKind};

const WRAPPER_KEYS: [&str; 4] = ["morphology", "reconstruction", "nodes", "data"];

fn node_array(raw: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(arr) = raw {
        return Some(arr);
    }
    if let Value::Object(obj) = raw {
        for key in WRAPPER_KEYS {
            if let Some(Value::Array(arr)) = obj.get(key) {
                return Some(arr);
            }
        }
    }
    None
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|v: &f64| !v.is_nan()),
        _ => None,
    }
}

fn field(obj: &serde_json::Map<String, Value>, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| obj.get(*name).and_then(to_number))
}

/// Parse SWC-JSON text into a [`Morphology`].
pub fn parse_swc_json(content: &str) -> Result<Morphology, ParseError> {
    let raw: Value = serde_json::from_str(content)?;
    let arr = node_array(&raw).ok_or(ParseError::NoNodeCollection)?;

    let mut result = Morphology::new();
    result.metadata.original_source = Some("SWC-JSON".to_string());

    for (i, entry) in arr.iter().enumerate() {
        let Value::Object(obj) = entry else {
            result.warnings.push(
                Warning::new(WarningKind::MalformedLine, format!("Entry {i}: not an object"))
                    .at_line(i + 1),
            );
            continue;
        };

        let id = field(obj, &["id", "ID", "Id"]);
        let Some(id) = id.filter(|v| v.fract() == 0.0) else {
            result.warnings.push(
                Warning::new(
                    WarningKind::MalformedLine,
                    format!("Entry {i}: missing or invalid 'id'"),
                )
                .at_line(i + 1),
            );
            continue;
        };
        let id = id as i64;

        let node_type = field(obj, &["type", "Type", "TYPE"]).unwrap_or(0.0) as i32;
        let x = field(obj, &["x", "X"]).unwrap_or(0.0);
        let y = field(obj, &["y", "Y"]).unwrap_or(0.0);
        let z = field(obj, &["z", "Z"]).unwrap_or(0.0);
        let radius = field(obj, &["radius", "r", "R", "Radius"]).unwrap_or(0.5);
        let parent_id = field(
            obj,
            &["parent_id", "parentId", "parent", "pid", "ParentId", "parent_ID"],
        )
        .unwrap_or(-1.0) as i64;

        if !(0..=7).contains(&node_type) {
            result.warnings.push(
                Warning::new(
                    WarningKind::UnknownType,
                    format!("Node {id}: unknown type {node_type}"),
                )
                .for_node(id),
            );
        }

        if result.nodes.contains_key(&id) {
            result.warnings.push(
                Warning::new(WarningKind::DuplicateId, format!("Duplicate node id: {id}"))
                    .for_node(id),
            );
            continue;
        }

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

    if result.nodes.is_empty() {
        return Err(ParseError::NoValidNodes);
    }

    crate::swc::build_tree_structure(&mut result);

    if result.roots.is_empty() {
        result.warnings.push(Warning::new(
            WarningKind::NoRoot,
            "No root nodes found (parent_id == -1)",
        ));
    }
    if !result.nodes.values().any(|n| n.node_type == swc_type::SOMA) {
        result.warnings.push(Warning::new(
            WarningKind::MissingSoma,
            "No soma nodes (type 1) found",
        ));
    }

    tracing::debug!(
        nodes = result.nodes.len(),
        roots = result.roots.len(),
        warnings = result.warnings.len(),
        "parsed SWC-JSON"
    );
    Ok(result)
}
