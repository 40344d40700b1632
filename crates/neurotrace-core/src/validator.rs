//! Structural validation of a parsed morphology
//!
//! Pure function over the tree; returns extra warnings, mutates nothing.
//! Traversal follows the child index exactly as given, independent of
//! whether the parent pointers agree with it, so corruption injected
//! directly into the index is still caught.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Morphology, Warning, WarningKind};

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detect cycles and disconnected components.
///
/// Iterative DFS with explicit enter/exit frames and white/gray/black
/// coloring — reconstructed neurons routinely exceed 10⁴ nodes of depth,
/// which would overflow native recursion.
pub fn validate(result: &Morphology) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if result.nodes.is_empty() {
        return warnings;
    }

    let mut color: BTreeMap<i64, Color> =
        result.nodes.keys().map(|&id| (id, Color::White)).collect();
    let mut visited: BTreeSet<i64> = BTreeSet::new();

    struct Frame {
        id: i64,
        entering: bool,
    }

    for &root_id in &result.roots {
        let mut stack = vec![Frame {
            id: root_id,
            entering: true,
        }];

        while let Some(frame) = stack.pop() {
            if !frame.entering {
                color.insert(frame.id, Color::Black);
                continue;
            }

            match color.get(&frame.id) {
                Some(Color::Gray) => {
                    warnings.push(
                        Warning::new(
                            WarningKind::CycleDetected,
                            format!("Cycle detected involving node {}", frame.id),
                        )
                        .for_node(frame.id),
                    );
                    continue;
                }
                Some(Color::Black) => continue,
                _ => {}
            }

            color.insert(frame.id, Color::Gray);
            visited.insert(frame.id);

            stack.push(Frame {
                id: frame.id,
                entering: false,
            });

            for &child_id in result.children(frame.id) {
                match color.get(&child_id) {
                    Some(Color::Gray) => {
                        warnings.push(
                            Warning::new(
                                WarningKind::CycleDetected,
                                format!("Cycle detected: edge from {} to {child_id}", frame.id),
                            )
                            .for_node(child_id),
                        );
                    }
                    Some(Color::White) => stack.push(Frame {
                        id: child_id,
                        entering: true,
                    }),
                    _ => {}
                }
            }
        }
    }

    for &id in result.nodes.keys() {
        if !visited.contains(&id) {
            warnings.push(
                Warning::new(
                    WarningKind::DisconnectedComponent,
                    format!("Node {id} is not reachable from any root"),
                )
                .for_node(id),
            );
        }
    }

    warnings
}
