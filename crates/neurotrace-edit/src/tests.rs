//! Unit tests for neurotrace-edit

use neurotrace_core::{parse_swc, SwcNode, WarningKind, NO_PARENT};

use crate::engine::EditEngine;
use crate::ops::{apply_ops, invert_batch, TreeOp};

fn engine(swc: &str) -> EditEngine {
    EditEngine::new(parse_swc(swc))
}

const Y_TREE: &str = "\
1 1 0 0 0 2 -1
2 3 0 10 0 1 1
3 3 -5 20 0 0.5 2
4 3 5 20 0 0.5 2
";

const CHAIN: &str = "\
1 1 0 0 0 1 -1
2 3 0 10 0 0.5 1
3 3 0 20 0 0.5 2
";

#[test]
fn move_undo_redo() {
    let mut e = engine(CHAIN);
    e.move_node(3, [1.0, 2.0, 3.0]);
    assert_eq!(e.morphology().nodes[&3].x, 1.0);
    assert!(e.can_undo());

    assert!(e.undo());
    let n = &e.morphology().nodes[&3];
    assert_eq!((n.x, n.y, n.z), (0.0, 20.0, 0.0));
    assert!(e.can_redo());

    assert!(e.redo());
    assert_eq!(e.morphology().nodes[&3].z, 3.0);
    assert!(!e.can_redo());
}

#[test]
fn undo_on_empty_history_is_refused() {
    let mut e = engine(CHAIN);
    assert!(!e.undo());
    assert!(!e.redo());
}

#[test]
fn noop_edits_are_not_recorded() {
    let mut e = engine(CHAIN);
    e.move_node(2, [0.0, 10.0, 0.0]);
    e.move_node(999, [1.0, 1.0, 1.0]);
    e.retype_nodes(&[2], 3);
    assert!(!e.can_undo());
}

#[test]
fn retype_batch_skips_already_typed() {
    let mut e = engine(Y_TREE);
    e.retype_nodes(&[2, 3, 4], 4);
    assert_eq!(e.morphology().nodes[&2].node_type, 4);
    assert_eq!(e.morphology().nodes[&4].node_type, 4);

    // one batch, one undo
    assert!(e.undo());
    assert_eq!(e.morphology().nodes[&2].node_type, 3);
    assert!(!e.can_undo());
}

#[test]
fn reparent_updates_index() {
    let mut e = engine(CHAIN);
    e.reparent(3, 1);
    assert_eq!(e.morphology().children(1), &[2, 3]);
    assert_eq!(e.morphology().children(2), &[] as &[i64]);
    assert_eq!(e.stats().terminal_tips, 2);
}

#[test]
fn reparent_into_own_subtree_is_silently_dropped() {
    let mut e = engine(CHAIN);
    // node 1's subtree contains node 3
    e.reparent(1, 3);
    assert_eq!(e.morphology().nodes[&1].parent_id, NO_PARENT);
    assert!(!e.can_undo());

    e.reparent(2, 2);
    assert!(!e.can_undo());
}

#[test]
fn reparent_onto_cyclic_ancestry_terminates_and_is_dropped() {
    // 2 and 3 point at each other; a root exists, so the parse keeps the
    // cycle and only warns. The ancestry walk must not spin on it.
    let mut e = engine("1 1 0 0 0 1 -1\n2 3 0 1 0 0.5 3\n3 3 0 2 0 0.5 2\n");
    e.reparent(1, 2);
    assert_eq!(e.morphology().nodes[&1].parent_id, NO_PARENT);
    assert!(!e.can_undo());
}

#[test]
fn reparent_to_no_parent_makes_a_root() {
    let mut e = engine(CHAIN);
    e.reparent(3, NO_PARENT);
    assert_eq!(e.morphology().roots, vec![1, 3]);
}

#[test]
fn delete_reparents_surviving_children() {
    let mut e = engine(CHAIN);
    e.delete_nodes(&[2]);
    assert_eq!(e.morphology().node_count(), 2);
    assert_eq!(e.morphology().nodes[&3].parent_id, 1);
    assert_eq!(e.morphology().children(1), &[3]);

    assert!(e.undo());
    assert_eq!(e.morphology().node_count(), 3);
    assert_eq!(e.morphology().nodes[&3].parent_id, 2);
}

#[test]
fn delete_chain_cascades_reparenting() {
    // deleting 2 and 3 together leaves 4 hanging off the soma
    let mut e = engine(
        "1 1 0 0 0 1 -1\n2 3 0 10 0 0.5 1\n3 3 0 20 0 0.5 2\n4 3 0 30 0 0.5 3\n",
    );
    e.delete_nodes(&[2, 3]);
    assert_eq!(e.morphology().node_count(), 2);
    assert_eq!(e.morphology().nodes[&4].parent_id, 1);

    assert!(e.undo());
    assert_eq!(e.morphology().nodes[&4].parent_id, 3);
    assert_eq!(e.morphology().nodes[&3].parent_id, 2);
}

#[test]
fn insert_between_splits_the_edge() {
    let mut e = engine(CHAIN);
    let new_id = e.insert_between(1, 2, [0.0, 5.0, 0.0]);
    assert_eq!(new_id, Some(4));

    let m = e.morphology();
    assert_eq!(m.nodes[&2].parent_id, 4);
    assert_eq!(m.nodes[&4].parent_id, 1);
    assert_eq!(m.nodes[&4].node_type, 1);
    assert_eq!(m.nodes[&4].radius, (1.0 + 0.5) / 2.0);

    // not an edge
    assert_eq!(e.insert_between(1, 3, [0.0, 0.0, 0.0]), None);

    assert!(e.undo());
    assert!(!e.morphology().nodes.contains_key(&4));
    assert_eq!(e.morphology().nodes[&2].parent_id, 1);
}

#[test]
fn append_child_grows_a_leaf() {
    let mut e = engine(CHAIN);
    let new_id = e.append_child(3, [0.0, 30.0, 0.0]).expect("leaf id");
    assert_eq!(new_id, 4);
    let node = &e.morphology().nodes[&4];
    assert_eq!(node.parent_id, 3);
    assert_eq!(node.radius, 0.5);
    assert_eq!(e.stats().total_nodes, 4);

    // thin parent radius is clamped up
    let mut e = engine("1 1 0 0 0 0.1 -1\n");
    let id = e.append_child(1, [1.0, 0.0, 0.0]).expect("leaf id");
    assert_eq!(e.morphology().nodes[&id].radius, 0.5);
}

#[test]
fn prune_subtree_removes_everything_below() {
    let mut e = engine(Y_TREE);
    e.prune_subtree(2);
    assert_eq!(e.morphology().node_count(), 1);
    assert_eq!(e.morphology().roots, vec![1]);
    assert_eq!(e.stats().terminal_tips, 1);

    assert!(e.undo());
    assert_eq!(e.morphology().node_count(), 4);
    assert_eq!(e.morphology().children(2), &[3, 4]);
}

#[test]
fn history_is_bounded() {
    let mut e = engine(CHAIN);
    for i in 0..120 {
        e.move_node(3, [f64::from(i), 0.0, 0.0]);
    }
    let mut undone = 0;
    while e.undo() {
        undone += 1;
    }
    assert_eq!(undone, 100);
    // position is from the oldest retained batch, not the original parse
    assert_eq!(e.morphology().nodes[&3].x, 19.0);
}

#[test]
fn new_edit_clears_redo() {
    let mut e = engine(CHAIN);
    e.move_node(3, [1.0, 0.0, 0.0]);
    assert!(e.undo());
    e.move_node(3, [2.0, 0.0, 0.0]);
    assert!(!e.can_redo());
}

#[test]
fn base_warnings_survive_edits() {
    // malformed second line yields a parse warning that must stay attached
    let mut e = engine("1 1 0 0 0 1 -1\nbogus line\n2 3 0 10 0 0.5 1\n");
    assert!(e
        .morphology()
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::MalformedLine));

    e.move_node(2, [5.0, 5.0, 5.0]);
    assert!(e
        .morphology()
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::MalformedLine));
}

#[test]
fn invert_batch_restores_node_state() {
    let m = parse_swc(CHAIN);
    let mut nodes = m.nodes.clone();
    let batch = vec![
        TreeOp::Move {
            node_id: 3,
            before: [0.0, 20.0, 0.0],
            after: [9.0, 9.0, 9.0],
        },
        TreeOp::Delete { node: m.nodes[&2] },
        TreeOp::Insert {
            node: SwcNode {
                id: 10,
                node_type: 3,
                x: 0.0,
                y: 0.0,
                z: 0.0,
                radius: 0.5,
                parent_id: 1,
            },
        },
    ];
    apply_ops(&mut nodes, &batch);
    assert!(nodes.contains_key(&10));
    assert!(!nodes.contains_key(&2));

    apply_ops(&mut nodes, &invert_batch(&batch));
    assert_eq!(nodes, m.nodes);
}
