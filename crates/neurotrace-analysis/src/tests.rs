//! Unit tests for neurotrace-analysis

use std::f64::consts::PI;

use neurotrace_core::{parse_swc, Morphology, SwcNode};

use crate::batch::{run_batch, BatchInput};
use crate::dendrogram::dendrogram_layout;
use crate::hull::convex_hull_volume;
use crate::morphometrics::{compute_morphometrics, strahler_orders};
use crate::pool::AnalysisPool;
use crate::sholl::{compute_sholl, sholl_csv};
use crate::snapshot::TreeSnapshot;

fn node(id: i64, node_type: i32, x: f64, y: f64, z: f64, radius: f64, parent_id: i64) -> SwcNode {
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

fn tree(nodes: Vec<SwcNode>) -> Morphology {
    let mut m = Morphology::new();
    for n in nodes {
        m.nodes.insert(n.id, n);
    }
    m.rebuild_index();
    m
}

fn snapshot(nodes: Vec<SwcNode>) -> TreeSnapshot {
    TreeSnapshot::from(&tree(nodes))
}

// ── Morphometrics ──────────────────────────────────────────

#[test]
fn frustum_totals_for_a_single_edge() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 0.0, 0.0, 3.0, 2.0, 1),
    ]);
    let m = compute_morphometrics(&s);

    assert!((m.total_length - 3.0).abs() < 1e-12);
    assert!((m.total_surface - PI * 3.0 * 3.0).abs() < 1e-9);
    assert!((m.total_volume - PI * 7.0).abs() < 1e-9);
    assert_eq!(m.tip_count, 1);
    assert_eq!(m.branch_count, 0);
}

#[test]
fn right_angle_branch() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 1.0, 0.0, 0.0, 0.5, 1),
        node(3, 3, 0.0, 1.0, 0.0, 0.5, 1),
    ]);
    let m = compute_morphometrics(&s);

    assert_eq!(m.branch_angles.len(), 1);
    assert!((m.branch_angles[0] - 90.0).abs() < 1e-9);
}

#[test]
fn strahler_bumps_only_when_all_children_tie() {
    // 1 → 2 → {3, 4}; 3 → {5, 6}. Tips are order 1; 3 joins two order-1
    // children → 2; 2 sees orders [2, 1] → stays 2; root inherits 2.
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 0.0, 1.0, 0.0, 0.5, 1),
        node(3, 3, -1.0, 2.0, 0.0, 0.5, 2),
        node(4, 3, 1.0, 2.0, 0.0, 0.5, 2),
        node(5, 3, -2.0, 3.0, 0.0, 0.5, 3),
        node(6, 3, 0.0, 3.0, 0.0, 0.5, 3),
    ]);
    let orders = strahler_orders(&s);

    assert_eq!(orders[&5], 1);
    assert_eq!(orders[&6], 1);
    assert_eq!(orders[&3], 2);
    assert_eq!(orders[&4], 1);
    assert_eq!(orders[&2], 2);
    assert_eq!(orders[&1], 2);
    assert_eq!(compute_morphometrics(&s).max_strahler_order, 2);
}

#[test]
fn strahler_three_way_tie_still_bumps() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, -1.0, 1.0, 0.0, 0.5, 1),
        node(3, 3, 0.0, 1.0, 0.0, 0.5, 1),
        node(4, 3, 1.0, 1.0, 0.0, 0.5, 1),
    ]);
    let orders = strahler_orders(&s);
    assert_eq!(orders[&1], 2);
}

#[test]
fn tip_path_lengths_walk_to_the_root() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 10.0, 0.0, 0.0, 0.5, 1),
        node(3, 3, 20.0, 0.0, 0.0, 0.5, 2),
    ]);
    let m = compute_morphometrics(&s);
    assert_eq!(m.tip_path_lengths, vec![20.0]);
}

#[test]
fn tortuosity_of_a_bent_chain() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 1.0, 0.0, 0.0, 0.5, 1),
        node(3, 3, 1.0, 1.0, 0.0, 0.5, 2),
    ]);
    let m = compute_morphometrics(&s);

    assert_eq!(m.segment_tortuosity.len(), 1);
    let seg = m.segment_tortuosity[0];
    assert_eq!(seg.node_id, 1);
    assert!((seg.value - 2.0 / 2.0f64.sqrt()).abs() < 1e-12);
}

// ── Convex hull ────────────────────────────────────────────

#[test]
fn hull_volume_of_a_unit_cube() {
    let mut points = Vec::new();
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                points.push([x, y, z]);
            }
        }
    }
    assert!((convex_hull_volume(&points) - 1.0).abs() < 1e-9);

    // interior points must not change the hull
    points.push([0.5, 0.5, 0.5]);
    points.push([0.25, 0.75, 0.5]);
    assert!((convex_hull_volume(&points) - 1.0).abs() < 1e-9);
}

#[test]
fn hull_volume_of_a_tetrahedron() {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    assert!((convex_hull_volume(&points) - 1.0 / 6.0).abs() < 1e-9);
}

#[test]
fn degenerate_hull_is_zero() {
    assert_eq!(convex_hull_volume(&[]), 0.0);
    assert_eq!(convex_hull_volume(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]), 0.0);
    // collinear
    let line: Vec<[f64; 3]> = (0..10).map(|i| [f64::from(i), 0.0, 0.0]).collect();
    assert_eq!(convex_hull_volume(&line), 0.0);
    // coplanar
    let plane = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.3, 0.7, 0.0],
    ];
    assert_eq!(convex_hull_volume(&plane), 0.0);
}

// ── Fractal dimension ──────────────────────────────────────

#[test]
fn fractal_dimension_of_a_line_is_near_one() {
    let nodes: Vec<SwcNode> = (0..=128)
        .map(|i| node(i + 1, 3, f64::from(i as i32), 0.0, 0.0, 0.5, i))
        .collect();
    let mut nodes = nodes;
    nodes[0].parent_id = -1;
    nodes[0].node_type = 1;
    let m = compute_morphometrics(&snapshot(nodes));

    assert!(
        m.fractal_dimension > 0.7 && m.fractal_dimension < 1.05,
        "got {}",
        m.fractal_dimension
    );
}

#[test]
fn fractal_dimension_guards_return_zero() {
    let m = compute_morphometrics(&snapshot(vec![node(1, 1, 0.0, 0.0, 0.0, 1.0, -1)]));
    assert_eq!(m.fractal_dimension, 0.0);
    assert!(!m.fractal_dimension.is_nan());
}

// ── Dendrogram ─────────────────────────────────────────────

#[test]
fn dendrogram_layout_of_a_y_tree() {
    let m = tree(vec![
        node(1, 1, 0.0, 0.0, 0.0, 2.0, -1),
        node(2, 3, 0.0, 10.0, 0.0, 1.0, 1),
        node(3, 3, -5.0, 20.0, 0.0, 0.5, 2),
        node(4, 3, 5.0, 20.0, 0.0, 0.5, 2),
    ]);
    let layout = dendrogram_layout(&m, 1);

    assert_eq!(layout.len(), 4);
    assert_eq!(layout[&1].x, 0.0);
    assert_eq!(layout[&2].x, 10.0);
    assert!((layout[&3].x - (10.0 + 125.0f64.sqrt())).abs() < 1e-9);

    // leaves take sequential indices, the branch sits at their midpoint
    assert_eq!(layout[&3].y, 0.0);
    assert_eq!(layout[&4].y, 1.0);
    assert_eq!(layout[&2].y, 0.5);
    assert!(layout[&2].is_branch);
    assert!(layout[&3].is_leaf);

    assert!(dendrogram_layout(&m, 999).is_empty());
}

// ── Sholl ──────────────────────────────────────────────────

#[test]
fn sholl_on_a_straight_chain() {
    let m = parse_swc(
        "1 1 0 0 0 1 -1\n2 3 10 0 0 0.5 1\n3 3 20 0 0 0.5 2\n4 3 30 0 0 0.5 3\n5 3 40 0 0 0.5 4\n",
    );
    let series = compute_sholl(&m, 10.0);

    let radii: Vec<f64> = series.iter().map(|p| p.radius).collect();
    assert_eq!(radii, vec![10.0, 20.0, 30.0, 40.0]);
    for point in &series {
        assert_eq!(point.intersections, 1, "at r={}", point.radius);
    }
}

#[test]
fn sholl_empty_and_invalid_inputs() {
    let empty = Morphology::new();
    assert!(compute_sholl(&empty, 10.0).is_empty());

    let m = parse_swc("1 1 0 0 0 1 -1\n2 3 10 0 0 0.5 1\n");
    assert!(compute_sholl(&m, 0.0).is_empty());
    assert!(compute_sholl(&m, -1.0).is_empty());
}

#[test]
fn sholl_csv_output() {
    let m = parse_swc("1 1 0 0 0 1 -1\n2 3 10 0 0 0.5 1\n");
    let csv = sholl_csv(&compute_sholl(&m, 10.0));
    assert_eq!(csv, "radius,intersections\n10,1\n");
}

// ── Pool & batch ───────────────────────────────────────────

#[test]
fn pool_matches_direct_computation() {
    let s = snapshot(vec![
        node(1, 1, 0.0, 0.0, 0.0, 1.0, -1),
        node(2, 3, 0.0, 0.0, 3.0, 2.0, 1),
    ]);
    let direct = compute_morphometrics(&s);

    let pool = AnalysisPool::new(2);
    let pooled = pool.compute_blocking(s).expect("pool result");
    assert_eq!(direct, pooled);
}

#[test]
fn batch_reports_every_file_and_isolates_failures() {
    let files = vec![
        BatchInput {
            file_name: "good.swc".into(),
            content: "1 1 0 0 0 1 -1\n2 3 10 0 0 0.5 1\n".into(),
        },
        BatchInput {
            file_name: "bad.json".into(),
            content: "not json at all".into(),
        },
        BatchInput {
            file_name: "also-good.swc".into(),
            content: "1 1 0 0 0 1 -1\n".into(),
        },
    ];

    let handle = run_batch(files, Some(2));
    let mut records: Vec<_> = handle.results.iter().collect();
    assert_eq!(records.len(), 3);
    assert_eq!(handle.done(), 3);

    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    assert_eq!(records[0].file_name, "also-good.swc");
    assert!(records[0].error.is_none());
    assert!(records[1].error.is_some());
    assert_eq!(records[2].node_count, 2);
    assert!((records[2].total_length - 10.0).abs() < 1e-12);
}

#[test]
fn batch_cancel_stops_dispatch() {
    let files: Vec<BatchInput> = (0..32)
        .map(|i| BatchInput {
            file_name: format!("{i}.swc"),
            content: "1 1 0 0 0 1 -1\n2 3 10 0 0 0.5 1\n".into(),
        })
        .collect();

    let handle = run_batch(files, Some(1));
    handle.cancel();
    let received = handle.results.iter().count();
    // cancellation is racy by nature, but it must never exceed the total
    assert!(received <= handle.total());
}
