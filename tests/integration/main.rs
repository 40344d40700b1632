//! Integration tests for NeuroTrace
//!
//! These tests verify that multiple crates work together correctly:
//! parse → edit → serialize, and the cross-format pipeline into the
//! analysis layer.

use std::fs;

use tempfile::TempDir;

use neurotrace_analysis::{
    compute_morphometrics, compute_sholl, run_batch, BatchInput, TreeSnapshot,
};
use neurotrace_core::{
    compute_stats, parse_file, parse_swc, serialize, validate, NeuronFormat,
};
use neurotrace_edit::EditEngine;

const SAMPLE_SWC: &str = "\
# ORIGINAL_SOURCE integration test
# CREATURE mouse
1 1 0 0 0 5 -1
2 3 0 10 0 1 1
3 3 0 20 0 0.8 2
4 3 -10 30 0 0.5 3
5 3 10 30 0 0.5 3
";

const SAMPLE_ASC: &str = "\
(\"CellBody\"
  (CellBody)
  (0 0 0 10)
)
( (Dendrite)
  (0 0 0 2)
  (0 10 0 1)
)
";

/// Parse, edit with undo, re-serialize, and re-parse: the round trip must
/// preserve the edited tree exactly.
#[test]
fn parse_edit_serialize_round_trip() {
    let m = parse_file("neuron.swc", SAMPLE_SWC).expect("swc parses");
    assert_eq!(m.node_count(), 5);
    assert_eq!(m.metadata.original_source.as_deref(), Some("integration test"));

    let mut engine = EditEngine::new(m);
    engine.move_node(4, [-12.0, 32.0, 0.0]);
    let leaf = engine.append_child(5, [12.0, 40.0, 0.0]).expect("new leaf");
    engine.prune_subtree(leaf);
    assert!(engine.undo());
    assert_eq!(engine.morphology().node_count(), 6);

    let swc = serialize(engine.morphology());
    let reparsed = parse_swc(&swc);
    assert_eq!(reparsed.nodes, engine.morphology().nodes);
    assert_eq!(reparsed.comments, engine.morphology().comments);
}

/// Every input format lands in the same canonical shape and flows into
/// stats, validation, and morphometrics without special-casing.
#[test]
fn all_formats_feed_the_analysis_layer() {
    let json = r#"{"morphology": {"nodes": [
        {"id": 1, "type": 1, "x": 0, "y": 0, "z": 0, "radius": 5, "parent": -1},
        {"id": 2, "type": 3, "x": 0, "y": 10, "z": 0, "radius": 1, "parent": 1}
    ]}}"#;

    for (name, content) in [
        ("cell.swc", SAMPLE_SWC),
        ("cell.json", json),
        ("cell.asc", SAMPLE_ASC),
    ] {
        let m = parse_file(name, content).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(m.node_count() >= 2, "{name} produced too few nodes");
        assert!(validate(&m).is_empty(), "{name} failed validation");

        let stats = compute_stats(&m);
        assert!(stats.total_length > 0.0, "{name} has zero cable");

        let metrics = compute_morphometrics(&TreeSnapshot::from(&m));
        assert_eq!(metrics.tip_count, stats.terminal_tips, "{name} tip mismatch");
    }
}

#[test]
fn format_detection_is_extension_based() {
    assert_eq!(NeuronFormat::from_name("a.SWC"), Some(NeuronFormat::Swc));
    assert_eq!(NeuronFormat::from_name("a.Json"), Some(NeuronFormat::SwcJson));
    assert_eq!(NeuronFormat::from_name("a.asc"), Some(NeuronFormat::NeurolucidaAsc));
    assert!(parse_file("a.txt", "1 1 0 0 0 1 -1").is_err());
}

/// Convert through a real temp directory the way the CLI does.
#[test]
fn convert_via_filesystem() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("cell.asc");
    let output = dir.path().join("cell.swc");
    fs::write(&input, SAMPLE_ASC).expect("write input");

    let content = fs::read_to_string(&input).expect("read input");
    let m = parse_file("cell.asc", &content).expect("asc parses");
    fs::write(&output, serialize(&m)).expect("write output");

    let round = parse_file("cell.swc", &fs::read_to_string(&output).expect("read output"))
        .expect("swc parses");
    assert_eq!(round.nodes, m.nodes);
    assert_eq!(
        round.metadata.original_source.as_deref(),
        Some("Neurolucida ASC")
    );
}

/// Sholl on an edited tree reflects the edit.
#[test]
fn sholl_after_edit() {
    let m = parse_file("neuron.swc", SAMPLE_SWC).expect("swc parses");
    let before = compute_sholl(&m, 10.0);

    let mut engine = EditEngine::new(m);
    engine.prune_subtree(3);
    let after = compute_sholl(engine.morphology(), 10.0);

    assert!(before.len() > after.len());
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].intersections, 1);
}

/// Batch results cover every input and keep failures isolated.
#[test]
fn batch_over_mixed_inputs() {
    let handle = run_batch(
        vec![
            BatchInput {
                file_name: "ok.swc".into(),
                content: SAMPLE_SWC.into(),
            },
            BatchInput {
                file_name: "bad.json".into(),
                content: "{}".into(),
            },
        ],
        Some(2),
    );
    let records: Vec<_> = handle.results.iter().collect();
    assert_eq!(records.len(), 2);

    let ok = records.iter().find(|r| r.file_name == "ok.swc").expect("ok row");
    assert_eq!(ok.node_count, 5);
    assert!(ok.error.is_none());

    let bad = records.iter().find(|r| r.file_name == "bad.json").expect("bad row");
    assert!(bad.error.is_some());
}
