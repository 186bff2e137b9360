//! Integration tests for the normalize, classify, diff and highlight pipeline.

use tune_guard::classify::classify;
use tune_guard::prelude::*;

const TIMING_BASE: &str = "\
[Table3D]
0.25 0.50 0.75 1.00
1000 10.0 12.0 14.0 16.0
2000 15.0 17.0 19.0 21.0
3000 20.0 22.0 24.0 26.0
";

const TIMING_MODIFIED_JSON: &str = r#"{
    "axes": {"x": [1000, 2000, 3000], "y": [0.25, 0.5, 0.75, 1.0]},
    "data": [
        [10.0, 12.0, 14.0, 16.0],
        [15.0, 18.5, 19.0, 21.0],
        [20.0, 22.0, 23.0, 26.0]
    ]
}"#;

#[test]
fn test_legacy_and_structured_tables_compare() {
    let original = normalize(TableInput::text(TIMING_BASE)).unwrap();
    let modified = normalize_json(TIMING_MODIFIED_JSON).unwrap();
    assert_eq!(original.dimension(), Dimension::Two);
    assert_eq!(modified.dimension(), Dimension::Two);

    let diff = diff(&original, &modified).unwrap();
    let summary = diff.summary();
    assert_eq!(summary.total_cells, 12);
    assert_eq!(summary.changed_cell_count, 2);
    assert_eq!(summary.increased_count, 1);
    assert_eq!(summary.decreased_count, 1);
    assert_eq!(summary.avg_abs_change, Some(1.25));
    assert_eq!(summary.max_abs_change, Some(1.5));

    let changes = diff.changes();
    assert_eq!(changes[0].0, CellIndex::new(None, 1, 1));
    assert_eq!(changes[0].1.direction(), ChangeDirection::Increased);
    assert_eq!(changes[1].0, CellIndex::new(None, 2, 2));
    assert_eq!(changes[1].1.direction(), ChangeDirection::Decreased);
}

#[test]
fn test_legacy_example_block() {
    let table = normalize(TableInput::text("[Table2D]\n1000 2000 3000\n10.5 11.0 11.5")).unwrap();
    assert_eq!(table.dimension(), Dimension::One);
    assert_eq!(
        serde_json::to_value(&table).unwrap(),
        serde_json::json!({"axes": {"x": [1000.0, 2000.0, 3000.0]}, "data": [[10.5, 11.0, 11.5]]})
    );
}

#[test]
fn test_classification_examples() {
    let cases = [
        (r#"{"axes": {"x": [1, 2, 3]}, "data": [[1, 2, 3]]}"#, Dimension::One),
        (r#"{"axes": {"x": [1, 2], "y": [1, 2]}, "data": [[1, 2], [3, 4]]}"#, Dimension::Two),
        (r#"{"axes": {"x": [1], "y": [1, 2]}, "data": [[[1, 2]], [[3, 4]]]}"#, Dimension::Three),
    ];
    for (json, expected) in cases {
        let input = match TableInput::from_json(json).unwrap() {
            TableInput::Structured(input) => input,
            other => panic!("expected structured input, got {other:?}"),
        };
        assert_eq!(classify(&input), expected, "{json}");
        assert_eq!(normalize(input).unwrap().dimension(), expected);
    }
}

#[test]
fn test_axis_mismatch_is_never_compared_positionally() {
    let a = normalize_json(r#"{"axes": {"x": [1, 2, 3]}, "data": [5, 6, 7]}"#).unwrap();
    let b = normalize_json(r#"{"axes": {"x": [1, 2, 4]}, "data": [5, 6, 7]}"#).unwrap();
    match diff(&a, &b).unwrap_err() {
        TuneError::AxisMismatch { axis, .. } => assert_eq!(axis, "x"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_malformed_tokens_survive_as_nan() {
    let original = normalize(TableInput::text("[Table3D]\n1 2\n100 5 oops\n200 7 8")).unwrap();
    let modified = normalize(TableInput::text("[Table3D]\n1 2\n100 5 9\n200 7 8")).unwrap();

    // the table with a NaN cell still diffs against itself and against a clean copy
    assert!(diff(&original, &original).unwrap().summary().is_unchanged());
    let summary = diff(&original, &modified).unwrap().summary().clone();
    assert_eq!(summary.changed_cell_count, 0);
    assert_eq!(summary.incomparable_count, 1);

    // and serializes the NaN as null
    let json = serde_json::to_string(&original).unwrap();
    assert!(json.contains("[5.0,null]"));
}

#[test]
fn test_skipped_rows_shrink_the_table() {
    let table = normalize(TableInput::text(
        "[Table3D]\n1 2\n100 5 6\n150 bad\n200 7 8\n",
    ))
    .unwrap();
    assert_eq!(table.axes().x, Some(Axis::from([100.0, 200.0])));
    assert_eq!(table.cell_count(), 4);
}

#[test]
fn test_error_kinds_are_distinguishable() {
    let unrecognized = normalize(TableInput::text("TABLE 1 2 3")).unwrap_err();
    assert!(matches!(unrecognized, TuneError::UnrecognizedFormat { .. }));
    assert!(unrecognized.is_malformed_input());

    let shape = normalize_json(r#"{"axes": {"x": [1, 2]}, "data": [1, 2, 3]}"#).unwrap_err();
    assert!(matches!(shape, TuneError::ShapeInvariantViolation { .. }));
    assert!(shape.is_malformed_input());

    let a = normalize_json(r#"{"axes": {"x": [1]}, "data": [1]}"#).unwrap();
    let b = normalize_json(r#"{"axes": {"x": [1], "y": [1, 2]}, "data": [[1, 2]]}"#).unwrap();
    let mismatch = diff(&a, &b).unwrap_err();
    assert!(matches!(mismatch, TuneError::AxisMismatch { .. }));
    assert!(!mismatch.is_malformed_input());
}

#[test]
fn test_highlight_stacked_table() {
    let table = normalize_json(
        r#"{
            "axes": {"x": [1000, 2000], "y": [0.5, 1.0], "z": [90, 100]},
            "data": [
                [[10, 10.5], [10.2, 10.4]],
                [[10, 10.5], [30, 30.2]]
            ]
        }"#,
    )
    .unwrap();
    let mask = highlight(&table, 0.10).unwrap();
    assert_eq!(mask.flagged(), vec![CellIndex::new(Some(1), 1, 0)]);
    assert_eq!(
        mask.cells(),
        &Grid::Stack(vec![
            vec![vec![false, false], vec![false, false]],
            vec![vec![false, false], vec![true, false]],
        ])
    );
}

#[test]
fn test_spike_example_row() {
    let table = Table::vector([1.0, 2.0, 3.0, 4.0], vec![10.0, 10.5, 20.0, 20.3]).unwrap();
    let mask = highlight(&table, 0.10).unwrap();
    assert_eq!(mask.cells(), &Grid::Vector(vec![false, false, true, false]));
}

#[test]
fn test_config_drives_components() {
    let config = GuardConfig::from_json(r#"{"anomalyThreshold": 1.0}"#).unwrap();
    let table = Table::vector([1.0, 2.0, 3.0, 4.0], vec![10.0, 10.5, 20.0, 20.3]).unwrap();
    assert_eq!(config.highlighter().unwrap().highlight(&table).flagged_count(), 0);
}
