//! Integration tests for table and change-list export.

use tune_guard::prelude::*;

fn two_layer_stack() -> Table {
    normalize_json(r#"{"axes": {"x": [1], "y": [1, 2]}, "data": [[[1, 2]], [[3, 4]]]}"#).unwrap()
}

#[test]
fn test_matrix_rows_match_data() {
    let table =
        normalize_json(r#"{"axes": {"x": [1, 2], "y": [1, 2]}, "data": [[1, 2], [3, 4]]}"#)
            .unwrap();
    let rows = to_rows(&table);
    let numbers: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| row.iter().filter_map(ExportCell::as_number).collect())
        .collect();
    assert_eq!(numbers, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    assert_eq!(to_delimited_text(&rows), "1,2\n3,4");
}

#[test]
fn test_stack_flattening() {
    let rows = to_rows(&two_layer_stack());
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        serde_json::json!([["Layer 0"], [1.0, 2.0], [], ["Layer 1"], [3.0, 4.0], []])
    );
    assert_eq!(to_delimited_text(&rows), "Layer 0\n1,2\n\nLayer 1\n3,4\n");
}

#[test]
fn test_stack_with_labels_and_precision() {
    let table = normalize_json(
        r#"{"axes": {"x": [800, 1600], "y": [0.5, 1.0], "z": [1, 2]},
            "data": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]}"#,
    )
    .unwrap();
    let exporter = TableExporter::with_options(
        ExportOptions::spreadsheet()
            .with_precision(1)
            .with_trailing_layer_separator(false),
    );
    assert_eq!(
        exporter.to_delimited_text(&table),
        "Layer 1\n,0.5,1.0\n800.0,1.0,2.0\n1600.0,3.0,4.0\n\nLayer 2\n,0.5,1.0\n800.0,5.0,6.0\n1600.0,7.0,8.0"
    );
}

#[test]
fn test_export_is_not_parsed_back() {
    // the delimited export is not a legacy block
    let text = to_delimited_text(&to_rows(&two_layer_stack()));
    assert!(matches!(
        normalize(TableInput::text(text)),
        Err(TuneError::UnrecognizedFormat { .. })
    ));
}

#[test]
fn test_change_list_for_stack() {
    let original = two_layer_stack();
    let modified =
        normalize_json(r#"{"axes": {"x": [1], "y": [1, 2]}, "data": [[[1, 2]], [[3, 5]]]}"#)
            .unwrap();
    let diff = diff(&original, &modified).unwrap();

    let text = ChangeListExporter::new()
        .with_table_name("Boost Target")
        .to_delimited_text(&diff);
    assert_eq!(
        text,
        "table,category,priority,layer,row,col,x,y,old,new,delta,change_percent\n\
         Boost Target,boost,high,1,0,1,1,2,4,5,1,25"
    );
}

#[test]
fn test_change_list_without_changes_has_only_header() {
    let table = two_layer_stack();
    let rows = ChangeListExporter::new().to_rows(&diff(&table, &table).unwrap());
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_config_export_options() {
    let config = GuardConfig::from_json(r#"{"export": {"delimiter": ";"}}"#).unwrap();
    let table =
        normalize_json(r#"{"axes": {"x": [1, 2], "y": [1, 2]}, "data": [[1, 2], [3, 4]]}"#)
            .unwrap();
    assert_eq!(config.table_exporter().to_delimited_text(&table), "1;2\n3;4");
}
