//! Integration tests for `Frame` construction, selectors, filter, sort,
//! and describe, using small inline fixtures.

use framewright::{Cell, ColSelector, Frame, RowSelector};

fn h2o_like_frame() -> Frame {
    // A handful of rows shaped like a typical groupby benchmark
    // fixture, trimmed to what a readable test needs.
    Frame::from_columns(vec![
        (
            "id1".to_string(),
            vec![
                Cell::Text("id001".into()),
                Cell::Text("id001".into()),
                Cell::Text("id002".into()),
                Cell::Text("id002".into()),
            ],
        ),
        ("v1".to_string(), vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]),
        ("v2".to_string(), vec![Cell::Na, Cell::Int(5), Cell::Int(6), Cell::Int(7)]),
    ])
    .unwrap()
}

#[test]
fn shape_and_columns() {
    let f = h2o_like_frame();
    assert_eq!(f.shape(), (4, 3));
    assert_eq!(f.columns(), &["id1", "v1", "v2"]);
}

#[test]
fn at_resolves_row_label_then_column() {
    let f = h2o_like_frame();
    let cell = f.at(&Cell::Int(2), "v1").unwrap();
    assert_eq!(*cell, Cell::Int(3));
}

#[test]
fn positional_window_clamped_to_bounds() {
    let f = h2o_like_frame();
    let window = f.select_positional(1, 100, 0, 2);
    assert_eq!(window.shape(), (3, 2));
    assert_eq!(window.columns(), &["id1", "v1"]);
}

#[test]
fn label_selector_is_all_by_default() {
    let f = h2o_like_frame();
    let out = f.select_labels(RowSelector::All, ColSelector::One("v1".to_string()));
    assert_eq!(out.shape(), (4, 1));
}

#[test]
fn filter_carries_over_original_labels() {
    let f = h2o_like_frame();
    let out = f.filter(|row| matches!(row.get("v1"), Some(Cell::Int(n)) if *n >= 3));
    assert_eq!(out.nrows(), 2);
    assert_eq!(out.index().labels(), &[Cell::Int(2), Cell::Int(3)]);
}

#[test]
fn sort_by_is_stable_and_na_last_ascending() {
    let f = h2o_like_frame();
    let sorted = f.sort_by("v2", true).unwrap();
    assert_eq!(sorted.get_column("v2").unwrap(), &[Cell::Int(5), Cell::Int(6), Cell::Int(7), Cell::Na]);
    // The permutation must move id1/v1 in lockstep with v2.
    assert_eq!(sorted.get_column("v1").unwrap(), &[Cell::Int(2), Cell::Int(3), Cell::Int(4), Cell::Int(1)]);
}

#[test]
fn describe_reports_fixed_columns_indexed_by_source_column() {
    let f = h2o_like_frame();
    let d = f.describe();
    assert_eq!(d.columns(), &["count", "mean", "std", "min", "max"]);
    assert_eq!(d.index().name(), Some("column"));
    assert_eq!(d.index().labels(), &[Cell::Text("id1".into()), Cell::Text("v1".into()), Cell::Text("v2".into())]);
    // v2 has one NA; count should skip it.
    assert_eq!(d.at(&Cell::Text("v2".into()), "count").unwrap(), &Cell::Int(3));
}

#[test]
fn from_rows_rejects_malformed_records() {
    let err = Frame::from_rows(
        vec!["a".to_string(), "b".to_string()],
        vec![vec![Cell::Int(1), Cell::Int(2)], vec![Cell::Int(3)]],
    )
    .unwrap_err();
    assert!(matches!(err, framewright::Error::LengthMismatch { .. }));
}
