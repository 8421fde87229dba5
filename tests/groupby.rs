//! Integration tests for `GroupBy`: multi-key aggregation, `single`,
//! `apply`, and `filter`, over a small h2o-benchmark-shaped fixture.

use framewright::groupby::{agg_count, agg_mean, agg_sum, Aggregator, GroupBy};
use framewright::{Cell, Frame};

fn fixture() -> Frame {
    Frame::from_columns(vec![
        (
            "id1".to_string(),
            vec![
                Cell::Text("id001".into()),
                Cell::Text("id001".into()),
                Cell::Text("id002".into()),
                Cell::Text("id002".into()),
                Cell::Text("id001".into()),
            ],
        ),
        (
            "id2".to_string(),
            vec![
                Cell::Text("a".into()),
                Cell::Text("b".into()),
                Cell::Text("a".into()),
                Cell::Text("a".into()),
                Cell::Text("a".into()),
            ],
        ),
        ("v1".to_string(), vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4), Cell::Int(5)]),
    ])
    .unwrap()
}

#[test]
fn multi_key_group_by_orders_by_first_appearance() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string(), "id2".to_string()]).unwrap();
    assert_eq!(gb.n_groups(), 3);
    let size = gb.size().unwrap();
    assert_eq!(size.get_column("id1").unwrap(), &[Cell::Text("id001".into()), Cell::Text("id001".into()), Cell::Text("id002".into())]);
    assert_eq!(size.get_column("size").unwrap(), &[Cell::Int(2), Cell::Int(1), Cell::Int(2)]);
}

#[test]
fn agg_multi_aggregator_naming() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string()]).unwrap();
    let map: Vec<(String, Vec<Aggregator>)> = vec![("v1".to_string(), vec![agg_sum, agg_mean, agg_count])];
    let out = gb.agg(&map).unwrap();
    assert_eq!(out.columns(), &["id1", "v1_0", "v1_1", "v1_2"]);
    // id001 rows: v1 = 1, 2, 5
    assert_eq!(out.get_column("v1_0").unwrap()[0], Cell::Float(8.0));
    assert_eq!(out.get_column("v1_2").unwrap()[0], Cell::Int(3));
}

#[test]
fn single_defaults_to_all_non_key_columns() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string()]).unwrap();
    let out = gb.single(agg_sum, "sum", &[]).unwrap();
    assert_eq!(out.columns(), &["id1", "id2_sum", "v1_sum"]);
}

#[test]
fn apply_concatenates_non_empty_group_results() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string()]).unwrap();
    let out = gb
        .apply(|group| if group.nrows() > 2 { Some(group.head(1)) } else { None })
        .unwrap();
    // Only id001 (3 rows) clears the threshold; id002 (2 rows) is dropped.
    assert_eq!(out.nrows(), 1);
    assert_eq!(out.get_column("id1").unwrap(), &[Cell::Text("id001".into())]);
}

#[test]
fn filter_keeps_whole_groups_in_source_order() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string()]).unwrap();
    let out = gb.filter(|group| group.nrows() >= 2).unwrap();
    assert_eq!(out.nrows(), 5); // every group here has >= 2 rows, so all survive
    assert_eq!(out.index().labels(), &[Cell::Int(0), Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]);
}

#[test]
fn transform_scatters_back_to_original_positions() {
    let f = fixture();
    let gb = GroupBy::new(&f, vec!["id1".to_string()]).unwrap();
    let out = gb.transform("v1", |v| {
        framewright::Vector::from_cells(vec![Cell::Float(v.sum())])
    });
    let out = out.unwrap();
    assert_eq!(out.len(), 5);
    // id001 rows (positions 0, 1, 4) all receive the group sum; the rest is NA.
    assert_eq!(out.values()[0], Cell::Float(8.0));
    assert_eq!(out.values()[1], Cell::Na);
}
