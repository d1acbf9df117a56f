use dimension_plot::data::loader::load_file;
use dimension_plot::series::registry::assign_ids;
use dimension_plot::series::translate::translate;
use dimension_plot::session::{BindOutcome, LatestDocument, PlotSession};
use dimension_plot::{
    build_grouped_series, Cluster, ClusterDataset, DataType, Dataset, GroupedSeriesDocument, Grouping, GroupingSource, KeyIndexMap, MetadataDataset,
    MetadataJoin, PointDataset, Rgb,
};
use serde_json::{json, Value};

fn five_points() -> PointDataset {
    PointDataset::from_rows(
        "five",
        vec!["value".into()],
        &[vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]],
    )
    .unwrap()
}

fn keyed_points() -> PointDataset {
    PointDataset::new(
        "keyed",
        vec!["dim".into()],
        vec![10.0, 20.0, 30.0],
        KeyIndexMap::from_keys(["k1", "k2", "k3"]).unwrap(),
    )
    .unwrap()
}

fn colour_metadata() -> MetadataDataset {
    MetadataDataset::new(
        "colours",
        vec![("colour".into(), vec!["red".into(), "blue".into()])],
        KeyIndexMap::from_keys(["k1", "k3"]).unwrap(),
    )
    .unwrap()
}

#[test]
fn cluster_mode_emits_full_values_and_clusters() {
    let clusters = ClusterDataset::new(
        "x_only",
        vec![Cluster {
            name: "X".into(),
            color: Rgb::new(0x12, 0xab, 0xef),
            indices: vec![0, 2, 4],
        }],
    );

    let doc = build_grouped_series(&five_points(), 0, GroupingSource::Clusters(&clusters)).unwrap();
    let value: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    assert_eq!(
        value,
        json!({
            "title": "value",
            "values": [1.0, 2.0, 3.0, 4.0, 5.0],
            "categories": [{ "name": "X", "indices": [0, 2, 4], "color": "#12abef" }]
        })
    );
}

#[test]
fn category_mode_drops_unresolved_keys() {
    let primary = keyed_points();
    let meta = colour_metadata();

    let doc = build_grouped_series(
        &primary,
        0,
        GroupingSource::Metadata(MetadataJoin::new(&primary, &meta, "colour")),
    )
    .unwrap();
    let value: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    assert_eq!(
        value,
        json!({
            "title": "dim",
            "values": [10.0, 30.0],
            "categories": ["red", "blue"],
            "categoryIds": [0, 1]
        })
    );
}

#[test]
fn category_mode_with_explicit_key_maps() {
    let primary = keyed_points();
    let meta = colour_metadata();

    // Same join expressed with maps supplied by the caller.
    let join = MetadataJoin {
        dataset: &meta,
        column: "colour",
        primary_keys: &primary.keys,
        metadata_keys: &meta.keys,
    };
    let doc = build_grouped_series(&primary, 0, GroupingSource::Metadata(join)).unwrap();
    assert_eq!(doc.len(), 2);
    assert!(doc.is_consistent());
}

#[test]
fn mismatched_partition_yields_no_document() {
    let cluster = |name: &str| Cluster {
        name: name.into(),
        color: Rgb::new(0, 0, 0),
        indices: vec![0],
    };
    let good = ClusterDataset::with_names("ok", vec!["a".into(), "b".into()], vec![cluster("a"), cluster("b")]);
    let bad = ClusterDataset::with_names(
        "bad",
        vec!["a".into(), "b".into()],
        vec![cluster("a"), cluster("b"), cluster("c")],
    );

    assert!(build_grouped_series(&five_points(), 0, GroupingSource::Clusters(&good)).is_some());
    assert!(build_grouped_series(&five_points(), 0, GroupingSource::Clusters(&bad)).is_none());
}

#[test]
fn zero_points_give_an_empty_document() {
    let empty = PointDataset::from_rows("empty", vec!["d".into()], &[]).unwrap();
    let clusters = ClusterDataset::new("none", vec![]);

    let doc = build_grouped_series(&empty, 0, GroupingSource::Clusters(&clusters)).unwrap();
    assert!(doc.values.is_empty());
    assert_eq!(doc.grouping, Grouping::Clusters { categories: vec![] });

    let meta = MetadataDataset::new("m", vec![("c".into(), vec![])], KeyIndexMap::default()).unwrap();
    let doc = build_grouped_series(&empty, 0, GroupingSource::Metadata(MetadataJoin::new(&empty, &meta, "c"))).unwrap();
    assert!(doc.values.is_empty());
    assert_eq!(
        doc.grouping,
        Grouping::Categories {
            categories: vec![],
            category_ids: vec![]
        }
    );
}

#[test]
fn rebuilding_unchanged_bindings_is_byte_identical() {
    let mut session = PlotSession::new(LatestDocument::default());
    session.bind(Dataset::Points(keyed_points()));
    session.bind(Dataset::Metadata(colour_metadata()));
    let first = session.sink().json.clone().unwrap();

    assert!(session.rebuild());
    assert_eq!(session.sink().json.as_deref(), Some(first.as_str()));
    assert_eq!(session.sink().updates, 2);
}

#[test]
fn translation_round_trips_and_never_invents_indices() {
    let a = KeyIndexMap::from_keys(["k1", "k2", "k3", "k4"]).unwrap();
    let b = KeyIndexMap::from_keys(["k4", "k2", "k9"]).unwrap();

    let forward = translate(&[0, 1, 2, 3], &a, &b);
    assert_eq!(forward, vec![None, Some(1), None, Some(0)]);

    for (source, target) in forward.iter().enumerate() {
        if let Some(t) = target {
            assert_eq!(translate(&[*t], &b, &a), vec![Some(source)]);
        }
    }
}

#[test]
fn registry_names_invert_ids() {
    let labels = ["naive", "memory", "naive", "effector", "memory"];
    let (ids, names) = assign_ids(labels);

    assert_eq!(ids, vec![0, 1, 0, 2, 1]);
    for (label, id) in labels.iter().zip(&ids) {
        assert_eq!(names[*id as usize], *label);
    }
}

#[test]
fn loading_the_same_file_twice_is_refused() {
    let dir = std::env::temp_dir().join(format!("dimension-plot-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cells.csv");
    std::fs::write(&path, "id,a\nc1,1\nc2,2\n").unwrap();

    let mut session = PlotSession::new(LatestDocument::default());
    let first = session.bind(load_file(&path, DataType::Points, "id").unwrap());
    let second = session.bind(load_file(&path, DataType::Points, "id").unwrap());
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(first, BindOutcome::Pending);
    assert_eq!(second, BindOutcome::AlreadyBound);
}

#[test]
fn missing_values_survive_a_json_round_trip() {
    let points = PointDataset::from_rows("gaps", vec!["d".into()], &[vec![1.0], vec![f32::NAN]]).unwrap();
    let clusters = ClusterDataset::new(
        "all",
        vec![Cluster {
            name: "all".into(),
            color: Rgb::new(1, 2, 3),
            indices: vec![0, 1],
        }],
    );

    let doc = build_grouped_series(&points, 0, GroupingSource::Clusters(&clusters)).unwrap();
    let json = doc.to_json().unwrap();
    assert!(json.contains("null"));

    let parsed = GroupedSeriesDocument::from_json(&json).unwrap();
    assert_eq!(parsed.values[0], 1.0);
    assert!(parsed.values[1].is_nan());
    assert_eq!(parsed.grouping, doc.grouping);
}
