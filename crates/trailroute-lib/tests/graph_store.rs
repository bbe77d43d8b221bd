mod common;

use std::fs;

use common::{line_graph, offset, GraphFixture};
use trailroute_lib::codec::encode_geometry;
use trailroute_lib::{haversine_distance, BoundingBox, Coordinate, Error, GraphStore, Result};

#[test]
fn missing_file_reports_no_routing_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.db");

    let store = GraphStore::new();
    match store.open(&path) {
        Err(Error::NoRoutingData { path: Some(reported) }) => assert_eq!(reported, path),
        other => panic!("expected NoRoutingData, got {other:?}"),
    }
    assert!(!store.is_open());
}

#[test]
fn queries_fail_before_open_and_after_close() -> Result<()> {
    let store = GraphStore::new();
    assert!(matches!(
        store.get_node(1),
        Err(Error::NoRoutingData { path: None })
    ));

    let (fixture, _) = line_graph();
    let graph = fixture.build();
    store.open(&graph.path)?;
    assert!(store.get_node(1)?.is_some());

    store.close();
    assert!(!store.is_open());
    assert!(matches!(
        store.get_edges_from(1),
        Err(Error::NoRoutingData { .. })
    ));
    Ok(())
}

#[test]
fn non_graph_file_is_rejected_and_store_stays_closed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let garbage = dir.path().join("garbage.db");
    fs::write(&garbage, b"definitely not sqlite").expect("write garbage");

    let store = GraphStore::new();
    let err = store.open(&garbage).expect_err("garbage must not open");
    assert!(matches!(
        err,
        Error::Store(_) | Error::UnsupportedSchema { .. }
    ));
    assert!(!store.is_open());
}

#[test]
fn database_without_edges_table_is_unsupported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("partial.db");
    let conn = rusqlite::Connection::open(&path).expect("create db");
    conn.execute_batch(
        "CREATE TABLE nodes (id INTEGER PRIMARY KEY, latitude REAL, longitude REAL, elevation REAL);",
    )
    .expect("schema");
    drop(conn);

    match GraphStore::open_path(&path) {
        Err(Error::UnsupportedSchema { missing }) => assert!(missing.contains("edges")),
        other => panic!("expected UnsupportedSchema, got {other:?}"),
    }
}

#[test]
fn get_node_and_edge_by_id() -> Result<()> {
    let (fixture, [n1, ..]) = line_graph();
    let graph = fixture.build();
    let store = graph.open();

    let node = store.get_node(1)?.expect("node 1 exists");
    assert_eq!(node.coordinate(), n1);
    assert_eq!(node.elevation, None);
    assert!(store.get_node(99)?.is_none());

    let edge = store.get_edge(10)?.expect("edge 10 exists");
    assert_eq!((edge.from_node, edge.to_node), (1, 2));
    assert_eq!(edge.name.as_deref(), Some("Valley Path"));
    assert_eq!(edge.source_way_id, Some(1000));
    assert!(!edge.is_oneway);
    assert!((edge.distance - 100.0).abs() < 1.0);
    assert!(store.get_edge(99)?.is_none());
    Ok(())
}

#[test]
fn bounding_box_query_is_inclusive() -> Result<()> {
    let (fixture, [n1, n2, n3]) = line_graph();
    let store = fixture.build().open();

    let bbox = BoundingBox::new(n2.latitude, n1.latitude, n2.longitude, n1.longitude);
    let mut ids: Vec<i64> = store
        .get_nodes_in_bounding_box(&bbox)?
        .iter()
        .map(|node| node.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);

    let east_of_everything = BoundingBox::new(
        n3.latitude + 0.01,
        n3.latitude - 0.01,
        n3.longitude + 0.02,
        n3.longitude + 0.01,
    );
    assert!(store.get_nodes_in_bounding_box(&east_of_everything)?.is_empty());
    Ok(())
}

#[test]
fn edges_from_respects_oneway_flag() -> Result<()> {
    let origin = Coordinate::new(47.0, 8.0);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 100.0))
        .node(3, offset(origin, 100.0, 0.0))
        .path_edge(10, 1, 2)
        .edge(11, 3, 1, |e| e.oneway())
        .build()
        .open();

    let mut from_1: Vec<i64> = store.get_edges_from(1)?.iter().map(|e| e.id).collect();
    from_1.sort_unstable();
    assert_eq!(from_1, vec![10], "one-way edge into node 1 must not be offered");

    let from_2: Vec<i64> = store.get_edges_from(2)?.iter().map(|e| e.id).collect();
    assert_eq!(from_2, vec![10], "two-way edge usable in reverse");

    let from_3: Vec<i64> = store.get_edges_from(3)?.iter().map(|e| e.id).collect();
    assert_eq!(from_3, vec![11]);
    Ok(())
}

#[test]
fn self_loop_is_listed_once() -> Result<()> {
    let origin = Coordinate::new(47.0, 8.0);
    let store = GraphFixture::new()
        .node(1, origin)
        .edge(10, 1, 1, |e| {
            e.geometry(vec![offset(origin, 30.0, 0.0), offset(origin, 30.0, 30.0)])
        })
        .build()
        .open();
    assert_eq!(store.get_edges_from(1)?.len(), 1);
    Ok(())
}

#[test]
fn nearest_node_honours_radius() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let store = GraphFixture::new()
        .node(1, offset(origin, 0.0, 1_000.0))
        .build()
        .open();

    assert!(store.nearest_node(origin, 500.0)?.is_none());
    let found = store.nearest_node(origin, 1_200.0)?.expect("within 1200 m");
    assert_eq!(found.id, 1);
    Ok(())
}

#[test]
fn nearest_node_picks_the_closest_candidate() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let store = GraphFixture::new()
        .node(1, offset(origin, 80.0, 0.0))
        .node(2, offset(origin, 0.0, -50.0))
        .node(3, offset(origin, -120.0, 0.0))
        .build()
        .open();

    let found = store.nearest_node(origin, 200.0)?.expect("node within 200 m");
    assert_eq!(found.id, 2);
    assert!(haversine_distance(origin, found.coordinate()) <= 200.0);
    Ok(())
}

#[test]
fn nearest_trail_point_snaps_to_the_middle_of_a_trail() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let west = origin;
    let east = offset(origin, 0.0, 300.0);
    let store = GraphFixture::new()
        .node(1, west)
        .node(2, east)
        .edge(10, 1, 2, |e| e.named("Long Traverse"))
        .build()
        .open();

    // 10 m north of the trail, closer to the eastern end.
    let query = offset(origin, 10.0, 210.0);
    let snap = store
        .nearest_trail_point(query, 100.0)?
        .expect("trail within 100 m");
    assert_eq!(snap.edge.id, 10);
    assert_eq!(snap.node.id, 2);
    assert!((snap.distance_to_trail - 10.0).abs() < 0.5);
    assert!((snap.point.latitude - origin.latitude).abs() < 1e-5);

    let junction = store.nearest_node(query, 100.0)?.expect("east junction");
    assert!(snap.distance_to_trail < haversine_distance(query, junction.coordinate()));
    Ok(())
}

#[test]
fn nearest_trail_point_follows_intermediate_geometry() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let bend = offset(origin, 300.0, 150.0);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 300.0))
        .edge(10, 1, 2, |e| e.geometry(vec![bend]))
        .build()
        .open();

    // Both endpoints are over 300 m away; only the bend is within the radius.
    let query = offset(bend, 5.0, 0.0);
    let snap = store
        .nearest_trail_point(query, 50.0)?
        .expect("bend within 50 m");
    assert_eq!(snap.edge.id, 10);
    assert!((snap.distance_to_trail - 5.0).abs() < 0.5);
    assert!(store.nearest_node(query, 50.0)?.is_none());

    assert!(store.nearest_trail_point(offset(bend, 80.0, 0.0), 50.0)?.is_none());
    Ok(())
}

#[test]
fn nearest_trail_point_finds_long_edges_with_distant_endpoints() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 2_000.0))
        .edge(10, 1, 2, |e| e.named("Lakeshore"))
        .build()
        .open();

    let query = offset(origin, 10.0, 1_000.0);
    let snap = store
        .nearest_trail_point(query, 500.0)?
        .expect("trail 10 m away within a 500 m radius");
    assert_eq!(snap.edge.id, 10);
    assert!((snap.distance_to_trail - 10.0).abs() < 0.5);
    assert!(haversine_distance(snap.point, offset(origin, 0.0, 1_000.0)) < 1.0);
    Ok(())
}

#[test]
fn edges_in_bounding_box_include_trails_crossing_it() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 3_000.0))
        .node(3, offset(origin, 1_000.0, 0.0))
        .node(4, offset(origin, 1_000.0, 3_000.0))
        .edge(10, 1, 2, |e| e.named("Valley Floor"))
        .edge(11, 3, 4, |e| e.named("Upper Balcony"))
        .build()
        .open();

    // Viewport straddling the middle of the valley floor only.
    let viewport = BoundingBox::around(offset(origin, 0.0, 1_500.0), 200.0);
    let segments = store.get_edges_in_bounding_box(&viewport)?;
    let ids: Vec<_> = segments.iter().map(|segment| segment.edge_id).collect();
    assert_eq!(ids, vec![10]);
    Ok(())
}

#[test]
fn edges_in_bounding_box_skip_unclassified_segments() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let mid = offset(origin, 0.0, 100.0);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, mid)
        .node(3, offset(origin, 0.0, 200.0))
        .edge(10, 1, 2, |e| {
            e.named("Ridge")
                .surface("gravel")
                .geometry(vec![offset(origin, 10.0, 50.0)])
        })
        .edge(11, 2, 3, |e| e.highway(None))
        .build()
        .open();

    let segments = store.get_edges_in_bounding_box(&BoundingBox::around(mid, 500.0))?;
    assert_eq!(segments.len(), 1);
    let segment = &segments[0];
    assert_eq!(segment.edge_id, 10);
    assert_eq!(segment.highway_type, "path");
    assert_eq!(segment.surface.as_deref(), Some("gravel"));
    assert_eq!(segment.coordinates.len(), 3);
    assert_eq!(segment.coordinates[0], origin);
    assert_eq!(segment.coordinates[2], mid);
    Ok(())
}

#[test]
fn trailing_geometry_bytes_are_ignored() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let mut blob = encode_geometry(&[offset(origin, 20.0, 50.0)]);
    blob.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 100.0))
        .edge(10, 1, 2, |e| e.raw_geometry(blob))
        .build()
        .open();

    let edge = store.get_edge(10)?.expect("edge exists");
    assert_eq!(edge.geometry.len(), 1);
    Ok(())
}

#[test]
fn null_costs_load_as_impassable() -> Result<()> {
    let origin = Coordinate::new(46.5, 7.9);
    let store = GraphFixture::new()
        .node(1, origin)
        .node(2, offset(origin, 0.0, 100.0))
        .edge(10, 1, 2, |e| e.costs(Some(120.0), None))
        .build()
        .open();

    let edge = store.get_edge(10)?.expect("edge exists");
    assert_eq!(edge.cost, 120.0);
    assert!(edge.reverse_cost.is_infinite());
    Ok(())
}

#[test]
fn info_reports_counts_metadata_and_bounds() -> Result<()> {
    let (fixture, _) = line_graph();
    let graph = fixture
        .metadata("region", "Bernese Oberland")
        .metadata("min_lat", "46.4")
        .metadata("max_lat", "46.6")
        .metadata("min_lon", "7.8")
        .metadata("max_lon", "8.0")
        .build();
    let store = graph.open();

    let info = store.info()?;
    assert_eq!(info.path.as_deref(), Some(graph.path.as_path()));
    assert_eq!(info.node_count, 3);
    assert_eq!(info.edge_count, 2);
    assert_eq!(
        info.metadata.get("region").map(String::as_str),
        Some("Bernese Oberland")
    );

    let bounds = store.bounds()?.expect("bounds recorded");
    assert_eq!(bounds, BoundingBox::new(46.6, 46.4, 8.0, 7.8));
    Ok(())
}

#[test]
fn missing_bounds_metadata_yields_none() -> Result<()> {
    let (fixture, _) = line_graph();
    let store = fixture.metadata("min_lat", "46.4").build().open();
    assert!(store.bounds()?.is_none());
    Ok(())
}

#[test]
fn store_is_shareable_across_threads() -> Result<()> {
    let (fixture, _) = line_graph();
    let graph = fixture.build();
    let store = std::sync::Arc::new(graph.open());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || store.get_edges_from(2).map(|edges| edges.len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread completes")?, 2);
    }
    Ok(())
}
