//! Fixture graph shared by CLI integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use rusqlite::{params, Connection};
use tempfile::TempDir;

/// Junctions of a small valley network: (id, lat, lon, elevation).
pub const NODES: [(i64, f64, f64, f64); 4] = [
    (1, 46.5000, 7.9000, 1_000.0),
    (2, 46.5000, 7.9040, 1_020.0),
    (3, 46.5000, 7.9080, 1_060.0),
    (4, 46.5030, 7.9040, 1_150.0),
];

/// Edges: (id, from, to, distance, gain, loss, highway, name, cost, reverse_cost).
pub const EDGES: [(i64, i64, i64, f64, f64, f64, Option<&str>, &str, f64, f64); 4] = [
    (10, 1, 2, 307.0, 20.0, 0.0, Some("path"), "Valley Path", 340.0, 300.0),
    (11, 2, 3, 307.0, 40.0, 0.0, Some("path"), "Valley Path", 380.0, 290.0),
    (12, 2, 4, 334.0, 130.0, 0.0, Some("steps"), "Chapel Stairs", 700.0, 420.0),
    (13, 3, 4, 480.0, 90.0, 0.0, None, "Service Track", 650.0, 470.0),
];

pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn build_fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("trails.db");
    let conn = Connection::open(&path).expect("create fixture db");
    conn.execute_batch(
        r#"
        CREATE TABLE nodes (id INTEGER PRIMARY KEY, latitude REAL, longitude REAL, elevation REAL);
        CREATE TABLE edges (
            id INTEGER PRIMARY KEY, from_node INTEGER, to_node INTEGER, distance REAL,
            elevation_gain REAL, elevation_loss REAL, surface TEXT, highway_type TEXT,
            sac_scale TEXT, trail_visibility TEXT, name TEXT, source_way_id INTEGER,
            cost REAL, reverse_cost REAL, is_oneway INTEGER, geometry BLOB
        );
        CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT);
        INSERT INTO metadata VALUES ('region', 'Test Valley');
        INSERT INTO metadata VALUES ('min_lat', '46.49');
        INSERT INTO metadata VALUES ('max_lat', '46.51');
        INSERT INTO metadata VALUES ('min_lon', '7.89');
        INSERT INTO metadata VALUES ('max_lon', '7.91');
        "#,
    )
    .expect("fixture schema");

    for (id, lat, lon, elevation) in NODES {
        conn.execute(
            "INSERT INTO nodes VALUES (?1, ?2, ?3, ?4)",
            params![id, lat, lon, elevation],
        )
        .expect("insert node");
    }
    for (id, from, to, distance, gain, loss, highway, name, cost, reverse_cost) in EDGES {
        conn.execute(
            "INSERT INTO edges VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'ground', ?7, NULL, NULL, ?8, \
             NULL, ?9, ?10, 0, NULL)",
            params![id, from, to, distance, gain, loss, highway, name, cost, reverse_cost],
        )
        .expect("insert edge");
    }

    Fixture { _dir: dir, path }
}

/// CLI command with quiet logging, no colors and the fixture graph selected.
pub fn cli(fixture: &Fixture) -> Command {
    let mut cmd = cargo_bin_cmd!("trailroute-cli");
    cmd.env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .env_remove("TRAILROUTE_GRAPH")
        .arg("--graph")
        .arg(&fixture.path);
    cmd
}
