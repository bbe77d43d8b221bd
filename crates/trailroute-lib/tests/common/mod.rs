//! Shared fixture builder for integration tests.
//!
//! Writes a trail graph with the production schema into a temporary directory
//! so tests exercise the real SQLite code paths.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{params, Connection};
use tempfile::TempDir;
use trailroute_lib::codec::encode_geometry;
use trailroute_lib::{
    haversine_distance, CostModel, Coordinate, EdgeProfile, GraphStore, RoutingMode, Surface,
    TrailClass,
};

const SCHEMA: &str = r#"
    CREATE TABLE nodes (
        id INTEGER PRIMARY KEY,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        elevation REAL
    );
    CREATE TABLE edges (
        id INTEGER PRIMARY KEY,
        from_node INTEGER NOT NULL,
        to_node INTEGER NOT NULL,
        distance REAL,
        elevation_gain REAL,
        elevation_loss REAL,
        surface TEXT,
        highway_type TEXT,
        sac_scale TEXT,
        trail_visibility TEXT,
        name TEXT,
        source_way_id INTEGER,
        cost REAL,
        reverse_cost REAL,
        is_oneway INTEGER,
        geometry BLOB
    );
    CREATE INDEX idx_edges_from ON edges(from_node);
    CREATE INDEX idx_edges_to ON edges(to_node);
    CREATE INDEX idx_nodes_lat_lon ON nodes(latitude, longitude);
    CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT);
"#;

/// `origin` shifted by the given metres north and east.
pub fn offset(origin: Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let lat = origin.latitude + north_m / 111_195.0;
    let lon = origin.longitude + east_m / (111_195.0 * origin.latitude.to_radians().cos());
    Coordinate::new(lat, lon)
}

#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub id: i64,
    pub coordinate: Coordinate,
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FixtureEdge {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub distance: Option<f64>,
    pub gain: f64,
    pub loss: f64,
    pub surface: Option<String>,
    pub highway: Option<String>,
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub reverse_cost: Option<f64>,
    pub explicit_costs: bool,
    pub oneway: bool,
    pub geometry: Vec<Coordinate>,
    pub raw_geometry: Option<Vec<u8>>,
}

impl FixtureEdge {
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn highway(mut self, highway: Option<&str>) -> Self {
        self.highway = highway.map(str::to_string);
        self
    }

    pub fn surface(mut self, surface: &str) -> Self {
        self.surface = Some(surface.to_string());
        self
    }

    pub fn elevation(mut self, gain: f64, loss: f64) -> Self {
        self.gain = gain;
        self.loss = loss;
        self
    }

    /// Store these costs verbatim; `None` is written as NULL (impassable).
    pub fn costs(mut self, forward: Option<f64>, reverse: Option<f64>) -> Self {
        self.cost = forward;
        self.reverse_cost = reverse;
        self.explicit_costs = true;
        self
    }

    pub fn impassable(self) -> Self {
        self.costs(None, None)
    }

    pub fn distance(mut self, metres: f64) -> Self {
        self.distance = Some(metres);
        self
    }

    pub fn oneway(mut self) -> Self {
        self.oneway = true;
        self
    }

    pub fn geometry(mut self, points: Vec<Coordinate>) -> Self {
        self.geometry = points;
        self
    }

    pub fn raw_geometry(mut self, blob: Vec<u8>) -> Self {
        self.raw_geometry = Some(blob);
        self
    }
}

/// Graph under construction. Edges without explicit costs get costs from the
/// hiking [`CostModel`]; edges without a distance use the haversine length of
/// their polyline.
#[derive(Debug, Default)]
pub struct GraphFixture {
    nodes: Vec<FixtureNode>,
    edges: Vec<FixtureEdge>,
    metadata: Vec<(String, String)>,
}

pub struct BuiltGraph {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl BuiltGraph {
    pub fn open(&self) -> GraphStore {
        GraphStore::open_path(&self.path).expect("fixture graph opens")
    }
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, id: i64, coordinate: Coordinate) -> Self {
        self.nodes.push(FixtureNode {
            id,
            coordinate,
            elevation: None,
        });
        self
    }

    pub fn node_at_elevation(mut self, id: i64, coordinate: Coordinate, elevation: f64) -> Self {
        self.nodes.push(FixtureNode {
            id,
            coordinate,
            elevation: Some(elevation),
        });
        self
    }

    /// Add a `path` edge; `configure` customises it before insertion.
    pub fn edge(
        mut self,
        id: i64,
        from: i64,
        to: i64,
        configure: impl FnOnce(FixtureEdge) -> FixtureEdge,
    ) -> Self {
        let edge = configure(FixtureEdge {
            id,
            from,
            to,
            distance: None,
            gain: 0.0,
            loss: 0.0,
            surface: None,
            highway: Some("path".to_string()),
            name: None,
            cost: None,
            reverse_cost: None,
            explicit_costs: false,
            oneway: false,
            geometry: Vec::new(),
            raw_geometry: None,
        });
        self.edges.push(edge);
        self
    }

    pub fn path_edge(self, id: i64, from: i64, to: i64) -> Self {
        self.edge(id, from, to, |edge| edge)
    }

    pub fn metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }

    fn coordinate_of(&self, id: i64) -> Option<Coordinate> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.coordinate)
    }

    pub fn build(self) -> BuiltGraph {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("trails.db");
        let conn = Connection::open(&path).expect("create fixture db");
        conn.execute_batch(SCHEMA).expect("create schema");

        for node in &self.nodes {
            conn.execute(
                "INSERT INTO nodes (id, latitude, longitude, elevation) VALUES (?1, ?2, ?3, ?4)",
                params![
                    node.id,
                    node.coordinate.latitude,
                    node.coordinate.longitude,
                    node.elevation
                ],
            )
            .expect("insert node");
        }

        let model = CostModel::new(RoutingMode::Hiking);
        for edge in &self.edges {
            let distance = edge.distance.unwrap_or_else(|| {
                let mut polyline = Vec::new();
                polyline.extend(self.coordinate_of(edge.from));
                polyline.extend(edge.geometry.iter().copied());
                polyline.extend(self.coordinate_of(edge.to));
                polyline
                    .windows(2)
                    .map(|pair| haversine_distance(pair[0], pair[1]))
                    .sum()
            });
            let (cost, reverse_cost) = if edge.explicit_costs {
                (edge.cost, edge.reverse_cost)
            } else {
                let costs = model.edge_costs(&EdgeProfile {
                    distance,
                    elevation_gain: edge.gain,
                    elevation_loss: edge.loss,
                    surface: Surface::from_tag(edge.surface.as_deref().unwrap_or("")),
                    trail_class: edge.highway.as_deref().map(TrailClass::from_tag),
                });
                (Some(costs.forward), Some(costs.reverse))
            };
            let blob = edge
                .raw_geometry
                .clone()
                .unwrap_or_else(|| encode_geometry(&edge.geometry));

            conn.execute(
                "INSERT INTO edges (id, from_node, to_node, distance, elevation_gain, \
                 elevation_loss, surface, highway_type, sac_scale, trail_visibility, name, \
                 source_way_id, cost, reverse_cost, is_oneway, geometry) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    edge.id,
                    edge.from,
                    edge.to,
                    distance,
                    edge.gain,
                    edge.loss,
                    edge.surface,
                    edge.highway,
                    edge.name,
                    edge.id * 100,
                    cost,
                    reverse_cost,
                    i64::from(edge.oneway),
                    blob
                ],
            )
            .expect("insert edge");
        }

        for (key, value) in &self.metadata {
            conn.execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .expect("insert metadata");
        }

        BuiltGraph { dir, path }
    }
}

/// Three nodes in a straight east-west line, 100 m apart, joined by two trails.
pub fn line_graph() -> (GraphFixture, [Coordinate; 3]) {
    let origin = Coordinate::new(46.5, 7.9);
    let n1 = origin;
    let n2 = offset(origin, 0.0, 100.0);
    let n3 = offset(origin, 0.0, 200.0);
    let fixture = GraphFixture::new()
        .node(1, n1)
        .node(2, n2)
        .node(3, n3)
        .edge(10, 1, 2, |e| e.named("Valley Path"))
        .edge(11, 2, 3, |e| e.named("Valley Path"));
    (fixture, [n1, n2, n3])
}
