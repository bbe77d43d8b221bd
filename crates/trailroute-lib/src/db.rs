//! Read-only access to a persisted trail graph.
//!
//! A [`GraphStore`] owns at most one SQLite connection, opened read-only, and
//! guards it with a mutex. Every query locks the connection for its duration, so
//! a single store can be shared between threads (for example behind an `Arc`)
//! and concurrent callers simply serialize at the I/O layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{decode_geometry, has_trailing_bytes};
use crate::error::{Error, Result};
use crate::geo::{haversine_distance, project_onto_segment, BoundingBox, Coordinate};
use crate::graph::{Edge, EdgeId, GraphSource, Node, NodeId};

const NODES_TABLE: &str = "nodes";
const EDGES_TABLE: &str = "edges";
const METADATA_TABLE: &str = "metadata";

const NODE_COLUMNS: [&str; 4] = ["id", "latitude", "longitude", "elevation"];

const EDGE_COLUMNS: [&str; 16] = [
    "id",
    "from_node",
    "to_node",
    "distance",
    "elevation_gain",
    "elevation_loss",
    "surface",
    "highway_type",
    "sac_scale",
    "trail_visibility",
    "name",
    "source_way_id",
    "cost",
    "reverse_cost",
    "is_oneway",
    "geometry",
];

/// Projection of [`EDGE_COLUMNS`] qualified with the `e` alias.
const EDGE_SELECT: &str = "e.id, e.from_node, e.to_node, e.distance, e.elevation_gain, \
     e.elevation_loss, e.surface, e.highway_type, e.sac_scale, e.trail_visibility, e.name, \
     e.source_way_id, e.cost, e.reverse_cost, e.is_oneway, e.geometry";

/// Both endpoint nodes, appended after [`EDGE_SELECT`].
const ENDPOINT_SELECT: &str =
    "a.id, a.latitude, a.longitude, a.elevation, b.id, b.latitude, b.longitude, b.elevation";

/// Result of snapping a coordinate onto the nearest trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapResult {
    /// Endpoint of `edge` closest to the query coordinate; a valid routing node.
    pub node: Node,
    /// Trail segment passing closest to the query coordinate.
    pub edge: Edge,
    /// Distance in metres from the query coordinate to the trail itself.
    pub distance_to_trail: f64,
    /// Closest point on the trail.
    pub point: Coordinate,
}

/// Trail segment with its full polyline, for overlay rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailSegment {
    pub edge_id: EdgeId,
    pub name: Option<String>,
    pub highway_type: String,
    pub surface: Option<String>,
    pub sac_scale: Option<String>,
    pub trail_visibility: Option<String>,
    pub is_oneway: bool,
    /// `from_node`, intermediate geometry, `to_node`.
    pub coordinates: Vec<Coordinate>,
}

/// Counts and metadata describing an open graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInfo {
    pub path: Option<PathBuf>,
    pub node_count: u64,
    pub edge_count: u64,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Default)]
struct StoreState {
    connection: Option<Connection>,
    path: Option<PathBuf>,
    /// Longest edge length in metres; spatial edge queries widen their search
    /// box by this much so edges with both endpoints outside are still found.
    max_edge_extent_m: f64,
}

/// Thread-safe, read-only handle over a trail graph database.
#[derive(Default)]
pub struct GraphStore {
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("path", &self.path())
            .finish()
    }
}

impl GraphStore {
    /// Create a store without an open graph. Every query fails with
    /// [`Error::NoRoutingData`] until [`GraphStore::open`] succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and open `path` in one step.
    pub fn open_path(path: &Path) -> Result<Self> {
        let store = Self::new();
        store.open(path)?;
        Ok(store)
    }

    /// Open the graph at `path` read-only, replacing any previously open graph.
    ///
    /// The schema is probed before the handle is installed, so a file that is not
    /// a trail graph leaves the store in its previous state.
    pub fn open(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::NoRoutingData {
                path: Some(path.to_path_buf()),
            });
        }

        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        verify_schema(&connection)?;
        let max_edge_extent_m = longest_edge(&connection)?;

        let mut state = self.lock();
        state.connection = Some(connection);
        state.path = Some(path.to_path_buf());
        state.max_edge_extent_m = max_edge_extent_m;
        info!(
            path = %path.display(),
            max_edge_m = max_edge_extent_m,
            "opened trail graph"
        );
        Ok(())
    }

    /// Release the connection. Later queries fail with [`Error::NoRoutingData`].
    pub fn close(&self) {
        let mut state = self.lock();
        if let Some(path) = state.path.take() {
            info!(path = %path.display(), "closed trail graph");
        }
        state.connection = None;
        state.max_edge_extent_m = 0.0;
    }

    pub fn is_open(&self) -> bool {
        self.lock().connection.is_some()
    }

    /// Path of the open graph, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    /// Look up a node by id.
    pub fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, latitude, longitude, elevation FROM nodes WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], |row| row_to_node(row, 0)).optional()?)
        })
    }

    /// Look up an edge by id.
    pub fn get_edge(&self, id: EdgeId) -> Result<Option<Edge>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {EDGE_SELECT} FROM edges e WHERE e.id = ?1");
            let mut stmt = conn.prepare_cached(&sql)?;
            Ok(stmt.query_row([id], row_to_edge).optional()?)
        })
    }

    /// All nodes whose coordinate lies inside `bbox`.
    pub fn get_nodes_in_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Node>> {
        let nodes = self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, latitude, longitude, elevation FROM nodes \
                 WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
            )?;
            let rows = stmt.query_map(
                params![bbox.south, bbox.north, bbox.west, bbox.east],
                |row| row_to_node(row, 0),
            )?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;
        debug!(count = nodes.len(), "nodes in bounding box");
        Ok(nodes)
    }

    /// Edges usable as outgoing from `node_id`.
    ///
    /// Includes every edge starting at the node, plus every edge ending at it
    /// that is not one-way (to be walked in reverse). A self-loop is returned
    /// once.
    pub fn get_edges_from(&self, node_id: NodeId) -> Result<Vec<Edge>> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT {EDGE_SELECT} FROM edges e WHERE e.from_node = ?1 \
                 UNION ALL \
                 SELECT {EDGE_SELECT} FROM edges e \
                 WHERE e.to_node = ?1 AND e.from_node != ?1 AND COALESCE(e.is_oneway, 0) = 0"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map([node_id], row_to_edge)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Closest node within `max_radius_m` metres of `coordinate`.
    pub fn nearest_node(&self, coordinate: Coordinate, max_radius_m: f64) -> Result<Option<Node>> {
        let bbox = BoundingBox::around(coordinate, max_radius_m);
        let candidates = self.get_nodes_in_bounding_box(&bbox)?;

        let nearest = candidates
            .into_iter()
            .map(|node| (haversine_distance(coordinate, node.coordinate()), node))
            .filter(|(distance, _)| *distance <= max_radius_m)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, node)| node);
        Ok(nearest)
    }

    /// Snap `coordinate` onto the closest trail within `max_radius_m` metres.
    ///
    /// Unlike [`GraphStore::nearest_node`], distances are measured against every
    /// sub-segment of each candidate edge's polyline, so a point in the middle of
    /// a long trail matches that trail rather than a distant junction, even when
    /// both of its endpoints lie outside the radius.
    pub fn nearest_trail_point(
        &self,
        coordinate: Coordinate,
        max_radius_m: f64,
    ) -> Result<Option<SnapResult>> {
        let bbox = BoundingBox::around(coordinate, max_radius_m);
        let candidates = self.edges_near(&bbox, false)?;

        let mut best: Option<(f64, Coordinate, Edge, Node, Node)> = None;
        for (edge, from, to) in candidates {
            let polyline = full_polyline(&edge, &from, &to);
            for pair in polyline.windows(2) {
                let projection = project_onto_segment(coordinate, pair[0], pair[1]);
                let better = best
                    .as_ref()
                    .is_none_or(|(distance, ..)| projection.distance_m < *distance);
                if better {
                    best = Some((
                        projection.distance_m,
                        projection.point,
                        edge.clone(),
                        from,
                        to,
                    ));
                }
            }
        }

        let Some((distance, point, edge, from, to)) = best else {
            return Ok(None);
        };
        if distance > max_radius_m {
            return Ok(None);
        }

        let node = if haversine_distance(coordinate, to.coordinate())
            < haversine_distance(coordinate, from.coordinate())
        {
            to
        } else {
            from
        };

        Ok(Some(SnapResult {
            node,
            edge,
            distance_to_trail: distance,
            point,
        }))
    }

    /// Classified trail segments whose polyline touches `bbox`, with full
    /// polylines.
    pub fn get_edges_in_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<TrailSegment>> {
        let segments: Vec<TrailSegment> = self
            .edges_near(bbox, true)?
            .into_iter()
            .filter_map(|(edge, from, to)| {
                let coordinates = full_polyline(&edge, &from, &to);
                if !polyline_touches(bbox, &coordinates) {
                    return None;
                }
                let highway_type = edge.highway_type?;
                Some(TrailSegment {
                    edge_id: edge.id,
                    name: edge.name,
                    highway_type,
                    surface: edge.surface,
                    sac_scale: edge.sac_scale,
                    trail_visibility: edge.trail_visibility,
                    is_oneway: edge.is_oneway,
                    coordinates,
                })
            })
            .collect();
        debug!(count = segments.len(), "trail segments in bounding box");
        Ok(segments)
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> Result<u64> {
        self.with_connection(|conn| count_rows(conn, NODES_TABLE))
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> Result<u64> {
        self.with_connection(|conn| count_rows(conn, EDGES_TABLE))
    }

    /// Key/value metadata written by the build pipeline. Empty when the graph
    /// carries no metadata table.
    pub fn metadata(&self) -> Result<BTreeMap<String, String>> {
        self.with_connection(|conn| {
            let mut metadata = BTreeMap::new();
            if !table_exists(conn, METADATA_TABLE)? {
                return Ok(metadata);
            }
            let mut stmt = conn.prepare("SELECT key, value FROM metadata")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let key: String = row.get(0)?;
                let value: Option<String> = row.get(1)?;
                metadata.insert(key, value.unwrap_or_default());
            }
            Ok(metadata)
        })
    }

    /// Geographic extent recorded in the metadata (`min_lat`, `max_lat`,
    /// `min_lon`, `max_lon`), if present and numeric.
    pub fn bounds(&self) -> Result<Option<BoundingBox>> {
        let metadata = self.metadata()?;
        let value = |key: &str| metadata.get(key).and_then(|v| v.trim().parse::<f64>().ok());
        Ok(
            match (
                value("max_lat"),
                value("min_lat"),
                value("max_lon"),
                value("min_lon"),
            ) {
                (Some(north), Some(south), Some(east), Some(west)) => {
                    Some(BoundingBox::new(north, south, east, west))
                }
                _ => None,
            },
        )
    }

    /// Counts plus metadata, for diagnostics.
    pub fn info(&self) -> Result<GraphInfo> {
        Ok(GraphInfo {
            path: self.path(),
            node_count: self.node_count()?,
            edge_count: self.edge_count()?,
            metadata: self.metadata()?,
        })
    }

    /// Edges that may pass through `bbox`, with both endpoint nodes.
    ///
    /// An edge cannot stray further from its start node than its own length, so
    /// the endpoint filter runs on `bbox` widened by the longest edge. Callers
    /// apply the exact geometric check.
    fn edges_near(
        &self,
        bbox: &BoundingBox,
        classified_only: bool,
    ) -> Result<Vec<(Edge, Node, Node)>> {
        let state = self.lock();
        let conn = state.connection.as_ref().ok_or_else(Error::no_data)?;
        let search = bbox.expanded(state.max_edge_extent_m);
        let mut sql = format!(
            "SELECT {EDGE_SELECT}, {ENDPOINT_SELECT} FROM edges e \
             JOIN nodes a ON a.id = e.from_node \
             JOIN nodes b ON b.id = e.to_node \
             WHERE ((a.latitude BETWEEN ?1 AND ?2 AND a.longitude BETWEEN ?3 AND ?4) \
             OR (b.latitude BETWEEN ?1 AND ?2 AND b.longitude BETWEEN ?3 AND ?4))"
        );
        if classified_only {
            sql.push_str(" AND e.highway_type IS NOT NULL AND e.highway_type != ''");
        }

        let mut stmt = conn.prepare_cached(&sql)?;
        let offset = EDGE_COLUMNS.len();
        let rows = stmt.query_map(
            params![search.south, search.north, search.west, search.east],
            |row| {
                Ok((
                    row_to_edge(row)?,
                    row_to_node(row, offset)?,
                    row_to_node(row, offset + NODE_COLUMNS.len())?,
                ))
            },
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let state = self.lock();
        let connection = state.connection.as_ref().ok_or_else(Error::no_data)?;
        f(connection)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GraphSource for GraphStore {
    fn node(&self, id: NodeId) -> Result<Option<Node>> {
        self.get_node(id)
    }

    fn edges_from(&self, node: NodeId) -> Result<Vec<Edge>> {
        self.get_edges_from(node)
    }
}

fn polyline_touches(bbox: &BoundingBox, points: &[Coordinate]) -> bool {
    match points {
        [] => false,
        [point] => bbox.contains(*point),
        _ => points
            .windows(2)
            .any(|pair| bbox.intersects_segment(pair[0], pair[1])),
    }
}

fn full_polyline(edge: &Edge, from: &Node, to: &Node) -> Vec<Coordinate> {
    let mut points = Vec::with_capacity(edge.geometry.len() + 2);
    points.push(from.coordinate());
    points.extend_from_slice(&edge.geometry);
    points.push(to.coordinate());
    points
}

fn row_to_node(row: &Row<'_>, offset: usize) -> rusqlite::Result<Node> {
    Ok(Node {
        id: row.get(offset)?,
        latitude: row.get(offset + 1)?,
        longitude: row.get(offset + 2)?,
        elevation: row.get(offset + 3)?,
    })
}

fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let id: EdgeId = row.get(0)?;
    let blob: Option<Vec<u8>> = row.get(15)?;
    let geometry = match blob {
        Some(blob) => {
            if has_trailing_bytes(&blob) {
                warn!(
                    edge = id,
                    len = blob.len(),
                    "edge geometry has a trailing partial point"
                );
            }
            decode_geometry(&blob)
        }
        None => Vec::new(),
    };

    Ok(Edge {
        id,
        from_node: row.get(1)?,
        to_node: row.get(2)?,
        distance: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
        elevation_gain: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
        elevation_loss: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
        surface: row.get(6)?,
        highway_type: row.get(7)?,
        sac_scale: row.get(8)?,
        trail_visibility: row.get(9)?,
        name: row.get(10)?,
        source_way_id: row.get(11)?,
        cost: row.get::<_, Option<f64>>(12)?.unwrap_or(f64::INFINITY),
        reverse_cost: row.get::<_, Option<f64>>(13)?.unwrap_or(f64::INFINITY),
        is_oneway: row.get::<_, Option<i64>>(14)?.unwrap_or(0) != 0,
        geometry,
    })
}

fn verify_schema(connection: &Connection) -> Result<()> {
    for (table, columns) in [
        (NODES_TABLE, &NODE_COLUMNS[..]),
        (EDGES_TABLE, &EDGE_COLUMNS[..]),
    ] {
        if !table_exists(connection, table)? {
            return Err(Error::UnsupportedSchema {
                missing: format!("table {table}"),
            });
        }
        let present = table_columns(connection, table)?;
        if let Some(column) = columns
            .iter()
            .find(|column| !present.iter().any(|p| p.eq_ignore_ascii_case(column)))
        {
            return Err(Error::UnsupportedSchema {
                missing: format!("column {table}.{column}"),
            });
        }
    }
    Ok(())
}

fn longest_edge(connection: &Connection) -> Result<f64> {
    let longest: Option<f64> =
        connection.query_row("SELECT MAX(distance) FROM edges", [], |row| row.get(0))?;
    Ok(longest.filter(|metres| metres.is_finite()).unwrap_or(0.0).max(0.0))
}

fn count_rows(connection: &Connection, table: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    let count: i64 = connection.query_row(&sql, [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_columns(connection: &Connection, table: &str) -> Result<Vec<String>> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }
    Ok(columns)
}
